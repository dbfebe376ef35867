//! Errors raised while sizing or fragmenting a command

/// A fragment request that cannot be honoured
///
/// Whatever the variant, the destination buffer content must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Le above the absolute limit of 65536
    #[error("Le {0} exceeds 65536")]
    LeOutOfRange(u32),

    /// Lc above the maximum buffer length
    #[error("Lc {lc} exceeds the maximum buffer length {max}")]
    LcTooLong {
        /// Requested Lc
        lc: usize,
        /// Maximum buffer length
        max: usize,
    },

    /// Le above the maximum buffer length
    #[error("Le {le} exceeds the maximum buffer length {max}")]
    LeTooLong {
        /// Requested Le
        le: u32,
        /// Maximum buffer length
        max: usize,
    },

    /// Fragment starts past the end of the framed command
    #[error("Fragment {index} starts past the end of a {total} byte frame")]
    IndexOutOfRange {
        /// Requested fragment index
        index: usize,
        /// Framed command length
        total: usize,
    },

    /// Framed command longer than the structural maximum
    #[error("Framed command of {0} bytes exceeds the structural maximum")]
    FrameTooLong(usize),

    /// Block size of zero
    #[error("Block size must be at least one byte")]
    InvalidBlockSize,

    /// Destination buffer cannot hold the fragment
    #[error("Buffer too small: {needed} bytes needed, {available} available")]
    BufferTooSmall {
        /// Bytes to write
        needed: usize,
        /// Buffer length
        available: usize,
    },

    /// Write position reached the block size
    #[error("Write position {position} overflows a {block_size} byte block")]
    WriteOverflow {
        /// Position inside the block
        position: usize,
        /// Block size
        block_size: usize,
    },

    /// An offset inside the frame maps to no field of the command
    #[error("Offset {offset} does not map to any field of the command")]
    LayoutMismatch {
        /// Offset in the framed command
        offset: usize,
    },

    /// Fragment offset does not fit in a `usize`
    #[error("Fragment offset overflow")]
    OffsetOverflow,
}
