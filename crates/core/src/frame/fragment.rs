//! Emission of a framed command in fixed-size blocks

use bytes::{Bytes, BytesMut};
use tracing::trace;

use super::{FrameError, FrameLayout, check_lengths};
use crate::command::ApduCommand;
use crate::constants::MAX_FRAMED_LEN;

/// Write block `index` of the framed `command` into `buffer`
///
/// The block covers the frame bytes `[index * block_size, (index + 1) * block_size)`.
/// Returns the number of bytes written, which is less than `block_size` for
/// the last block and 0 when `index * block_size` is exactly the frame length.
/// Bytes of `buffer` past the returned count are left untouched.
///
/// Each call derives everything from its arguments, so blocks can be produced
/// in any order or regenerated for a retransmission. On error the content of
/// `buffer` is unspecified.
pub fn fragment(
    command: &ApduCommand,
    buffer: &mut [u8],
    index: usize,
    block_size: usize,
) -> Result<usize, FrameError> {
    if block_size == 0 {
        return Err(FrameError::InvalidBlockSize);
    }
    check_lengths(command)?;

    let layout = FrameLayout::of(command);
    let total = layout.total_len();
    let start = index
        .checked_mul(block_size)
        .ok_or(FrameError::OffsetOverflow)?;
    if total < start {
        return Err(FrameError::IndexOutOfRange { index, total });
    }
    if total > MAX_FRAMED_LEN {
        return Err(FrameError::FrameTooLong(total));
    }

    let to_push = (total - start).min(block_size);
    let available = buffer.len();
    let block = buffer
        .get_mut(..to_push)
        .ok_or(FrameError::BufferTooSmall {
            needed: to_push,
            available,
        })?;

    for (position, slot) in block.iter_mut().enumerate() {
        if position >= block_size {
            return Err(FrameError::WriteOverflow {
                position,
                block_size,
            });
        }
        *slot = layout.byte_at(command, start + position)?;
    }

    trace!(index, block_size, written = to_push, total, "APDU fragment");
    Ok(to_push)
}

/// Serialize the whole framed command
pub fn encode(command: &ApduCommand) -> Result<Bytes, FrameError> {
    check_lengths(command)?;
    let total = command.encoded_len();

    let mut buffer = BytesMut::zeroed(total);
    let written = fragment(command, &mut buffer, 0, total)?;
    buffer.truncate(written);
    Ok(buffer.freeze())
}

/// Iterator over the blocks of a framed command
///
/// Yields each block as [`Bytes`] and stops after the last one. An error is
/// yielded once, then the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct Fragments<'a> {
    command: &'a ApduCommand,
    block_size: usize,
    index: usize,
    done: bool,
}

impl<'a> Fragments<'a> {
    /// Iterate over `command` in blocks of `block_size` bytes
    pub const fn new(command: &'a ApduCommand, block_size: usize) -> Self {
        Self {
            command,
            block_size,
            index: 0,
            done: false,
        }
    }

    /// Index of the next block
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl Iterator for Fragments<'_> {
    type Item = Result<Bytes, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut block = BytesMut::zeroed(self.block_size.min(MAX_FRAMED_LEN));
        match fragment(self.command, &mut block, self.index, self.block_size) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(written) => {
                // a short block is the last one
                self.done = written < self.block_size;
                self.index += 1;
                block.truncate(written);
                Some(Ok(block.freeze()))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::LeEncoding;
    use crate::constants::{MAX_BUFFER_LEN, SHORT_LC_MAX, SHORT_LE_MAX};
    use hex_literal::hex;

    // Straightforward field-by-field serialization to check the fragmenter against
    fn expected_frame(cmd: &ApduCommand) -> Vec<u8> {
        let mut out = cmd.header().to_vec();
        let lc = cmd.data.len();
        let extended_lc = lc > SHORT_LC_MAX;
        if extended_lc {
            out.extend_from_slice(&[0x00, (lc >> 8) as u8, lc as u8]);
        } else if lc > 0 {
            out.push(lc as u8);
        }
        out.extend_from_slice(&cmd.data);

        let extended_le = match cmd.le_encoding {
            LeEncoding::Absent => return out,
            LeEncoding::Short => cmd.le > SHORT_LE_MAX,
            LeEncoding::Extended => true,
        };
        if !extended_le {
            out.push(cmd.le as u8);
            return out;
        }
        if lc == 0 {
            out.push(0x00);
        }
        out.extend_from_slice(&[(cmd.le >> 8) as u8, cmd.le as u8]);
        out
    }

    fn sample_commands() -> Vec<ApduCommand> {
        let mut commands = Vec::new();
        for lc in [0, 1, 2, 254, 255, 256, 257, 299, MAX_BUFFER_LEN] {
            let data: Vec<u8> = (0..lc).map(|i| i as u8).collect();
            let base = ApduCommand::new(0x80, 0xE2, 0x01, 0x02).with_data(data);
            commands.push(base.clone());
            for le in [0, 1, 255, 256, 257, 300] {
                commands.push(base.clone().with_le(le));
                commands.push(base.clone().with_extended_le(le));
            }
        }
        commands
    }

    #[test]
    fn test_scenario_select_in_five_byte_blocks() {
        let cmd = ApduCommand::new(0x00, 0xA4, 0x04, 0x00)
            .with_data(vec![0x3F, 0x00])
            .with_le(0);
        assert_eq!(cmd.layout().total_len(), 8);

        let mut buf = [0u8; 5];
        assert_eq!(fragment(&cmd, &mut buf, 0, 5), Ok(5));
        assert_eq!(buf, hex!("00A4040002"));

        assert_eq!(fragment(&cmd, &mut buf, 1, 5), Ok(3));
        assert_eq!(buf[..3], hex!("3F0000"));
    }

    #[test]
    fn test_extended_le_of_65536_is_rejected() {
        let cmd = ApduCommand::new(0x00, 0xB0, 0x00, 0x00).with_extended_le(65536);
        let mut buf = [0u8; 16];
        assert!(fragment(&cmd, &mut buf, 0, 16).is_err());

        let cmd = cmd.with_extended_le(65537);
        assert_eq!(
            fragment(&cmd, &mut buf, 0, 16),
            Err(FrameError::LeOutOfRange(65537))
        );
    }

    #[test]
    fn test_fragments_reassemble_frame() {
        let mut buf = [0u8; MAX_FRAMED_LEN];
        for cmd in sample_commands() {
            let expected = expected_frame(&cmd);
            assert_eq!(cmd.layout().total_len(), expected.len());

            for block_size in 1..=MAX_FRAMED_LEN + 2 {
                let mut assembled = Vec::with_capacity(expected.len());
                let mut index = 0;
                loop {
                    let written = fragment(&cmd, &mut buf, index, block_size).unwrap();
                    assert!(written <= block_size);
                    assembled.extend_from_slice(&buf[..written]);
                    if written < block_size {
                        break;
                    }
                    index += 1;
                }
                assert_eq!(assembled, expected, "{cmd} in blocks of {block_size}");
            }
        }
    }

    #[test]
    fn test_every_lc_and_le_encoding_reassembles() {
        let mut buf = [0u8; MAX_FRAMED_LEN];
        let le_values = [0, 1, SHORT_LC_MAX as u32, SHORT_LE_MAX, SHORT_LE_MAX + 1, 299, 300];
        let block_sizes = [1, 2, 3, 4, 5, 7, 8, 16, 32, 254, MAX_FRAMED_LEN + 1];

        for lc in 0..=MAX_BUFFER_LEN {
            let data: Vec<u8> = (0..lc).map(|i| (i * 7) as u8).collect();
            let base = ApduCommand::new(0x00, 0xDA, 0x01, 0xFE).with_data(data);
            let mut commands = vec![base.clone().without_le()];
            for le in le_values {
                commands.push(base.clone().with_le(le));
                commands.push(base.clone().with_extended_le(le));
            }

            for cmd in commands {
                let expected = expected_frame(&cmd);
                assert_eq!(cmd.layout().total_len(), expected.len(), "{cmd}");
                assert_eq!(encode(&cmd).unwrap().as_ref(), &expected[..], "{cmd}");

                for block_size in block_sizes {
                    let mut assembled = Vec::with_capacity(expected.len());
                    for index in 0.. {
                        let written = fragment(&cmd, &mut buf, index, block_size)
                            .unwrap_or_else(|e| panic!("{cmd} block {index}/{block_size}: {e}"));
                        assembled.extend_from_slice(&buf[..written]);
                        if written < block_size {
                            break;
                        }
                    }
                    assert_eq!(assembled, expected, "{cmd} in blocks of {block_size}");
                }
            }
        }
    }

    #[test]
    fn test_boundary_index() {
        // 4 header + 1 Lc + 3 data
        let cmd = ApduCommand::new(0x00, 0xD6, 0x00, 0x00).with_data(vec![1, 2, 3]);
        let mut buf = [0u8; 4];
        assert_eq!(fragment(&cmd, &mut buf, 1, 4), Ok(4));
        assert_eq!(fragment(&cmd, &mut buf, 2, 4), Ok(0));
        assert_eq!(
            fragment(&cmd, &mut buf, 3, 4),
            Err(FrameError::IndexOutOfRange { index: 3, total: 8 })
        );
    }

    #[test]
    fn test_fragment_is_repeatable_in_any_order() {
        let cmd = ApduCommand::new(0x00, 0xDA, 0x00, 0x00)
            .with_data(vec![0x42; 280])
            .with_le(300);

        let mut forward = Vec::new();
        let mut buf = [0u8; 32];
        for index in 0..10 {
            let written = fragment(&cmd, &mut buf, index, 32).unwrap();
            forward.push(buf[..written].to_vec());
        }
        for index in (0..10).rev() {
            let written = fragment(&cmd, &mut buf, index, 32).unwrap();
            assert_eq!(buf[..written], forward[index][..]);
        }
    }

    #[test]
    fn test_bytes_past_block_untouched() {
        let cmd = ApduCommand::new(0x00, 0xA4, 0x04, 0x00)
            .with_data(vec![0x3F, 0x00])
            .with_le(0);
        let mut buf = [0xEE; 5];
        assert_eq!(fragment(&cmd, &mut buf, 1, 5), Ok(3));
        assert_eq!(buf, hex!("3F0000EEEE"));
    }

    #[test]
    fn test_invalid_requests() {
        let cmd = ApduCommand::new(0x00, 0xA4, 0x04, 0x00).with_data(vec![0x3F, 0x00]);
        let mut buf = [0u8; 8];

        assert_eq!(
            fragment(&cmd, &mut buf, 0, 0),
            Err(FrameError::InvalidBlockSize)
        );
        assert_eq!(
            fragment(&cmd, &mut buf, usize::MAX, 2),
            Err(FrameError::OffsetOverflow)
        );
        assert_eq!(
            fragment(&cmd, &mut buf[..3], 0, 8),
            Err(FrameError::BufferTooSmall {
                needed: 6,
                available: 3
            })
        );

        let oversized = cmd.clone().with_data(vec![0; MAX_BUFFER_LEN + 1]);
        assert!(matches!(
            fragment(&oversized, &mut buf, 0, 8),
            Err(FrameError::LcTooLong { .. })
        ));

        let large_le = cmd.with_le(MAX_BUFFER_LEN as u32 + 1);
        assert!(matches!(
            fragment(&large_le, &mut buf, 0, 8),
            Err(FrameError::LeTooLong { .. })
        ));
    }

    #[test]
    fn test_encode_matches_layout() {
        for cmd in sample_commands() {
            let encoded = encode(&cmd).unwrap();
            assert_eq!(encoded.len(), cmd.encoded_len());
            assert_eq!(encoded.as_ref(), expected_frame(&cmd).as_slice());
        }
    }

    #[test]
    fn test_fragments_iterator() {
        let cmd = ApduCommand::new(0x00, 0xA4, 0x04, 0x00)
            .with_data(vec![0x3F, 0x00])
            .with_le(0);

        let blocks: Vec<Bytes> = cmd.fragments(5).collect::<Result<_, _>>().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].as_ref(), &hex!("00A4040002"));
        assert_eq!(blocks[1].as_ref(), &hex!("3F0000"));

        // exact multiple: no trailing empty block
        let blocks: Vec<Bytes> = cmd.fragments(4).collect::<Result<_, _>>().unwrap();
        assert_eq!(blocks.len(), 2);

        let mut failing = cmd.fragments(0);
        assert_eq!(failing.next(), Some(Err(FrameError::InvalidBlockSize)));
        assert_eq!(failing.next(), None);
    }
}
