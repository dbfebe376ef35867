//! `scframe`: inspect the ISO7816 framing of APDU commands

use clap::{Parser, Subcommand};
use scard_apdu_core::constants::MAX_FRAMED_LEN;
use scard_apdu_core::{ApduCommand, fragment};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

mod args;
mod display;

use args::{ApduArgs, HexBytes, parse_hex};
use display::SectionTitle;

#[derive(Parser)]
#[command(version, about = "Inspect how ISO7816 APDU commands are framed and fragmented")]
struct Cli {
    /// Trace level output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the framed size and length field widths of a command
    Size {
        #[command(flatten)]
        apdu: ApduArgs,
    },

    /// Split a framed command into transport blocks
    Fragment {
        #[command(flatten)]
        apdu: ApduArgs,

        /// Transport block size in bytes
        #[arg(short, long, default_value_t = 32)]
        block_size: usize,

        /// Only emit this block
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Decode a framed command given in hex
    Parse {
        /// Framed command bytes in hex
        #[arg(value_parser = parse_hex)]
        frame: HexBytes,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Size { apdu } => size_command(&apdu.to_command()),
        Commands::Fragment {
            apdu,
            block_size,
            index,
        } => fragment_command(&apdu.to_command(), block_size, index)?,
        Commands::Parse {
            frame: HexBytes(frame),
        } => {
            let command = ApduCommand::from_bytes(&frame)?;
            size_command(&command);
        }
    }

    Ok(())
}

fn size_command(command: &ApduCommand) {
    let layout = command.layout();
    let encoding = if command.is_extended() {
        "extended"
    } else {
        "short"
    };

    println!("{}", SectionTitle("APDU"));
    println!("{command}");
    println!(
        "\n{}",
        display::key_value_box(
            "Framing",
            &[
                ("Total", layout.total_len().to_string()),
                ("Lc width", layout.lc_width().to_string()),
                ("Le width", layout.le_width().to_string()),
                ("Encoding", encoding.to_string()),
            ],
        )
    );

    match command.validate() {
        Ok(()) => println!("\n{}", display::success("Command can be framed")),
        Err(e) => println!("\n{}", display::warning(&e.to_string())),
    }
}

fn fragment_command(
    command: &ApduCommand,
    block_size: usize,
    index: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    debug!(block_size, ?index, total = command.encoded_len(), "Fragmenting command");
    println!("{}", SectionTitle("Blocks"));

    match index {
        Some(index) => {
            let mut buffer = vec![0u8; block_size.min(MAX_FRAMED_LEN)];
            let written = fragment(command, &mut buffer, index, block_size)?;
            println!("{}", display::block(index, &buffer[..written]));
        }
        None => {
            for (index, block) in command.fragments(block_size).enumerate() {
                println!("{}", display::block(index, &block?));
            }
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, directives.as_deref()))
        .with_ansi(true)
        .init();
}

/// `RUST_LOG` style directives win, `--verbose` only moves the default level
fn log_filter(verbose: bool, directives: Option<&str>) -> EnvFilter {
    let level = if verbose {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    };

    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives.unwrap_or_default())
}
