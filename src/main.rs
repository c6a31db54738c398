use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use disasm_8086::{disassemble_with, ErrorPolicy};

#[derive(Parser, Debug)]
#[command(name = "disasm8086", version, about = "Disassemble raw 8086 machine code into NASM syntax")]
struct Args {
  /// Raw binary to decode (no header)
  input: PathBuf,

  /// What to do with bytes that don't decode
  #[arg(long, value_enum, default_value_t = OnError::Stop)]
  on_error: OnError,

  /// Omit the `bits 16` directive
  #[arg(long)]
  no_header: bool,

  /// Start the listing with a `; src:` comment naming the input
  #[arg(long)]
  source_comment: bool,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OnError {
  Stop,
  Skip,
  Mark,
}

impl From<OnError> for ErrorPolicy {
  fn from(value: OnError) -> Self {
    match value {
      OnError::Stop => ErrorPolicy::Stop,
      OnError::Skip => ErrorPolicy::Skip,
      OnError::Mark => ErrorPolicy::Mark,
    }
  }
}

fn main() -> Result<()> {
  let args = Args::parse();

  let log_level = if args.verbose { "debug" } else { "info" };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
    .format_timestamp_millis()
    .init();

  let data = std::fs::read(&args.input)
    .with_context(|| format!("Error reading file {}", args.input.display()))?;
  info!("read {} bytes from {}", data.len(), args.input.display());

  let listing = disassemble_with(&data, args.on_error.into());

  if args.source_comment {
    println!("; src: `{}`", args.input.display());
  }
  if args.no_header {
    print!("{}", listing.body());
  } else {
    print!("{listing}");
  }

  if let (OnError::Stop | OnError::Mark, Some(error)) = (args.on_error, listing.errors.first()) {
    bail!("decoding stopped at {error}");
  }
  if !listing.is_complete() {
    info!("skipped {} undecodable bytes", listing.errors.len());
  }
  Ok(())
}
