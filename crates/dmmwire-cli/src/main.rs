use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use dmmwire_core::{
    DecodeFrameError, FrameError, MeterEvent, MeterStream, Reading, ReaderSource, SliceSource,
    SlotBuffer, StreamStats, decode_reading, read_frame,
};
use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DMMWIRE_BUILD_ID"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "dmmwire")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder for the serial data dump of TP4000ZC-class multimeters.",
    long_about = None,
    after_help = "Examples:\n  dmmwire read /dev/ttyUSB0\n  dmmwire read capture.bin --format json\n  dmmwire decode 27 3D 42 57 69 75 80 95 A2 B0 C4 D0 E8"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode frames from a serial device, a capture file, or stdin.
    ///
    /// The device must already be set to 2400 baud, 8 data bits, 1 stop bit,
    /// no parity (e.g. `stty -F /dev/ttyUSB0 2400 -parity`).
    #[command(
        after_help = "Examples:\n  dmmwire read /dev/ttyUSB0\n  dmmwire read - --format json < capture.bin\n  dmmwire read capture.bin --raw --count 5"
    )]
    Read {
        /// Device node or capture file; `-` reads stdin
        input: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Also print the 14 slot nibbles of each frame
        #[arg(long)]
        raw: bool,

        /// Stop after this many readings
        #[arg(short = 'n', long, value_name = "N")]
        count: Option<u64>,

        /// Exit with a non-zero code if any frame was rejected
        #[arg(long)]
        strict: bool,

        /// Suppress the power-on notice and the end summary
        #[arg(short, long)]
        quiet: bool,
    },
    /// Decode a single frame given as hex bytes.
    Decode {
        /// Frame bytes, e.g. `27 3D 42` or `0x27,0x3D,0x42`
        #[arg(required = true, num_args = 1..)]
        bytes: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Also print the 14 slot nibbles of the frame
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let quiet = matches!(cli.command, Commands::Read { quiet: true, .. });
    init_logging(cli.verbose, quiet);

    let result = match cli.command {
        Commands::Read {
            input,
            format,
            raw,
            count,
            strict,
            quiet,
        } => cmd_read(&input, format, raw, count, strict, quiet),
        Commands::Decode { bytes, format, raw } => cmd_decode(&bytes, format, raw),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_read(
    input: &Path,
    format: OutputFormat,
    raw: bool,
    count: Option<u64>,
    strict: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let reader = open_input(input)?;
    if count == Some(0) {
        return Ok(());
    }

    let mut stream = MeterStream::new(ReaderSource::new(reader));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut emitted = 0u64;

    while let Some(event) = stream
        .next_event()
        .with_context(|| format!("Failed to read meter stream: {}", input.display()))?
    {
        match event {
            MeterEvent::Reading { reading, slots } => {
                write_reading(&mut out, &reading, &slots, format, raw)?;
                emitted += 1;
                if count.is_some_and(|limit| emitted >= limit) {
                    break;
                }
            }
            MeterEvent::PowerOn => {
                if !quiet {
                    eprintln!("Meter ON.");
                }
            }
            // Already logged by the stream; the meter sends the next frame shortly.
            MeterEvent::Rejected(_) => {}
        }
    }
    out.flush().context("Failed to flush output")?;

    let stats = stream.stats();
    if !quiet {
        print_summary(&stats);
    }
    if strict && stats.rejected > 0 {
        return Err(CliError::new(
            format!("{} frame(s) rejected", stats.rejected),
            Some("run with -v to see why frames were rejected".to_string()),
        ));
    }
    Ok(())
}

fn cmd_decode(tokens: &[String], format: OutputFormat, raw: bool) -> Result<(), CliError> {
    let bytes = parse_hex_bytes(tokens)?;
    let mut source = SliceSource::new(&bytes);
    let slots = read_frame(&mut source).map_err(|err| frame_error(err.into()))?;
    let reading = decode_reading(&slots).map_err(|err| frame_error(err.into()))?;
    if source.remaining() > 0 {
        log::warn!(
            "ignoring {} byte(s) after the terminal byte",
            source.remaining()
        );
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_reading(&mut out, &reading, &slots, format, raw)?;
    out.flush().context("Failed to flush output")?;
    Ok(())
}

fn frame_error(err: DecodeFrameError) -> CliError {
    let hint = match &err {
        DecodeFrameError::Frame(FrameError::PowerOn) => {
            "0x00 is the meter's power-on byte, not part of a frame"
        }
        DecodeFrameError::Frame(FrameError::EndOfStream) => {
            "a frame ends with a byte in 0xE0..=0xEF"
        }
        DecodeFrameError::Frame(FrameError::ShortFrame { .. }) => {
            "a frame needs 13 or 14 bytes; only slot 1 may be missing"
        }
        DecodeFrameError::Frame(FrameError::InvalidFraming { .. }) => {
            "the high nibble of every byte must be its slot number, 1 to E"
        }
        _ => "check the bytes against the capture",
    };
    CliError::new(format!("frame rejected: {err}"), Some(hint.to_string()))
}

fn open_input(input: &Path) -> Result<Box<dyn Read>, CliError> {
    if input.as_os_str() == "-" {
        return Ok(Box::new(io::stdin()));
    }
    if !input.exists() {
        return Err(CliError::new(
            format!("input not found: {}", input.display()),
            Some("pass a serial device node, a capture file, or - for stdin".to_string()),
        ));
    }
    if input.is_dir() {
        return Err(CliError::new(
            format!("input is a directory: {}", input.display()),
            Some("pass a serial device node, a capture file, or - for stdin".to_string()),
        ));
    }
    let file = File::open(input)
        .with_context(|| format!("Failed to open input: {}", input.display()))?;
    Ok(Box::new(file))
}

fn parse_hex_bytes(tokens: &[String]) -> Result<Vec<u8>, CliError> {
    tokens
        .iter()
        .flat_map(|token| token.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|token| !token.is_empty())
        .map(|token| {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            if digits.is_empty() || digits.len() > 2 {
                return Err(invalid_hex(token));
            }
            u8::from_str_radix(digits, 16).map_err(|_| invalid_hex(token))
        })
        .collect()
}

fn invalid_hex(token: &str) -> CliError {
    CliError::new(
        format!("invalid byte '{token}'"),
        Some("give each byte as one or two hex digits, e.g. 27 or 0x27".to_string()),
    )
}

#[derive(Serialize)]
struct ReadingLine<'a> {
    received_at: String,
    #[serde(flatten)]
    reading: &'a Reading,
    #[serde(skip_serializing_if = "Option::is_none")]
    slots: Option<&'a SlotBuffer>,
}

fn write_reading<W: Write>(
    out: &mut W,
    reading: &Reading,
    slots: &SlotBuffer,
    format: OutputFormat,
    raw: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => {
            if raw {
                writeln!(out, "{slots}").context("Failed to write output")?;
            }
            writeln!(out, "{reading}").context("Failed to write output")?;
        }
        OutputFormat::Json => {
            let received_at = OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .context("Failed to format timestamp")?;
            let line = ReadingLine {
                received_at,
                reading,
                slots: raw.then_some(slots),
            };
            let json = serde_json::to_string(&line).context("JSON serialization failed")?;
            writeln!(out, "{json}").context("Failed to write output")?;
        }
    }
    Ok(())
}

fn print_summary(stats: &StreamStats) {
    eprintln!(
        "OK: {} readings, {} rejected frames",
        stats.readings, stats.rejected
    );
}
