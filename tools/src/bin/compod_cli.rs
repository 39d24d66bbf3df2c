use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use libbdmpod::pod::transport::serial::DEFAULT_BAUD_RATE;
use libbdmpod::{BdmPod, ComPod12, SerialConfig, SerialTransport, MAX_READ_PAYLOAD, MAX_WRITE_PAYLOAD};

const ADDRESS_SPACE: usize = 0x1_0000;

#[derive(Parser)]
#[command(name = "compod_cli", version = "1.0")]
struct Args {
    /// Serial port the pod is attached to (e.g. /dev/ttyUSB0, COM3)
    #[arg(short, long, env = "BDMPOD_PORT")]
    port: String,

    /// Baud rate
    #[arg(short, long, env = "BDMPOD_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Per-read timeout in milliseconds
    #[arg(long, default_value_t = 500)]
    timeout_ms: u64,

    /// More output (-v info, -vv debug, -vvv raw frames)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print pod name and firmware version
    Version,
    /// Reset pod and target
    Reset,
    /// Hex dump a memory range
    Read {
        #[arg(value_parser = parse_u16)]
        addr: u16,
        #[arg(value_parser = parse_usize)]
        len: usize,
    },
    /// Write hex bytes (e.g. "AABB01") to memory
    Write {
        #[arg(value_parser = parse_u16)]
        addr: u16,
        data: String,
    },
    /// Save a memory range to a file
    Dump {
        #[arg(value_parser = parse_u16)]
        addr: u16,
        #[arg(value_parser = parse_usize)]
        len: usize,
        /// Output binary
        output: PathBuf,
    },
    /// Write a binary file to memory
    Load {
        #[arg(value_parser = parse_u16)]
        addr: u16,
        /// Input binary
        input: PathBuf,
    },
}

fn parse_usize(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("'{s}': {e}"))
}

fn parse_u16(s: &str) -> Result<u16, String> {
    let value = parse_usize(s)?;
    u16::try_from(value).map_err(|_| format!("'{s}' is not a 16-bit address"))
}

fn progress_bar(len: usize, msg: &'static str) -> ProgressBar {
    ProgressBar::new(len as u64)
        .with_message(msg)
        .with_style(
            ProgressStyle::default_spinner()
                .template("[{elapsed_precise}, eta:{eta}] {msg} {bar:40.cyan/blue} {bytes} / {total_bytes} ({binary_bytes_per_sec})")
                .unwrap(),
        )
}

fn check_range(addr: u16, len: usize) -> Result<()> {
    if addr as usize + len > ADDRESS_SPACE {
        bail!("Range {addr:#06X}+{len:#X} does not fit the 16-bit address space");
    }
    Ok(())
}

fn hexdump(addr: u16, data: &[u8]) {
    for (i, line) in data.chunks(16).enumerate() {
        let bytes: Vec<String> = line.iter().map(|b| format!("{b:02X}")).collect();
        println!("{:04X}: {}", addr as usize + i * 16, bytes.join(" "));
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level)?;

    let config = SerialConfig::new(&args.port)
        .baud_rate(args.baud)
        .timeout(Duration::from_millis(args.timeout_ms));
    let transport = SerialTransport::open(&config)
        .with_context(|| format!("Opening {}", config.path))?;
    log::info!("Opened {} @ {} baud", config.path, config.baud_rate);

    let mut pod = ComPod12::new(transport);

    match args.command {
        Command::Version => {
            println!("{}", pod.pod_version()?);
        }
        Command::Reset => {
            pod.reset()?;
            println!("[+] Pod reset");
        }
        Command::Read { addr, len } => {
            let data = pod.read_memory(addr, len)?;
            hexdump(addr, &data);
        }
        Command::Write { addr, data } => {
            let data = hex::decode(data.replace(' ', "")).context("Parsing hex data")?;
            pod.write_memory(addr, &data)?;
            println!("[+] Wrote {} bytes at {addr:#06X}", data.len());
        }
        Command::Dump { addr, len, output } => {
            check_range(addr, len)?;
            let mut file = File::create(&output)?;
            let progress = progress_bar(len, "Reading");

            let chunk = MAX_READ_PAYLOAD * 16;
            for offset in (0..len).step_by(chunk) {
                let n = chunk.min(len - offset);
                let data = pod.read_memory(addr + offset as u16, n)?;
                file.write_all(&data)?;
                progress.inc(n as u64);
            }
            progress.finish();
            println!("[+] Saved {len} bytes to {}", output.display());
        }
        Command::Load { addr, input } => {
            let mut data = Vec::new();
            File::open(&input)
                .with_context(|| format!("File '{}' not found!", input.display()))?
                .read_to_end(&mut data)?;
            check_range(addr, data.len())?;
            let progress = progress_bar(data.len(), "Writing");

            for (i, block) in data.chunks(MAX_WRITE_PAYLOAD).enumerate() {
                let offset = i * MAX_WRITE_PAYLOAD;
                pod.write_area(addr + offset as u16, block.len() as u8, block)?;
                progress.inc(block.len() as u64);
            }
            progress.finish();
            println!("[+] Loaded {} bytes at {addr:#06X}", data.len());
        }
    }

    Ok(())
}
