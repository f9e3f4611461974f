//! partscan CLI - list the partitions of a disk image
//!
//! Thin glue around the decoders: opens the image, picks a scheme, prints
//! the records as a table or as JSON.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use partscan_core::PartitionRecord;
use partscan_tables::{GptPartitionTable, MbrPartitionTable, PartitionTable, DEFAULT_SECTOR_SIZE};
use std::fs::File;
use std::path::PathBuf;
use std::process;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "partscan")]
#[command(about = "List MBR and GPT partition table entries of a disk image", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Disk image to inspect
    image: PathBuf,

    /// Partition table scheme to decode
    #[arg(long, value_enum, default_value_t = Scheme::Auto)]
    scheme: Scheme,

    /// Logical sector size in bytes
    #[arg(long, default_value_t = DEFAULT_SECTOR_SIZE)]
    sector_size: u32,

    /// Check the GPT signature and CRC32 fields
    #[arg(long)]
    verify: bool,

    /// Print records as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Scheme {
    /// MBR, or GPT when the MBR is protective
    Auto,
    Mbr,
    Gpt,
}

/// One decoded table, ready for printing
struct Listing {
    identify: String,
    records: Vec<PartitionRecord>,
}

impl Listing {
    fn from_table(table: impl PartitionTable) -> Self {
        Self {
            identify: table.identify().to_string(),
            records: table.records().to_vec(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_level.as_str())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut file = File::open(&cli.image)
        .with_context(|| format!("failed to open {}", cli.image.display()))?;

    let listing = match cli.scheme {
        Scheme::Mbr => decode_mbr(&mut file)?,
        Scheme::Gpt => decode_gpt(&mut file, cli.sector_size, cli.verify)?,
        Scheme::Auto => {
            let mbr = MbrPartitionTable::from_reader(&mut file).context("failed to decode MBR")?;
            if mbr.is_gpt_protective() {
                info!("protective MBR found, decoding GPT");
                decode_gpt(&mut file, cli.sector_size, cli.verify)?
            } else {
                debug!(disk_signature = mbr.disk_signature(), "using MBR");
                Listing::from_table(mbr)
            }
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&listing.records)?);
    } else {
        print_listing(&listing, cli.sector_size);
    }

    Ok(())
}

fn decode_mbr(file: &mut File) -> Result<Listing> {
    let table = MbrPartitionTable::from_reader(file).context("failed to decode MBR")?;
    Ok(Listing::from_table(table))
}

fn decode_gpt(file: &mut File, sector_size: u32, verify: bool) -> Result<Listing> {
    let table = if verify {
        GptPartitionTable::parse_verified(file, sector_size)
    } else {
        GptPartitionTable::parse(file, sector_size)
    }
    .context("failed to decode GPT")?;

    debug!(disk_guid = %table.disk_guid(), usable = table.usable_lba_count(), "using GPT");
    Ok(Listing::from_table(table))
}

fn print_listing(listing: &Listing, sector_size: u32) {
    println!("Partition table: {}", listing.identify);
    println!();

    if listing.records.is_empty() {
        println!("No partitions found.");
        return;
    }

    println!(
        "{:<5} {:<12} {:<12} {:<12} {:<38} {}",
        "Index", "Start", "End", "Size", "Type", "Name"
    );
    println!("{}", "-".repeat(100));

    for record in &listing.records {
        let size = record
            .byte_length(sector_size)
            .map(format_bytes)
            .unwrap_or_else(|| "overflow".to_string());
        let kind = match record.type_label().as_known() {
            Some(label) => format!("{} ({})", record.type_code(), label),
            None => record.type_code().to_string(),
        };

        println!(
            "{:<5} {:<12} {:<12} {:<12} {:<38} {}",
            record.index(),
            record.start_sector(),
            record.end_sector(),
            size,
            kind,
            record.name().unwrap_or("")
        );
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1_048_576 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else if bytes < 1_073_741_824 {
        format!("{:.2} MB", bytes as f64 / 1_048_576.0)
    } else {
        format!("{:.2} GB", bytes as f64 / 1_073_741_824.0)
    }
}
