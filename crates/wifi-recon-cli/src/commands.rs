//! wifi-recon subcommands
//!
//! - Channel and frequency conversion
//! - Capture file inspection
//! - Recon config creation and validation

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use wifi_recon_core::{
    channel_to_frequency, frequency_to_channel, Band, CapturedPacket, PcapHeader, PcapReader,
    ReconConfig,
};

/// Arguments for the channel command
#[derive(Args, Debug)]
pub struct ChannelArgs {
    /// Center frequency in MHz
    pub frequency: u32,
}

/// Arguments for the frequency command
#[derive(Args, Debug)]
pub struct FrequencyArgs {
    /// 802.11 channel number
    pub channel: u8,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Capture file to read
    pub file: PathBuf,

    /// Show at most this many packet records
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a config file holding the defaults
    Init {
        /// Destination path
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Load, validate and print a config file
    Show {
        /// Config file to read
        path: PathBuf,
    },
}

/// Output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table output
    Table,
    /// JSON output
    Json,
    /// One line per record
    Compact,
}

// ============================================================================
// Display Structures
// ============================================================================

/// Packet row for display
#[derive(Tabled, Serialize)]
struct PacketRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Captured")]
    captured_len: u32,
    #[tabled(rename = "Original")]
    original_len: u32,
    #[tabled(rename = "Data")]
    preview: String,
}

/// Everything `inspect` reports about a capture file
#[derive(Serialize)]
struct CaptureReport {
    file: PathBuf,
    magic: String,
    version: String,
    snaplen: u32,
    link_type: u32,
    link_type_name: String,
    nanosecond_resolution: bool,
    total_packets: usize,
    total_bytes: u64,
    first_packet: Option<DateTime<Utc>>,
    last_packet: Option<DateTime<Utc>>,
    packets: Vec<PacketRow>,
}

const PREVIEW_BYTES: usize = 16;

// ============================================================================
// Command Execution
// ============================================================================

/// Execute the channel command
pub fn execute_channel(args: ChannelArgs) -> Result<()> {
    match describe_frequency(args.frequency) {
        Some((channel, band)) => println!(
            "{} MHz -> channel {} ({})",
            args.frequency,
            channel.to_string().green().bold(),
            band
        ),
        None => println!("{} MHz -> {}", args.frequency, "unknown".yellow()),
    }
    Ok(())
}

/// Execute the frequency command
pub fn execute_frequency(args: FrequencyArgs) -> Result<()> {
    match channel_to_frequency(args.channel) {
        0 => println!("channel {} -> {}", args.channel, "unknown".yellow()),
        freq => println!(
            "channel {} -> {} MHz",
            args.channel,
            freq.to_string().green().bold()
        ),
    }
    Ok(())
}

/// Execute the inspect command
pub fn execute_inspect(args: InspectArgs) -> Result<()> {
    let report = read_capture(&args.file, args.limit)?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Compact => {
            for row in &report.packets {
                println!(
                    "{} {} {}/{} {}",
                    row.index, row.timestamp, row.captured_len, row.original_len, row.preview
                );
            }
        }
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}

/// Execute a config subcommand
pub fn execute_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init { path, force } => {
            if path.exists() && !force {
                bail!(
                    "{} already exists; pass --force to overwrite it",
                    path.display()
                );
            }
            ReconConfig::default()
                .to_json(&path)
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            println!(
                "{} Wrote default config to {}",
                "[OK]".green().bold(),
                path.display().to_string().cyan()
            );
        }
        ConfigCommand::Show { path } => {
            let cfg = ReconConfig::from_json(&path)
                .with_context(|| format!("Invalid config {}", path.display()))?;
            tracing::debug!(path = %path.display(), "config loaded");

            println!("{}", "Recon Configuration".bold().cyan());
            println!("{}", "=".repeat(50));
            println!(
                "  {} {}",
                "Handshakes file:".dimmed(),
                cfg.handshakes_file.display()
            );
            println!("  {} {}", "Link type:".dimmed(), cfg.link_type);
            println!("  {} {}s", "AP TTL:".dimmed(), cfg.ap_ttl_secs);
            println!("  {} {}s", "Save interval:".dimmed(), cfg.save_interval_secs);
        }
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn describe_frequency(freq_mhz: u32) -> Option<(u8, Band)> {
    match frequency_to_channel(freq_mhz) {
        0 => None,
        channel => Band::from_frequency(freq_mhz).map(|band| (channel, band)),
    }
}

fn read_capture(path: &Path, limit: Option<usize>) -> Result<CaptureReport> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = PcapReader::new(BufReader::new(file))
        .with_context(|| format!("{} is not a pcap file", path.display()))?;
    let header = *reader.header();

    let mut report = empty_report(path, &header);
    for (index, packet) in reader.enumerate() {
        let packet = packet.with_context(|| format!("Bad packet record #{index}"))?;

        report.total_packets += 1;
        report.total_bytes += u64::from(packet.captured_len);
        report.first_packet.get_or_insert(packet.timestamp);
        report.last_packet = Some(packet.timestamp);

        if limit.map_or(true, |max| report.packets.len() < max) {
            report.packets.push(packet_row(index, &packet));
        }
    }

    tracing::debug!(
        file = %path.display(),
        packets = report.total_packets,
        "capture file read"
    );
    Ok(report)
}

fn empty_report(path: &Path, header: &PcapHeader) -> CaptureReport {
    CaptureReport {
        file: path.to_path_buf(),
        magic: format!("{:#010x}", header.magic),
        version: format!("{}.{}", header.version_major, header.version_minor),
        snaplen: header.snaplen,
        link_type: header.link_type.0,
        link_type_name: header.link_type.to_string(),
        nanosecond_resolution: header.nanosecond_resolution(),
        total_packets: 0,
        total_bytes: 0,
        first_packet: None,
        last_packet: None,
        packets: Vec::new(),
    }
}

fn packet_row(index: usize, packet: &CapturedPacket) -> PacketRow {
    let mut preview: String = packet
        .data
        .iter()
        .take(PREVIEW_BYTES)
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ");
    if packet.data.len() > PREVIEW_BYTES {
        preview.push_str(" ..");
    }

    PacketRow {
        index,
        timestamp: packet.timestamp.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        captured_len: packet.captured_len,
        original_len: packet.original_len,
        preview,
    }
}

fn print_report(report: &CaptureReport) {
    println!("{}", "Capture File".bold().cyan());
    println!("{}", "=".repeat(60));
    println!("  {} {}", "File:".dimmed(), report.file.display());
    println!(
        "  {} {} (pcap {})",
        "Magic:".dimmed(),
        report.magic,
        report.version
    );
    println!("  {} {}", "Snaplen:".dimmed(), report.snaplen);
    println!("  {} {}", "Link type:".dimmed(), report.link_type_name);
    println!(
        "  {} {} ({} bytes)",
        "Packets:".dimmed(),
        report.total_packets.to_string().bold(),
        report.total_bytes
    );
    if let (Some(first), Some(last)) = (report.first_packet, report.last_packet) {
        println!("  {} {} .. {}", "Span:".dimmed(), first, last);
    }
    println!();

    if report.packets.is_empty() {
        println!("No packet records.");
        return;
    }

    let shown = report.packets.len();
    let table = Table::new(&report.packets)
        .with(Style::rounded())
        .to_string();
    println!("{}", table);
    if shown < report.total_packets {
        println!(
            "{}",
            format!("({} of {} records shown)", shown, report.total_packets).dimmed()
        );
    }
}
