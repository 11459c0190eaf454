//! wifi-recon CLI
//!
//! Command-line companion for the `wifi-recon-core` library: channel and
//! frequency conversion, handshake capture file inspection and recon config
//! management.
//!
//! # Usage
//!
//! ```bash
//! # Which channel is 2437 MHz?
//! wifi-recon channel 2437
//!
//! # Summarize a handshake capture file
//! wifi-recon inspect wifi-handshakes.pcap --format table
//!
//! # Write a default config, then check it
//! wifi-recon config init recon.json
//! wifi-recon config show recon.json
//! ```

use clap::{Parser, Subcommand};

pub mod commands;

/// wifi-recon Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "wifi-recon")]
#[command(author, version, about = "802.11 recon helpers and handshake capture tools")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a frequency in MHz to its 802.11 channel
    Channel(commands::ChannelArgs),

    /// Convert an 802.11 channel to its center frequency in MHz
    Frequency(commands::FrequencyArgs),

    /// Print the header and packet records of a capture file
    Inspect(commands::InspectArgs),

    /// Create or validate a recon config file
    #[command(subcommand)]
    Config(commands::ConfigCommand),

    /// Display version information
    Version,
}
