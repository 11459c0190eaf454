//! Conversion between 802.11 channel numbers and centre frequencies.
//!
//! Both directions are total. The 2.4 GHz formulas apply to every value up to
//! the top of the band, so frequencies a little below channel 1 still round
//! to it and channel 0 maps to 2407 MHz. Anything with no mapping, including
//! results that would be negative, is `0`, which callers must treat as
//! "no mapping".

use std::fmt;

use serde::{Deserialize, Serialize};

/// 2.4 GHz grid origin (channel 1), in MHz.
const BAND_2_4_FIRST_MHZ: u32 = 2412;
/// Highest regularly spaced 2.4 GHz centre frequency (channel 13), in MHz.
const BAND_2_4_LAST_MHZ: u32 = 2472;
/// Highest channel on the regular 2.4 GHz grid.
const BAND_2_4_LAST_CHANNEL: u8 = 13;
/// Japan-only channel 14 sits outside the 5 MHz grid.
const CHANNEL_14_MHZ: u32 = 2484;
/// 5 GHz grid origin (channel 7 in the 4.9/5 GHz numbering).
const BAND_5_FIRST_MHZ: u32 = 5035;
/// Highest supported 5 GHz centre frequency (channel 173), in MHz.
const BAND_5_LAST_MHZ: u32 = 5865;
/// Highest supported 5 GHz channel.
const BAND_5_LAST_CHANNEL: u8 = 173;
/// Channel spacing on both grids, in MHz.
const CHANNEL_SPACING_MHZ: i64 = 5;

/// Map a centre frequency in MHz to its channel number, or `0` if the
/// frequency is not on a supported grid.
pub fn frequency_to_channel(freq_mhz: u32) -> u8 {
    let freq = i64::from(freq_mhz);
    let channel = match freq_mhz {
        // truncating division, so 2408..=2411 still land on channel 1
        0..=BAND_2_4_LAST_MHZ => {
            (freq - i64::from(BAND_2_4_FIRST_MHZ)) / CHANNEL_SPACING_MHZ + 1
        }
        CHANNEL_14_MHZ => 14,
        BAND_5_FIRST_MHZ..=BAND_5_LAST_MHZ => {
            (freq - i64::from(BAND_5_FIRST_MHZ)) / CHANNEL_SPACING_MHZ + 7
        }
        _ => 0,
    };
    u8::try_from(channel).unwrap_or(0)
}

/// Map a channel number to its centre frequency in MHz, or `0` if the
/// channel is not supported.
pub fn channel_to_frequency(channel: u8) -> u32 {
    let ch = i64::from(channel);
    let freq = match channel {
        0..=BAND_2_4_LAST_CHANNEL => {
            (ch - 1) * CHANNEL_SPACING_MHZ + i64::from(BAND_2_4_FIRST_MHZ)
        }
        14 => i64::from(CHANNEL_14_MHZ),
        15..=BAND_5_LAST_CHANNEL => (ch - 7) * CHANNEL_SPACING_MHZ + i64::from(BAND_5_FIRST_MHZ),
        _ => 0,
    };
    u32::try_from(freq).unwrap_or(0)
}

/// The frequency band a radio operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    /// 2.4 GHz (channels 1-14)
    #[serde(rename = "2.4GHz")]
    Band2_4GHz,
    /// 5 GHz (channels 7-173)
    #[serde(rename = "5GHz")]
    Band5GHz,
}

impl Band {
    /// Classify a centre frequency. Returns `None` when the frequency has no
    /// channel mapping.
    pub fn from_frequency(freq_mhz: u32) -> Option<Self> {
        match frequency_to_channel(freq_mhz) {
            0 => None,
            _ if freq_mhz <= CHANNEL_14_MHZ => Some(Self::Band2_4GHz),
            _ => Some(Self::Band5GHz),
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Band2_4GHz => write!(f, "2.4 GHz"),
            Self::Band5GHz => write!(f, "5 GHz"),
        }
    }
}
