//! Effect catalogue
//!
//! The closed set of named effects a user can pick, and their mapping onto
//! processing parameters (see [`resolve_parameters`]).

mod params;

pub use params::{resolve_parameters, EffectParameters, StageSpec};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RemixError;

/// Named effect
///
/// Serialized by display name (`"Slow 0.5x"`, `"8D Audio"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectType {
    #[serde(rename = "Slow 0.5x")]
    Slow050,
    #[serde(rename = "Slow 0.75x")]
    Slow075,
    #[serde(rename = "Slow 0.85x")]
    Slow085,
    #[serde(rename = "Slow 0.9x")]
    Slow090,
    #[serde(rename = "Fast 1.1x")]
    Fast110,
    #[serde(rename = "Fast 1.25x")]
    Fast125,
    #[serde(rename = "Fast 1.5x")]
    Fast150,
    #[serde(rename = "Fast 2.0x")]
    Fast200,
    #[serde(rename = "Bass Boost")]
    BassBoost,
    #[serde(rename = "Treble Boost")]
    TrebleBoost,
    #[serde(rename = "Vocal Boost")]
    VocalBoost,
    #[serde(rename = "Telephone")]
    Telephone,
    #[serde(rename = "Underwater")]
    Underwater,
    #[serde(rename = "Radio")]
    Radio,
    #[serde(rename = "8D Audio")]
    EightD,
    #[serde(rename = "Reverse")]
    Reverse,
    #[serde(rename = "Echo / Delay")]
    Echo,
    #[serde(rename = "Lo-Fi Radio")]
    LoFi,
    #[serde(rename = "Distortion")]
    Distortion,
    #[serde(rename = "Nightcore")]
    Nightcore,
}

impl EffectType {
    /// Every effect, in menu order
    pub const ALL: [EffectType; 20] = [
        EffectType::Slow050,
        EffectType::Slow075,
        EffectType::Slow085,
        EffectType::Slow090,
        EffectType::Fast110,
        EffectType::Fast125,
        EffectType::Fast150,
        EffectType::Fast200,
        EffectType::BassBoost,
        EffectType::TrebleBoost,
        EffectType::VocalBoost,
        EffectType::Telephone,
        EffectType::Underwater,
        EffectType::Radio,
        EffectType::EightD,
        EffectType::Reverse,
        EffectType::Echo,
        EffectType::LoFi,
        EffectType::Distortion,
        EffectType::Nightcore,
    ];

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Slow050 => "Slow 0.5x",
            Self::Slow075 => "Slow 0.75x",
            Self::Slow085 => "Slow 0.85x",
            Self::Slow090 => "Slow 0.9x",
            Self::Fast110 => "Fast 1.1x",
            Self::Fast125 => "Fast 1.25x",
            Self::Fast150 => "Fast 1.5x",
            Self::Fast200 => "Fast 2.0x",
            Self::BassBoost => "Bass Boost",
            Self::TrebleBoost => "Treble Boost",
            Self::VocalBoost => "Vocal Boost",
            Self::Telephone => "Telephone",
            Self::Underwater => "Underwater",
            Self::Radio => "Radio",
            Self::EightD => "8D Audio",
            Self::Reverse => "Reverse",
            Self::Echo => "Echo / Delay",
            Self::LoFi => "Lo-Fi Radio",
            Self::Distortion => "Distortion",
            Self::Nightcore => "Nightcore",
        }
    }

    /// Command-line identifier
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Slow050 => "slow-050",
            Self::Slow075 => "slow-075",
            Self::Slow085 => "slow-085",
            Self::Slow090 => "slow-090",
            Self::Fast110 => "fast-110",
            Self::Fast125 => "fast-125",
            Self::Fast150 => "fast-150",
            Self::Fast200 => "fast-200",
            Self::BassBoost => "bass-boost",
            Self::TrebleBoost => "treble-boost",
            Self::VocalBoost => "vocal-boost",
            Self::Telephone => "telephone",
            Self::Underwater => "underwater",
            Self::Radio => "radio",
            Self::EightD => "8d",
            Self::Reverse => "reverse",
            Self::Echo => "echo",
            Self::LoFi => "lofi",
            Self::Distortion => "distortion",
            Self::Nightcore => "nightcore",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Self::Slow050 | Self::Slow075 | Self::Slow085 | Self::Slow090 => {
                "Slower playback, lower pitch"
            }
            Self::Fast110 | Self::Fast125 | Self::Fast150 | Self::Fast200 => {
                "Faster playback, higher pitch"
            }
            Self::BassBoost => "Low-shelf boost below 200 Hz",
            Self::TrebleBoost => "High-shelf boost above 2 kHz",
            Self::VocalBoost => "Presence boost around 1 kHz",
            Self::Telephone => "Narrow band-pass, 500 Hz to 2 kHz",
            Self::Underwater => "Muffled low-pass at 400 Hz",
            Self::Radio => "Thin high-pass at 1.5 kHz",
            Self::EightD => "Sound circling slowly around the head",
            Self::Reverse => "Plays the track backwards",
            Self::Echo => "Repeating 300 ms echo",
            Self::LoFi => "Band-limited with mild saturation",
            Self::Distortion => "Heavy waveshaping distortion",
            Self::Nightcore => "Sped up 1.25x, pitch raised",
        }
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for EffectType {
    type Err = RemixError;

    /// Accepts the slug or the display name, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EffectType::ALL
            .into_iter()
            .find(|effect| {
                effect.slug().eq_ignore_ascii_case(wanted)
                    || effect.display_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| RemixError::UnknownEffect {
                name: s.to_string(),
            })
    }
}

// ============================================================================
// Tests
// ============================================================================
