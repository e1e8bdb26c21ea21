//! Effect parameter table

use serde::{Deserialize, Serialize};

use super::EffectType;
use crate::dsp::{BiquadSpec, EchoParams, Oversample, RotateParams, ShaperSpec};

/// One stage of a serial processing chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageSpec {
    Filter(BiquadSpec),
    Shaper(ShaperSpec),
}

/// Processing parameters for one effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum EffectParameters {
    /// Source straight to output
    Identity,
    /// Playback-rate change (pitch follows tempo)
    Tempo { playback_rate: f64 },
    /// Serial chain of filter and shaper stages
    Chain(Vec<StageSpec>),
    /// Feedback delay mixed with the dry signal
    Echo(EchoParams),
    /// Stereo pan rotating around the listener
    Rotate(RotateParams),
    /// Input reversed before processing
    Reverse,
}

impl EffectParameters {
    /// Playback rate of the source node
    pub fn playback_rate(&self) -> f64 {
        match self {
            EffectParameters::Tempo { playback_rate } => *playback_rate,
            _ => 1.0,
        }
    }

    /// True when the output is stereo regardless of the input layout
    pub fn forces_stereo(&self) -> bool {
        matches!(self, EffectParameters::Rotate(_))
    }

    /// True when the decoded input is time-reversed before graph construction
    pub fn reverses_input(&self) -> bool {
        matches!(self, EffectParameters::Reverse)
    }
}

/// Map an effect onto its processing parameters
///
/// Pure and total. Adding an [`EffectType`] without a row here does not
/// compile.
pub fn resolve_parameters(effect: EffectType) -> EffectParameters {
    use EffectParameters::*;

    let tempo = |playback_rate: f64| Tempo { playback_rate };

    match effect {
        EffectType::Slow050 => tempo(0.5),
        EffectType::Slow075 => tempo(0.75),
        EffectType::Slow085 => tempo(0.85),
        EffectType::Slow090 => tempo(0.9),
        EffectType::Fast110 => tempo(1.1),
        EffectType::Fast125 => tempo(1.25),
        EffectType::Fast150 => tempo(1.5),
        EffectType::Fast200 => tempo(2.0),
        EffectType::Nightcore => tempo(1.25),

        EffectType::BassBoost => Chain(vec![StageSpec::Filter(BiquadSpec::low_shelf(200.0, 15.0))]),
        EffectType::TrebleBoost => {
            Chain(vec![StageSpec::Filter(BiquadSpec::high_shelf(2000.0, 12.0))])
        }
        EffectType::VocalBoost => {
            Chain(vec![StageSpec::Filter(BiquadSpec::peaking(1000.0, 1.0, 8.0))])
        }
        EffectType::Telephone => Chain(vec![
            StageSpec::Filter(BiquadSpec::high_pass(500.0)),
            StageSpec::Filter(BiquadSpec::low_pass(2000.0)),
        ]),
        EffectType::Underwater => {
            Chain(vec![StageSpec::Filter(BiquadSpec::low_pass(400.0).with_q(1.0))])
        }
        EffectType::Radio => Chain(vec![StageSpec::Filter(BiquadSpec::high_pass(1500.0))]),
        EffectType::LoFi => Chain(vec![
            StageSpec::Filter(BiquadSpec::low_pass(3500.0)),
            StageSpec::Filter(BiquadSpec::high_pass(300.0)),
            StageSpec::Shaper(ShaperSpec::new(5.0, Oversample::X4)),
        ]),
        EffectType::Distortion => {
            Chain(vec![StageSpec::Shaper(ShaperSpec::new(400.0, Oversample::X4))])
        }

        EffectType::Echo => Echo(EchoParams {
            delay_seconds: 0.3,
            feedback_gain: 0.4,
            damping_hz: 1000.0,
        }),
        EffectType::EightD => Rotate(RotateParams {
            period_seconds: 8.0,
            step_seconds: 0.1,
        }),
        EffectType::Reverse => Reverse,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::FilterKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_effect_resolves() {
        for effect in EffectType::ALL {
            let params = resolve_parameters(effect);
            let rate = params.playback_rate();
            assert!(rate.is_finite() && rate > 0.0, "{effect}: rate {rate}");
        }
    }

    #[test]
    fn test_tempo_table() {
        let expected = [
            (EffectType::Slow050, 0.5),
            (EffectType::Slow075, 0.75),
            (EffectType::Slow085, 0.85),
            (EffectType::Slow090, 0.9),
            (EffectType::Fast110, 1.1),
            (EffectType::Fast125, 1.25),
            (EffectType::Fast150, 1.5),
            (EffectType::Fast200, 2.0),
            (EffectType::Nightcore, 1.25),
        ];
        for (effect, rate) in expected {
            assert_eq!(
                resolve_parameters(effect),
                EffectParameters::Tempo {
                    playback_rate: rate
                }
            );
        }
    }

    #[test]
    fn test_non_tempo_effects_play_at_unit_rate() {
        for effect in [
            EffectType::BassBoost,
            EffectType::EightD,
            EffectType::Echo,
            EffectType::Reverse,
            EffectType::Distortion,
        ] {
            assert_eq!(resolve_parameters(effect).playback_rate(), 1.0);
        }
    }

    #[test]
    fn test_lofi_chain_order() {
        let EffectParameters::Chain(stages) = resolve_parameters(EffectType::LoFi) else {
            panic!("lo-fi must be a chain");
        };
        assert_eq!(stages.len(), 3);
        assert!(matches!(stages[0], StageSpec::Filter(f) if f.kind == FilterKind::LowPass && f.frequency == 3500.0));
        assert!(matches!(stages[1], StageSpec::Filter(f) if f.kind == FilterKind::HighPass && f.frequency == 300.0));
        assert_eq!(stages[2], StageSpec::Shaper(ShaperSpec::new(5.0, Oversample::X4)));
    }

    #[test]
    fn test_filter_rows() {
        assert_eq!(
            resolve_parameters(EffectType::BassBoost),
            EffectParameters::Chain(vec![StageSpec::Filter(BiquadSpec::new(
                FilterKind::LowShelf,
                200.0,
                1.0,
                15.0
            ))])
        );
        assert_eq!(
            resolve_parameters(EffectType::VocalBoost),
            EffectParameters::Chain(vec![StageSpec::Filter(BiquadSpec::new(
                FilterKind::Peaking,
                1000.0,
                1.0,
                8.0
            ))])
        );
        assert_eq!(
            resolve_parameters(EffectType::Telephone),
            EffectParameters::Chain(vec![
                StageSpec::Filter(BiquadSpec::high_pass(500.0)),
                StageSpec::Filter(BiquadSpec::low_pass(2000.0)),
            ])
        );
    }

    #[test]
    fn test_flags() {
        assert!(resolve_parameters(EffectType::EightD).forces_stereo());
        assert!(resolve_parameters(EffectType::Reverse).reverses_input());
        assert!(!resolve_parameters(EffectType::Echo).forces_stereo());
        assert!(!resolve_parameters(EffectType::Nightcore).reverses_input());
    }

    #[test]
    fn test_parameters_serialize() {
        let json = serde_json::to_value(resolve_parameters(EffectType::Echo)).unwrap();
        assert_eq!(json["type"], "echo");
        assert_eq!(json["params"]["delay_seconds"], 0.3);
    }
}
