//! Parameter automation
//!
//! A timeline of set-value events. Between events the parameter holds the
//! most recent value, so a densely sampled curve becomes a staircase.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// One set-value event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutomationEvent {
    /// Time in seconds from the start of rendering
    pub time: f64,
    pub value: f32,
}

/// Piecewise-constant automation of a single parameter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Automation {
    /// Value before the first event
    default_value: f32,
    /// Events sorted by time
    events: Vec<AutomationEvent>,
}

impl Automation {
    pub fn new(default_value: f32) -> Self {
        Self {
            default_value,
            events: Vec::new(),
        }
    }

    /// Schedule `value` from `time` onwards
    ///
    /// An event at an already-scheduled time replaces the earlier one.
    pub fn set_value_at_time(&mut self, value: f32, time: f64) {
        let idx = self.events.partition_point(|e| e.time < time);
        match self.events.get_mut(idx) {
            Some(existing) if existing.time == time => existing.value = value,
            _ => self.events.insert(idx, AutomationEvent { time, value }),
        }
    }

    /// Value in effect at `time`
    pub fn value_at(&self, time: f64) -> f32 {
        let idx = self.events.partition_point(|e| e.time <= time);
        if idx == 0 {
            self.default_value
        } else {
            self.events[idx - 1].value
        }
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    pub fn default_value(&self) -> f32 {
        self.default_value
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Rotating-pan parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotateParams {
    /// Seconds for one full left-right-left cycle
    pub period_seconds: f64,
    /// Spacing of the automation control points
    pub step_seconds: f64,
}

/// Build the pan staircase `sin(2π t / period)` sampled every `step` seconds
/// over `[0, duration)`
///
/// Non-finite durations or parameters produce an empty automation.
pub fn pan_automation(params: &RotateParams, duration_secs: f64) -> Automation {
    let mut automation = Automation::new(0.0);
    if !(params.step_seconds > 0.0 && params.step_seconds.is_finite())
        || !(params.period_seconds > 0.0 && params.period_seconds.is_finite())
        || !duration_secs.is_finite()
    {
        return automation;
    }

    let mut i = 0u64;
    loop {
        let t = i as f64 * params.step_seconds;
        if t >= duration_secs {
            break;
        }
        let value = (2.0 * PI * t / params.period_seconds).sin() as f32;
        automation.set_value_at_time(value, t);
        i += 1;
    }

    automation
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_value_before_first_event_is_default() {
        let mut automation = Automation::new(0.25);
        automation.set_value_at_time(1.0, 0.5);
        assert_eq!(automation.value_at(0.0), 0.25);
        assert_eq!(automation.value_at(0.49), 0.25);
    }

    #[test]
    fn test_staircase_holds_last_value() {
        let mut automation = Automation::new(0.0);
        automation.set_value_at_time(0.5, 1.0);
        automation.set_value_at_time(-0.5, 0.0);
        automation.set_value_at_time(1.0, 2.0);

        assert_eq!(automation.value_at(0.0), -0.5);
        assert_eq!(automation.value_at(0.99), -0.5);
        assert_eq!(automation.value_at(1.0), 0.5);
        assert_eq!(automation.value_at(1.5), 0.5);
        assert_eq!(automation.value_at(100.0), 1.0);
    }

    #[test]
    fn test_same_time_replaces() {
        let mut automation = Automation::new(0.0);
        automation.set_value_at_time(0.3, 1.0);
        automation.set_value_at_time(0.7, 1.0);
        assert_eq!(automation.events().len(), 1);
        assert_eq!(automation.value_at(1.0), 0.7);
    }

    #[test]
    fn test_pan_automation_points() {
        let params = RotateParams {
            period_seconds: 8.0,
            step_seconds: 0.1,
        };
        let automation = pan_automation(&params, 2.0);

        // t = 0.0, 0.1, ..., 1.9
        assert_eq!(automation.events().len(), 20);
        assert_eq!(automation.events()[0].value, 0.0);
        for event in automation.events() {
            let expected = (2.0 * PI * event.time / 8.0).sin() as f32;
            assert_abs_diff_eq!(event.value, expected, epsilon = 1e-6);
        }

        let last = automation.events().last().unwrap();
        assert_abs_diff_eq!(last.time, 1.9, epsilon = 1e-9);
        assert!(last.value > 0.99);
    }

    #[test]
    fn test_pan_automation_degenerate_step() {
        let params = RotateParams {
            period_seconds: 8.0,
            step_seconds: 0.0,
        };
        assert!(pan_automation(&params, 2.0).is_empty());
    }

    #[test]
    fn test_pan_automation_non_finite_duration() {
        let params = RotateParams {
            period_seconds: 8.0,
            step_seconds: 0.1,
        };
        assert!(pan_automation(&params, f64::NAN).is_empty());
        assert!(pan_automation(&params, f64::INFINITY).is_empty());
    }
}
