//! Progress reporting
//!
//! The pipeline reports a percentage at fixed milestones. Values seen by a
//! reporter never decrease during a run, and 100 is only reported when the
//! output is ready. A failed run ends with [`ProgressReporter::reset`].

use log::debug;

/// Receives progress updates
pub trait ProgressReporter {
    /// New progress value in `[0, 100]`
    fn report(&mut self, percent: u8);

    /// The run failed; progress goes back to zero
    fn reset(&mut self);
}

/// Closures receive progress values; a reset arrives as a report of 0
impl<F: FnMut(u8)> ProgressReporter for F {
    fn report(&mut self, percent: u8) {
        self(percent)
    }

    fn reset(&mut self) {
        self(0)
    }
}

/// Pipeline checkpoints and the percentage each one reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Milestone {
    /// Input passed the size check
    Accepted,
    DecodeStarted,
    Decoded,
    RenderStarted,
    Rendered,
    /// WAV encoded, output ready
    Complete,
}

impl Milestone {
    pub fn percent(&self) -> u8 {
        match self {
            Milestone::Accepted => 5,
            Milestone::DecodeStarted => 30,
            Milestone::Decoded => 40,
            Milestone::RenderStarted => 60,
            Milestone::Rendered => 85,
            Milestone::Complete => 100,
        }
    }
}

/// Forwards milestones to a reporter, dropping anything that would move
/// progress backwards
pub struct ProgressTracker<'a, P: ProgressReporter + ?Sized> {
    reporter: &'a mut P,
    last: u8,
}

impl<'a, P: ProgressReporter + ?Sized> ProgressTracker<'a, P> {
    pub fn new(reporter: &'a mut P) -> Self {
        Self { reporter, last: 0 }
    }

    /// Report a milestone if it moves progress forward
    pub fn advance(&mut self, milestone: Milestone) {
        let percent = milestone.percent().min(100);
        if percent > self.last {
            debug!("Progress: {}% ({:?})", percent, milestone);
            self.last = percent;
            self.reporter.report(percent);
        }
    }

    /// Last value reported
    pub fn current(&self) -> u8 {
        self.last
    }

    /// Reset the reporter after a failure
    pub fn fail(&mut self) {
        self.last = 0;
        self.reporter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        values: Vec<u8>,
        resets: usize,
    }

    impl ProgressReporter for Recorder {
        fn report(&mut self, percent: u8) {
            self.values.push(percent);
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    #[test]
    fn test_milestones_are_increasing() {
        let all = [
            Milestone::Accepted,
            Milestone::DecodeStarted,
            Milestone::Decoded,
            Milestone::RenderStarted,
            Milestone::Rendered,
            Milestone::Complete,
        ];
        let percents: Vec<u8> = all.iter().map(|m| m.percent()).collect();
        assert_eq!(percents, vec![5, 30, 40, 60, 85, 100]);
    }

    #[test]
    fn test_tracker_drops_backwards_moves() {
        let mut recorder = Recorder::default();
        let mut tracker = ProgressTracker::new(&mut recorder);
        tracker.advance(Milestone::Decoded);
        tracker.advance(Milestone::Accepted);
        tracker.advance(Milestone::Decoded);
        tracker.advance(Milestone::Rendered);
        assert_eq!(tracker.current(), 85);
        assert_eq!(recorder.values, vec![40, 85]);
    }

    #[test]
    fn test_fail_resets_reporter() {
        let mut recorder = Recorder::default();
        let mut tracker = ProgressTracker::new(&mut recorder);
        tracker.advance(Milestone::Accepted);
        tracker.fail();
        assert_eq!(tracker.current(), 0);
        assert_eq!(recorder.resets, 1);
    }

    #[test]
    fn test_closure_reporter() {
        let mut seen = Vec::new();
        {
            let mut closure = |p: u8| seen.push(p);
            let mut tracker = ProgressTracker::new(&mut closure);
            tracker.advance(Milestone::Accepted);
            tracker.fail();
        }
        assert_eq!(seen, vec![5, 0]);
    }
}
