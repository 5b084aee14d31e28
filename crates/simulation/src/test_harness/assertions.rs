//! Assertion helpers for `TestLine` integration tests.

use crate::tracks::Track;

use super::TestLine;

impl TestLine {
    pub fn assert_score(&self, expected: u32) {
        let score = self.session().score;
        assert_eq!(score, expected, "Expected score {expected}, got {score}");
    }

    pub fn assert_train_count(&mut self, expected: usize) {
        let count = self.train_count();
        assert_eq!(count, expected, "Expected {expected} trains, got {count}");
    }

    /// Assert the only train on the line runs on `track`.
    pub fn assert_single_train_on(&mut self, track: Track) {
        let trains = self.trains();
        assert_eq!(trains.len(), 1, "Expected one train, got {}", trains.len());
        assert_eq!(
            trains[0].track, track,
            "Expected train on {track}, found it on {}",
            trains[0].track
        );
    }

    pub fn assert_no_layout_violations(&self) {
        let v = self.violations();
        assert_eq!(v.total(), 0, "Expected a clean layout audit, got {v:?}");
    }
}
