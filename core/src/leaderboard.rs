use serde::Serialize;

use crate::constants::LEADERBOARD_CAPACITY;

/// Best completed-run scores, highest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    capacity: usize,
    scores: Vec<u32>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::with_capacity(LEADERBOARD_CAPACITY)
    }
}

impl Leaderboard {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            scores: Vec::with_capacity(capacity + 1),
        }
    }

    /// Records a finished run. Returns the zero-based rank when the score made the board.
    pub fn record(&mut self, score: u32) -> Option<usize> {
        // Equal scores keep arrival order: the newer entry ranks below the older one.
        let rank = self
            .scores
            .iter()
            .position(|existing| score > *existing)
            .unwrap_or(self.scores.len());
        self.scores.insert(rank, score);
        self.scores.truncate(self.capacity);
        (rank < self.capacity).then_some(rank)
    }

    #[inline]
    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn best(&self) -> Option<u32> {
        self.scores.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_top_three_descending() {
        let mut board = Leaderboard::default();
        for score in [5, 9, 2, 9] {
            board.record(score);
        }
        assert_eq!(board.scores(), &[9, 9, 5]);
    }

    #[test]
    fn holds_min_of_runs_and_capacity() {
        let mut board = Leaderboard::default();
        assert!(board.scores().is_empty());
        board.record(4);
        assert_eq!(board.scores(), &[4]);
        board.record(1);
        assert_eq!(board.scores(), &[4, 1]);
        board.record(0);
        board.record(3);
        assert_eq!(board.scores(), &[4, 3, 1]);
        assert_eq!(board.best(), Some(4));
    }

    #[test]
    fn reports_rank_only_when_placed() {
        let mut board = Leaderboard::default();
        assert_eq!(board.record(10), Some(0));
        assert_eq!(board.record(20), Some(0));
        assert_eq!(board.record(15), Some(1));
        assert_eq!(board.record(1), None);
        assert_eq!(board.record(10), None);
        assert_eq!(board.record(11), Some(2));
    }

    #[test]
    fn serializes_scores() {
        let mut board = Leaderboard::default();
        board.record(2);
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["scores"], serde_json::json!([2]));
        assert_eq!(json["capacity"], serde_json::json!(3));
    }
}
