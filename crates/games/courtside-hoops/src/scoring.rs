use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use courtside_core::game_trait::ScoreSink;

use crate::config::ScoringConfig;

pub const SHOT_MADE_MESSAGE: &str = "SHOT MADE!";
pub const MISSED_SHOT_MESSAGE: &str = "MISSED SHOT";
pub const BALL_RESET_MESSAGE: &str = "Ball Reset";
pub const CANNOT_SHOOT_MESSAGE: &str = "Cannot shoot now";

/// Number of recent outcomes kept for the trend readout.
pub const RECENT_SHOTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryKind {
    Attempt,
    Made,
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    pub points: u32,
    pub total_score: u32,
    pub shot_number: u32,
}

/// Session totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreStats {
    pub total_score: u32,
    pub attempts: u32,
    pub made: u32,
    pub misses: u32,
    pub streak: u32,
    pub best_streak: u32,
}

impl ScoreStats {
    /// Made over attempted, in percent. Zero before the first attempt.
    pub fn percentage(&self) -> f32 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.made as f32 / self.attempts as f32 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    None,
    Improving,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecentPerformance {
    pub attempts: usize,
    pub made: usize,
    pub percentage: f32,
    pub trend: Trend,
}

/// Session score keeper. The shot flow drives it through [`ScoreSink`].
#[derive(Debug, Clone)]
pub struct Scoreboard {
    stats: ScoreStats,
    history: VecDeque<HistoryEntry>,
    history_len: usize,
    recent: VecDeque<bool>,
}

impl Scoreboard {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            stats: ScoreStats::default(),
            history: VecDeque::with_capacity(config.history_len),
            history_len: config.history_len,
            recent: VecDeque::with_capacity(RECENT_SHOTS),
        }
    }

    pub fn stats(&self) -> ScoreStats {
        self.stats
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    fn push_history(&mut self, kind: HistoryKind, points: u32) {
        self.history.push_back(HistoryEntry {
            kind,
            points,
            total_score: self.stats.total_score,
            shot_number: self.stats.attempts,
        });
        while self.history.len() > self.history_len {
            self.history.pop_front();
        }
    }

    fn push_recent(&mut self, made: bool) {
        self.recent.push_back(made);
        while self.recent.len() > RECENT_SHOTS {
            self.recent.pop_front();
        }
    }

    /// Make rate over the last few outcomes, and whether the later half
    /// beats the earlier half by more than ten points.
    pub fn recent_performance(&self) -> RecentPerformance {
        let attempts = self.recent.len();
        let made = self.recent.iter().filter(|m| **m).count();
        let percentage = if attempts == 0 {
            0.0
        } else {
            made as f32 / attempts as f32 * 100.0
        };

        let trend = if attempts >= 6 {
            let half = attempts / 2;
            let rate = |shots: Vec<bool>| {
                shots.iter().filter(|m| **m).count() as f32 / shots.len() as f32 * 100.0
            };
            let first = rate(self.recent.iter().take(half).copied().collect());
            let last = rate(self.recent.iter().skip(attempts - half).copied().collect());
            if last > first + 10.0 {
                Trend::Improving
            } else if last < first - 10.0 {
                Trend::Declining
            } else {
                Trend::Stable
            }
        } else {
            Trend::None
        };

        RecentPerformance {
            attempts,
            made,
            percentage,
            trend,
        }
    }

    pub fn reset(&mut self) {
        self.stats = ScoreStats::default();
        self.history.clear();
        self.recent.clear();
    }
}

impl ScoreSink for Scoreboard {
    fn add_score(&mut self, points: u32) {
        self.stats.total_score += points;
        self.push_history(HistoryKind::Made, points);
    }

    fn increment_attempts(&mut self) {
        self.stats.attempts += 1;
        self.push_history(HistoryKind::Attempt, 0);
    }

    fn increment_made(&mut self) {
        self.stats.made += 1;
        self.stats.streak += 1;
        self.stats.best_streak = self.stats.best_streak.max(self.stats.streak);
        self.push_recent(true);
    }

    fn record_miss(&mut self) {
        self.stats.misses += 1;
        self.stats.streak = 0;
        self.push_history(HistoryKind::Miss, 0);
        self.push_recent(false);
    }
}
