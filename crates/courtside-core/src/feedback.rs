use serde::{Deserialize, Serialize};

use crate::game_trait::{FeedbackKind, FeedbackSink};

/// Maximum number of simultaneously visible feedback messages.
pub const MAX_VISIBLE_FEEDBACK: usize = 3;

/// Default display duration for a feedback message in seconds.
pub const DEFAULT_FEEDBACK_DURATION_SECS: f32 = 2.0;

/// A feedback message queued for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub message: String,
    pub kind: FeedbackKind,
    /// Seconds of display time left.
    pub remaining: f32,
}

/// Queue managing transient feedback display.
///
/// Time only advances through [`FeedbackQueue::tick`], so expiry follows the
/// simulation clock rather than wall time.
#[derive(Debug, Clone)]
pub struct FeedbackQueue {
    duration: f32,
    visible: Vec<Feedback>,
    pending: Vec<Feedback>,
}

impl FeedbackQueue {
    pub fn new() -> Self {
        Self::with_duration(DEFAULT_FEEDBACK_DURATION_SECS)
    }

    pub fn with_duration(duration: f32) -> Self {
        Self {
            duration,
            visible: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Add a new message to the queue.
    pub fn push(&mut self, message: &str, kind: FeedbackKind) {
        let feedback = Feedback {
            message: message.to_string(),
            kind,
            remaining: self.duration,
        };
        if self.visible.len() < MAX_VISIBLE_FEEDBACK {
            self.visible.push(feedback);
        } else {
            self.pending.push(feedback);
        }
    }

    /// Age visible messages, drop expired ones and promote pending ones.
    pub fn tick(&mut self, dt: f32) {
        for feedback in &mut self.visible {
            feedback.remaining -= dt;
        }
        self.visible.retain(|f| f.remaining > 0.0);
        while self.visible.len() < MAX_VISIBLE_FEEDBACK && !self.pending.is_empty() {
            self.visible.push(self.pending.remove(0));
        }
    }

    /// Get currently visible messages.
    pub fn visible(&self) -> &[Feedback] {
        &self.visible
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.visible.clear();
        self.pending.clear();
    }
}

impl Default for FeedbackQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackSink for FeedbackQueue {
    fn show_feedback(&mut self, message: &str, kind: FeedbackKind) {
        self.push(message, kind);
    }
}
