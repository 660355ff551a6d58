pub mod events;
pub mod feedback;
pub mod game_trait;
pub mod math;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::events::GameEvent;
    use crate::game_trait::{FeedbackKind, FeedbackSink, ScoreSink, Simulation};

    /// Score sink that records every call for later assertions.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct RecordingScoreSink {
        pub points: Vec<u32>,
        pub attempts: u32,
        pub made: u32,
        pub misses: u32,
    }

    impl RecordingScoreSink {
        pub fn total_points(&self) -> u32 {
            self.points.iter().sum()
        }
    }

    impl ScoreSink for RecordingScoreSink {
        fn add_score(&mut self, points: u32) {
            self.points.push(points);
        }

        fn increment_attempts(&mut self) {
            self.attempts += 1;
        }

        fn increment_made(&mut self) {
            self.made += 1;
        }

        fn record_miss(&mut self) {
            self.misses += 1;
        }
    }

    /// Feedback sink that keeps every message in order.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct RecordingFeedback {
        pub messages: Vec<(String, FeedbackKind)>,
    }

    impl RecordingFeedback {
        pub fn contains(&self, message: &str) -> bool {
            self.messages.iter().any(|(m, _)| m == message)
        }

        pub fn count(&self, message: &str) -> usize {
            self.messages.iter().filter(|(m, _)| m == message).count()
        }
    }

    impl FeedbackSink for RecordingFeedback {
        fn show_feedback(&mut self, message: &str, kind: FeedbackKind) {
            self.messages.push((message.to_string(), kind));
        }
    }

    /// Run `n` fixed steps at the simulation's own rate, returning all events.
    pub fn run_ticks(sim: &mut dyn Simulation, n: usize) -> Vec<GameEvent> {
        let dt = 1.0 / sim.tick_rate();
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(sim.fixed_update(dt));
        }
        all_events
    }

    /// Run fixed steps until `done` returns true or `max_ticks` elapse.
    /// Returns the events and whether the predicate was met.
    pub fn run_until(
        sim: &mut dyn Simulation,
        max_ticks: usize,
        mut done: impl FnMut(&[GameEvent]) -> bool,
    ) -> (Vec<GameEvent>, bool) {
        let dt = 1.0 / sim.tick_rate();
        let mut all_events = Vec::new();
        for _ in 0..max_ticks {
            all_events.extend(sim.fixed_update(dt));
            if done(&all_events) {
                return (all_events, true);
            }
        }
        (all_events, false)
    }
}
