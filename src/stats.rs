//! Session statistics for a recognition run.
//!
//! Counters are atomic so the frame reader thread and the pipeline loop can
//! both record into one shared instance. Nothing here is written to disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Running counters for the current session.
#[derive(Debug)]
pub struct SessionStats {
    /// Frames pushed through the pipeline
    frames_processed: AtomicU64,
    /// Individual hand observations classified
    hands_observed: AtomicU64,
    /// Frames that reported no hand
    frames_without_hands: AtomicU64,
    /// Hand poses rejected by the feature extractor
    rejected_poses: AtomicU64,
    /// Input lines that could not be parsed as a frame
    malformed_lines: AtomicU64,
    /// Bound actions that fired
    actions_fired: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            frames_processed: AtomicU64::new(0),
            hands_observed: AtomicU64::new(0),
            frames_without_hands: AtomicU64::new(0),
            rejected_poses: AtomicU64::new(0),
            malformed_lines: AtomicU64::new(0),
            actions_fired: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    pub fn record_frame(&self) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hands(&self, count: u64) {
        self.hands_observed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_frame_without_hands(&self) {
        self.frames_without_hands.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_pose(&self) {
        self.rejected_poses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed_line(&self) {
        self.malformed_lines.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_actions(&self, count: u64) {
        self.actions_fired.fetch_add(count, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            hands_observed: self.hands_observed.load(Ordering::Relaxed),
            frames_without_hands: self.frames_without_hands.load(Ordering::Relaxed),
            rejected_poses: self.rejected_poses.load(Ordering::Relaxed),
            malformed_lines: self.malformed_lines.load(Ordering::Relaxed),
            actions_fired: self.actions_fired.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Session Statistics:\n\
             - Frames processed: {}\n\
             - Hand observations: {}\n\
             - Frames without hands: {}\n\
             - Rejected poses: {}\n\
             - Malformed input lines: {}\n\
             - Actions fired: {}\n\
             - Session duration: {} seconds",
            stats.frames_processed,
            stats.hands_observed,
            stats.frames_without_hands,
            stats.rejected_poses,
            stats.malformed_lines,
            stats.actions_fired,
            stats.session_duration_secs
        )
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.frames_processed.store(0, Ordering::Relaxed);
        self.hands_observed.store(0, Ordering::Relaxed);
        self.frames_without_hands.store(0, Ordering::Relaxed);
        self.rejected_poses.store(0, Ordering::Relaxed);
        self.malformed_lines.store(0, Ordering::Relaxed);
        self.actions_fired.store(0, Ordering::Relaxed);
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the session counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub frames_processed: u64,
    pub hands_observed: u64,
    pub frames_without_hands: u64,
    pub rejected_poses: u64,
    pub malformed_lines: u64,
    pub actions_fired: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Thread-safe shared statistics.
pub type SharedSessionStats = Arc<SessionStats>;

/// Create a new shared statistics instance.
pub fn create_shared_stats() -> SharedSessionStats {
    Arc::new(SessionStats::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counting() {
        let stats = SessionStats::new();

        stats.record_frame();
        stats.record_frame();
        stats.record_hands(3);
        stats.record_frame_without_hands();
        stats.record_actions(2);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.frames_processed, 2);
        assert_eq!(snapshot.hands_observed, 3);
        assert_eq!(snapshot.frames_without_hands, 1);
        assert_eq!(snapshot.actions_fired, 2);
        assert_eq!(snapshot.rejected_poses, 0);
    }

    #[test]
    fn test_stats_shared_across_threads() {
        let stats = create_shared_stats();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        stats.record_malformed_line();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.snapshot().malformed_lines, 400);
    }

    #[test]
    fn test_stats_reset() {
        let stats = SessionStats::new();
        stats.record_hands(10);
        stats.record_rejected_pose();
        stats.reset();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.hands_observed, 0);
        assert_eq!(snapshot.rejected_poses, 0);
    }

    #[test]
    fn test_summary_format() {
        let stats = SessionStats::new();
        let summary = stats.summary();

        assert!(summary.contains("Frames processed"));
        assert!(summary.contains("Rejected poses"));
        assert!(summary.contains("Actions fired"));
    }
}
