//! Temporal smoothing of raw per-frame labels.
//!
//! A short majority vote over the most recent raw classifications, so one
//! misread frame does not flip the reported gesture.

use crate::core::classifier::GestureLabel;
use std::collections::VecDeque;

/// Default number of frames in the vote.
pub const DEFAULT_WINDOW: usize = 5;

/// Fixed-capacity FIFO of raw labels with a majority vote.
#[derive(Debug, Clone)]
pub struct SmoothingWindow {
    labels: VecDeque<GestureLabel>,
    capacity: usize,
}

impl Default for SmoothingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl SmoothingWindow {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            labels: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add the newest raw label and return the smoothed label.
    pub fn push(&mut self, label: GestureLabel) -> GestureLabel {
        if self.labels.len() == self.capacity {
            self.labels.pop_front();
        }
        self.labels.push_back(label);
        self.vote(label)
    }

    /// Current smoothed label without pushing, `None` if the window is empty.
    pub fn smoothed(&self) -> Option<GestureLabel> {
        self.labels.back().map(|&newest| self.vote(newest))
    }

    /// Forget all history, e.g. when the hand leaves the frame.
    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most frequent label in the window.
    ///
    /// Ties go to `newest` if it is among the leaders, otherwise to the
    /// leader that appears earliest in the window.
    fn vote(&self, newest: GestureLabel) -> GestureLabel {
        let count = |label: GestureLabel| self.labels.iter().filter(|&&l| l == label).count();

        let mut best = newest;
        let mut best_count = count(newest);
        for &label in &self.labels {
            let n = count(label);
            if n > best_count {
                best = label;
                best_count = n;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GestureLabel::{Fist, Palm, Peace, Point, Unknown};

    fn push_all(window: &mut SmoothingWindow, labels: &[GestureLabel]) -> GestureLabel {
        let mut last = Unknown;
        for &label in labels {
            last = window.push(label);
        }
        last
    }

    #[test]
    fn test_single_frame_flicker_absorbed() {
        let mut window = SmoothingWindow::new(5);
        assert_eq!(push_all(&mut window, &[Fist, Fist, Palm, Fist, Fist]), Fist);
    }

    #[test]
    fn test_tie_goes_to_earliest_leader() {
        let mut window = SmoothingWindow::new(5);
        assert_eq!(push_all(&mut window, &[Fist, Fist, Palm, Palm, Unknown]), Fist);
    }

    #[test]
    fn test_tie_goes_to_newest_when_leading() {
        let mut window = SmoothingWindow::new(4);
        assert_eq!(push_all(&mut window, &[Fist, Fist, Palm, Palm]), Palm);
    }

    #[test]
    fn test_first_push_returns_label() {
        let mut window = SmoothingWindow::new(5);
        assert_eq!(window.push(Point), Point);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_window_slides() {
        let mut window = SmoothingWindow::new(3);
        push_all(&mut window, &[Fist, Fist, Fist]);
        assert_eq!(window.push(Peace), Fist);
        assert_eq!(window.push(Peace), Peace);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_result_is_present_in_window() {
        let mut window = SmoothingWindow::new(5);
        let sequence = [Fist, Palm, Point, Peace, Unknown, Palm, Fist, Point];
        for label in sequence {
            let smoothed = window.push(label);
            assert!(window.labels.contains(&smoothed));
        }
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut window = SmoothingWindow::new(0);
        assert_eq!(window.capacity(), 1);
        window.push(Fist);
        assert_eq!(window.push(Palm), Palm);
    }

    #[test]
    fn test_clear_and_smoothed() {
        let mut window = SmoothingWindow::default();
        assert_eq!(window.smoothed(), None);
        push_all(&mut window, &[Palm, Palm, Fist]);
        assert_eq!(window.smoothed(), Some(Palm));

        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.smoothed(), None);
    }
}
