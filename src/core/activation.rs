//! Hold and cool-down tracking for gesture-triggered actions.
//!
//! A pose only triggers an action once it has been held for a while, and each
//! action then waits out its own cool-down before it can fire again.

use crate::core::classifier::GestureLabel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Actions a sustained gesture can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ColorChange,
    ShapeChange,
    Burst,
    Chaos,
    Web,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ColorChange => "color_change",
            Self::ShapeChange => "shape_change",
            Self::Burst => "burst",
            Self::Chaos => "chaos",
            Self::Web => "web",
        }
    }
}

/// Binds a gesture to an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBinding {
    pub action: ActionKind,
    pub label: GestureLabel,
    /// The gesture must be held strictly longer than this
    pub hold_ms: f64,
    /// Minimum time between two firings of this action
    pub cooldown_ms: f64,
}

impl ActionBinding {
    pub fn new(action: ActionKind, label: GestureLabel, hold_ms: f64, cooldown_ms: f64) -> Self {
        Self {
            action,
            label,
            hold_ms,
            cooldown_ms,
        }
    }
}

/// The stock action table.
pub fn default_bindings() -> Vec<ActionBinding> {
    vec![
        ActionBinding::new(ActionKind::ColorChange, GestureLabel::Point, 400.0, 1200.0),
        ActionBinding::new(ActionKind::ShapeChange, GestureLabel::Peace, 400.0, 1200.0),
        ActionBinding::new(ActionKind::Burst, GestureLabel::Thumbsup, 200.0, 1500.0),
        ActionBinding::new(ActionKind::Chaos, GestureLabel::Rock, 300.0, 0.0),
        ActionBinding::new(ActionKind::Web, GestureLabel::Spiderman, 300.0, 0.0),
    ]
}

/// Per-hand hold timer and per-action cool-down clocks.
#[derive(Debug, Clone, Default)]
pub struct ActivationState {
    current_label: Option<GestureLabel>,
    hold_duration_ms: f64,
    last_triggered: HashMap<ActionKind, f64>,
}

impl ActivationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the smoothed label for one frame.
    pub fn observe(&mut self, label: GestureLabel, frame_interval_ms: f64) {
        if self.current_label == Some(label) {
            self.hold_duration_ms += frame_interval_ms;
        } else {
            debug!(from = ?self.current_label, to = %label, "gesture transition");
            self.current_label = Some(label);
            self.hold_duration_ms = 0.0;
        }
    }

    /// Hand left the frame. Cool-down clocks keep running.
    pub fn release(&mut self) {
        if self.current_label.is_some() {
            debug!(from = ?self.current_label, "gesture released");
        }
        self.current_label = None;
        self.hold_duration_ms = 0.0;
    }

    /// Fire `binding` at `now_ms` if its hold and cool-down conditions are met.
    ///
    /// Firing records the time but does not reset the hold.
    pub fn try_fire(&mut self, binding: &ActionBinding, now_ms: f64) -> bool {
        if self.current_label != Some(binding.label) || self.hold_duration_ms <= binding.hold_ms {
            return false;
        }

        let cooled = match self.last_triggered.get(&binding.action) {
            None => true,
            Some(&last) => now_ms - last > binding.cooldown_ms,
        };
        if !cooled {
            return false;
        }

        self.last_triggered.insert(binding.action, now_ms);
        debug!(
            action = binding.action.as_str(),
            label = %binding.label,
            hold_ms = self.hold_duration_ms,
            at_ms = now_ms,
            "action fired"
        );
        true
    }

    /// Try every binding and return the actions that fired, in binding order.
    pub fn fire_ready(&mut self, bindings: &[ActionBinding], now_ms: f64) -> Vec<ActionKind> {
        bindings
            .iter()
            .filter(|binding| self.try_fire(binding, now_ms))
            .map(|binding| binding.action)
            .collect()
    }

    pub fn current_label(&self) -> Option<GestureLabel> {
        self.current_label
    }

    pub fn hold_duration_ms(&self) -> f64 {
        self.hold_duration_ms
    }

    /// When `action` last fired, `None` if never.
    pub fn last_triggered_at(&self, action: ActionKind) -> Option<f64> {
        self.last_triggered.get(&action).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_MS: f64 = 50.0;

    fn color_binding() -> ActionBinding {
        ActionBinding::new(ActionKind::ColorChange, GestureLabel::Point, 400.0, 1200.0)
    }

    /// Observe `label` every `FRAME_MS` from `start` through `end` inclusive,
    /// recording the times at which `binding` fired.
    fn run(
        state: &mut ActivationState,
        binding: &ActionBinding,
        label: GestureLabel,
        start: f64,
        end: f64,
    ) -> Vec<f64> {
        let mut fired = Vec::new();
        let mut now = start;
        while now <= end {
            state.observe(label, FRAME_MS);
            if state.try_fire(binding, now) {
                fired.push(now);
            }
            now += FRAME_MS;
        }
        fired
    }

    #[test]
    fn test_hold_accumulates_and_resets() {
        let mut state = ActivationState::new();
        state.observe(GestureLabel::Fist, 16.0);
        assert_eq!(state.hold_duration_ms(), 0.0);
        state.observe(GestureLabel::Fist, 16.0);
        state.observe(GestureLabel::Fist, 16.0);
        assert_eq!(state.hold_duration_ms(), 32.0);

        state.observe(GestureLabel::Palm, 16.0);
        assert_eq!(state.current_label(), Some(GestureLabel::Palm));
        assert_eq!(state.hold_duration_ms(), 0.0);
    }

    #[test]
    fn test_fires_once_after_hold() {
        let mut state = ActivationState::new();
        let binding = color_binding();

        // First frame at t=0 starts the hold; hold exceeds 400 at t=450.
        let fired = run(&mut state, &binding, GestureLabel::Point, 0.0, 1600.0);
        assert_eq!(fired, vec![450.0]);
        assert_eq!(state.last_triggered_at(ActionKind::ColorChange), Some(450.0));
    }

    #[test]
    fn test_cooldown_boundary() {
        let mut state = ActivationState::new();
        let binding = color_binding();
        run(&mut state, &binding, GestureLabel::Point, 0.0, 450.0);

        state.observe(GestureLabel::Point, FRAME_MS);
        assert!(!state.try_fire(&binding, 450.0 + 1199.0));
        state.observe(GestureLabel::Point, FRAME_MS);
        assert!(state.try_fire(&binding, 450.0 + 1201.0));
    }

    #[test]
    fn test_exact_hold_does_not_fire() {
        let mut state = ActivationState::new();
        let binding = ActionBinding::new(ActionKind::Burst, GestureLabel::Thumbsup, 200.0, 1500.0);
        for _ in 0..5 {
            state.observe(GestureLabel::Thumbsup, 50.0);
        }
        assert_eq!(state.hold_duration_ms(), 200.0);
        assert!(!state.try_fire(&binding, 200.0));

        state.observe(GestureLabel::Thumbsup, 1.0);
        assert!(state.try_fire(&binding, 201.0));
    }

    #[test]
    fn test_wrong_label_never_fires() {
        let mut state = ActivationState::new();
        let fired = run(&mut state, &color_binding(), GestureLabel::Peace, 0.0, 2000.0);
        assert!(fired.is_empty());
    }

    #[test]
    fn test_release_keeps_cooldowns() {
        let mut state = ActivationState::new();
        let binding = color_binding();
        run(&mut state, &binding, GestureLabel::Point, 0.0, 450.0);

        state.release();
        assert_eq!(state.current_label(), None);
        assert_eq!(state.hold_duration_ms(), 0.0);
        assert_eq!(state.last_triggered_at(ActionKind::ColorChange), Some(450.0));

        // Hand returns and holds again; still inside the cool-down.
        let fired = run(&mut state, &binding, GestureLabel::Point, 600.0, 1600.0);
        assert!(fired.is_empty());
    }

    #[test]
    fn test_actions_cool_down_independently() {
        let mut state = ActivationState::new();
        let point = color_binding();
        let peace = ActionBinding::new(ActionKind::ShapeChange, GestureLabel::Peace, 400.0, 1200.0);

        assert_eq!(run(&mut state, &point, GestureLabel::Point, 0.0, 450.0), vec![450.0]);
        // Switching to peace must not be blocked by the color cool-down.
        assert_eq!(run(&mut state, &peace, GestureLabel::Peace, 500.0, 950.0), vec![950.0]);
        assert_eq!(state.last_triggered_at(ActionKind::ColorChange), Some(450.0));
    }

    #[test]
    fn test_zero_cooldown_fires_every_advancing_frame() {
        let mut state = ActivationState::new();
        let chaos = ActionBinding::new(ActionKind::Chaos, GestureLabel::Rock, 300.0, 0.0);
        let fired = run(&mut state, &chaos, GestureLabel::Rock, 0.0, 500.0);
        assert_eq!(fired, vec![350.0, 400.0, 450.0, 500.0]);

        // Same timestamp again does not count as time advancing.
        state.observe(GestureLabel::Rock, 0.0);
        assert!(!state.try_fire(&chaos, 500.0));
    }

    #[test]
    fn test_fire_ready_in_binding_order() {
        let mut state = ActivationState::new();
        let bindings = vec![
            ActionBinding::new(ActionKind::Chaos, GestureLabel::Rock, 100.0, 0.0),
            ActionBinding::new(ActionKind::Burst, GestureLabel::Thumbsup, 100.0, 0.0),
            ActionBinding::new(ActionKind::Web, GestureLabel::Rock, 50.0, 1000.0),
        ];
        for _ in 0..4 {
            state.observe(GestureLabel::Rock, 50.0);
        }
        assert_eq!(
            state.fire_ready(&bindings, 150.0),
            vec![ActionKind::Chaos, ActionKind::Web]
        );
    }

    #[test]
    fn test_default_bindings_table() {
        let bindings = default_bindings();
        assert_eq!(bindings.len(), 5);
        let chaos = bindings.iter().find(|b| b.action == ActionKind::Chaos).unwrap();
        assert_eq!(chaos.label, GestureLabel::Rock);
        assert_eq!(chaos.cooldown_ms, 0.0);
    }

    #[test]
    fn test_action_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ActionKind::ColorChange).unwrap();
        assert_eq!(json, "\"color_change\"");
    }
}
