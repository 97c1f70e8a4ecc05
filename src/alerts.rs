// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Alert log with per-source cooldown.
//!
//! A flagged action becomes an alert only if the same (source, action) pair
//! has not alerted within the cooldown window and the same message is not
//! among the most recent alerts.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::action::{Action, ActionType, Severity};

/// Number of most recent alerts checked for duplicate messages.
const RECENT_WINDOW: usize = 5;

/// A raised alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    /// Name of the camera or stream.
    pub source: String,
    /// Action that triggered the alert.
    pub action_type: ActionType,
    /// Severity of the action.
    pub severity: Severity,
    /// Display message, `"[source] description"`.
    pub message: String,
    /// Frame on which the action was seen.
    pub frame_idx: usize,
}

/// Cooldown-deduplicated alert history.
#[derive(Debug, Clone)]
pub struct AlertLog {
    cooldown: Duration,
    max_alerts: usize,
    last_alert: HashMap<(String, ActionType), Instant>,
    alerts: VecDeque<Alert>,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), 100)
    }
}

impl AlertLog {
    /// Create an empty log.
    #[must_use]
    pub fn new(cooldown: Duration, max_alerts: usize) -> Self {
        Self {
            cooldown,
            max_alerts: max_alerts.max(1),
            last_alert: HashMap::new(),
            alerts: VecDeque::new(),
        }
    }

    /// Record an action seen now. See [`AlertLog::record_at`].
    pub fn record(&mut self, source: &str, action: &Action, frame_idx: usize) -> Option<&Alert> {
        self.record_at(source, action, frame_idx, Instant::now())
    }

    /// Record an action seen at `now`.
    ///
    /// # Returns
    ///
    /// * The new alert, or `None` if the action is still cooling down or its
    ///   message repeats one of the last few alerts.
    pub fn record_at(
        &mut self,
        source: &str,
        action: &Action,
        frame_idx: usize,
        now: Instant,
    ) -> Option<&Alert> {
        let key = (source.to_string(), action.action_type);
        if let Some(&last) = self.last_alert.get(&key)
            && now.saturating_duration_since(last) <= self.cooldown
        {
            return None;
        }

        let message = format!("[{source}] {}", action.description);
        if self
            .alerts
            .iter()
            .rev()
            .take(RECENT_WINDOW)
            .any(|a| a.message == message)
        {
            return None;
        }

        self.alerts.push_back(Alert {
            source: source.to_string(),
            action_type: action.action_type,
            severity: action.severity,
            message,
            frame_idx,
        });
        while self.alerts.len() > self.max_alerts {
            self.alerts.pop_front();
        }
        self.last_alert.insert(key, now);
        self.alerts.back()
    }

    /// All stored alerts, oldest first.
    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    /// The `n` most recent alerts, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().rev().take(n)
    }

    /// Number of stored alerts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Whether no alert has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Forget all alerts and cooldowns.
    pub fn clear(&mut self) {
        self.alerts.clear();
        self.last_alert.clear();
    }
}
