// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Suspicious action labels produced by the pose classifier.
//!
//! An [`Action`] is produced fresh per frame and per person; there is no
//! identity continuity between frames.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kinds of suspicious action the classifier can flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Head dropped toward or below the torso.
    Falling,
    /// Both wrists raised (robbery or surrender posture).
    HandsUp,
    /// Exactly one wrist raised.
    HandRaised,
    /// Head close to knee height.
    Crouching,
    /// Arm raised and extended away from the body.
    AggressiveStance,
}

impl ActionType {
    /// All action types, in classifier priority order.
    pub const ALL: [Self; 5] = [
        Self::Falling,
        Self::HandsUp,
        Self::HandRaised,
        Self::Crouching,
        Self::AggressiveStance,
    ];

    /// Returns the snake_case identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Falling => "falling",
            Self::HandsUp => "hands_up",
            Self::HandRaised => "hand_raised",
            Self::Crouching => "crouching",
            Self::AggressiveStance => "aggressive_stance",
        }
    }

    /// Severity attached when this action is flagged.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Falling | Self::HandsUp | Self::AggressiveStance => Severity::High,
            Self::HandRaised | Self::Crouching => Severity::Medium,
        }
    }

    /// Description attached when this action is flagged.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Falling => "Fall detected or person lying down",
            Self::HandsUp => "Hands up detected (possible threat)",
            Self::HandRaised => "Suspicious hand movement detected",
            Self::Crouching => "Person crouching or hiding",
            Self::AggressiveStance => "Aggressive stance (arm extended/raised)",
        }
    }

    /// Human-readable, upper-cased name (e.g. "HANDS UP").
    #[must_use]
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "falling" | "fall" => Ok(Self::Falling),
            "hands_up" => Ok(Self::HandsUp),
            "hand_raised" => Ok(Self::HandRaised),
            "crouching" | "crouch" => Ok(Self::Crouching),
            "aggressive_stance" | "aggressive" => Ok(Self::AggressiveStance),
            _ => Err(ActionParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid action string.
#[derive(Debug, Clone)]
pub struct ActionParseError(String);

impl fmt::Display for ActionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid action '{}', expected one of: falling, hands_up, hand_raised, crouching, aggressive_stance",
            self.0
        )
    }
}

impl std::error::Error for ActionParseError {}

/// Qualitative urgency of an action, used for display styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Returns the snake_case identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A flagged action for one person in one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// What was detected.
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// How urgent it is.
    pub severity: Severity,
    /// Short human-readable description.
    pub description: String,
    /// Frame-local index of the person.
    pub person_id: usize,
}

impl Action {
    /// Create a new action.
    #[must_use]
    pub fn new(
        action_type: ActionType,
        severity: Severity,
        description: impl Into<String>,
        person_id: usize,
    ) -> Self {
        Self {
            action_type,
            severity,
            description: description.into(),
            person_id,
        }
    }

    /// Create an action with the type's standard severity and description.
    #[must_use]
    pub fn flagged(action_type: ActionType, person_id: usize) -> Self {
        Self::new(
            action_type,
            action_type.severity(),
            action_type.description(),
            person_id,
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) person {}: {}",
            self.action_type, self.severity, self.person_id, self.description
        )
    }
}
