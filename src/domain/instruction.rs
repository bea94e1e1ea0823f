/// Route instructions as they appear in the board descriptor.
///
/// Actions are single tokens (`F`, `L`, `R`, `T180`, `P`, `S`). Unknown
/// tokens are kept verbatim so the trace can still show them; they have
/// no effect on the pose.

use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Forward,
    Left,
    Right,
    Turn180,
    Pickup,
    Stop,
    Other(String),
}

impl Action {
    pub fn token(&self) -> &str {
        match self {
            Action::Forward => "F",
            Action::Left => "L",
            Action::Right => "R",
            Action::Turn180 => "T180",
            Action::Pickup => "P",
            Action::Stop => "S",
            Action::Other(t) => t,
        }
    }
}

impl From<&str> for Action {
    fn from(token: &str) -> Self {
        match token {
            "F" => Action::Forward,
            "L" => Action::Left,
            "R" => Action::Right,
            "T180" => Action::Turn180,
            "P" => Action::Pickup,
            "S" => Action::Stop,
            other => Action::Other(other.to_string()),
        }
    }
}

impl From<String> for Action {
    fn from(token: String) -> Self {
        Action::from(token.as_str())
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.token().to_string()
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Instruction {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
}

impl Instruction {
    #[cfg(test)]
    pub fn new(action: Action) -> Self {
        Instruction { action, row: None, col: None }
    }

    #[cfg(test)]
    pub fn forward_to(row: usize, col: usize) -> Self {
        Instruction { action: Action::Forward, row: Some(row), col: Some(col) }
    }

    /// Explicit target cell, only when both coordinates are present.
    pub fn target(&self) -> Option<(usize, usize)> {
        match (self.row, self.col) {
            (Some(r), Some(c)) => Some((r, c)),
            _ => None,
        }
    }
}

/// Human-readable name for an action token (as reported by the robot).
pub fn command_name(token: &str) -> String {
    match token {
        "F" => "Forward".to_string(),
        "L" => "Left Turn".to_string(),
        "R" => "Right Turn".to_string(),
        "T180" => "Turn 180°".to_string(),
        "P" => "Pick Up".to_string(),
        "S" => "Stop".to_string(),
        other => other.to_string(),
    }
}
