/// Keyboard input → dashboard actions.
///
/// Every dashboard control is one-shot (a button press), so only fresh
/// presses matter: Release and Repeat events are dropped. Events are
/// drained without blocking once per frame.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::link::command::Command;

/// What a key asks the dashboard to do.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UiAction {
    Quit,
    StartGame,
    FinishRun,
    EmergencyStop,
    ToggleArmed,
    ToggleManual,
    Calibrate,
    ResetRoute,
    Drive(Command),
    ScoreUp,
    ScoreDown,
}

pub struct InputState {
    /// Key presses collected during the most recent `drain_events()`.
    pressed: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { pressed: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.pressed.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind == KeyEventKind::Press {
                    self.pressed.push(key);
                }
            }
        }
    }

    /// Actions for this frame, in press order.
    pub fn actions(&self) -> Vec<UiAction> {
        self.pressed.iter().filter_map(|k| map_key(*k)).collect()
    }
}

/// Key bindings.
pub fn map_key(key: KeyEvent) -> Option<UiAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(UiAction::Quit);
    }
    let action = match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => UiAction::Quit,
        KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char('S') => UiAction::StartGame,
        KeyCode::Char('f') | KeyCode::Char('F') => UiAction::FinishRun,
        KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Char('X') => UiAction::EmergencyStop,
        KeyCode::Char('a') | KeyCode::Char('A') => UiAction::ToggleArmed,
        KeyCode::Char('m') | KeyCode::Char('M') => UiAction::ToggleManual,
        KeyCode::Char('k') | KeyCode::Char('K') => UiAction::Calibrate,
        KeyCode::Char('r') | KeyCode::Char('R') => UiAction::ResetRoute,
        KeyCode::Up => UiAction::Drive(Command::Forward),
        KeyCode::Down => UiAction::Drive(Command::Backward),
        KeyCode::Left => UiAction::Drive(Command::Left),
        KeyCode::Right => UiAction::Drive(Command::Right),
        KeyCode::Char('p') | KeyCode::Char('P') => UiAction::Drive(Command::Pickup),
        KeyCode::Char('+') | KeyCode::Char('=') => UiAction::ScoreUp,
        KeyCode::Char('-') | KeyCode::Char('_') => UiAction::ScoreDown,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_drive_the_robot() {
        assert_eq!(map_key(key(KeyCode::Up)), Some(UiAction::Drive(Command::Forward)));
        assert_eq!(map_key(key(KeyCode::Down)), Some(UiAction::Drive(Command::Backward)));
        assert_eq!(map_key(key(KeyCode::Left)), Some(UiAction::Drive(Command::Left)));
        assert_eq!(map_key(key(KeyCode::Right)), Some(UiAction::Drive(Command::Right)));
        assert_eq!(map_key(key(KeyCode::Char('p'))), Some(UiAction::Drive(Command::Pickup)));
    }

    #[test]
    fn ctrl_c_quits_and_unbound_keys_ignored() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c), Some(UiAction::Quit));
        assert_eq!(map_key(key(KeyCode::Char('c'))), None);
        assert_eq!(map_key(key(KeyCode::F(5))), None);
    }
}
