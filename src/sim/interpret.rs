/// Instruction interpreter: replays route instructions onto the pose.
///
/// Two entry points mutate the same `RobotPose`:
///   1. `advance_cursor` : driven by `RouteStep` frames. Looks up the
///      board's instruction at the reported index and applies it.
///   2. `apply_manual` : relative moves from the manual-control pad.
///
/// Each call runs to completion before the next event is handled, so
/// neither path ever sees a half-updated pose.
///
/// ## Instruction table
/// ┌────────┬────────────────────────────────────────────────────────┐
/// │ F      │ jump to (col+1, row+1) if present and on the playfield │
/// │ L      │ rotation -= 90 (% 360), heading one step ccw           │
/// │ R      │ rotation += 90 (% 360), heading one step cw            │
/// │ T180   │ rotation += 180 (% 360), heading two steps             │
/// │ P      │ picked += (y-1, x-1), score += 100 (every time)        │
/// │ S, ... │ nothing                                                 │
/// └────────┴────────────────────────────────────────────────────────┘
///
/// The action token inside the route frame is not consulted here: the
/// effect always comes from the board's sequence.

use crate::domain::instruction::{Action, Instruction};
use crate::domain::pose::ManualMove;
use crate::sim::event::SessionEvent;
use crate::sim::session::{Session, PICKUP_SCORE};

// ══════════════════════════════════════════════════════════════
// Route replay
// ══════════════════════════════════════════════════════════════

/// Record a new cursor and apply the instruction it points at.
///
/// Nothing is applied before the session clock has started; the cursor
/// is recorded and held until `replay_deferred` runs it.
pub fn advance_cursor(session: &mut Session, index: i64) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    session.cursor = index;

    if !session.clock_started {
        session.deferred = Some(index);
        events.push(SessionEvent::Deferred { index });
        return events;
    }
    session.deferred = None;

    let instruction = session
        .board
        .as_ref()
        .and_then(|b| b.instruction(index))
        .cloned();

    match instruction {
        Some(instruction) => apply_instruction(session, &instruction, &mut events),
        None => events.push(SessionEvent::LookupMiss { index }),
    }
    events
}

/// Apply the cursor held back while the clock was stopped, if any.
pub fn replay_deferred(session: &mut Session) -> Vec<SessionEvent> {
    match session.deferred.take() {
        Some(index) if session.clock_started => advance_cursor(session, index),
        Some(index) => {
            session.deferred = Some(index);
            Vec::new()
        }
        None => Vec::new(),
    }
}

pub fn apply_instruction(session: &mut Session, instruction: &Instruction, events: &mut Vec<SessionEvent>) {
    let pose = &mut session.pose;
    match instruction.action {
        Action::Forward => {
            if let Some((row, col)) = instruction.target() {
                if pose.jump_to(row, col) {
                    events.push(SessionEvent::Moved { x: pose.x, y: pose.y });
                } else {
                    events.push(SessionEvent::Blocked);
                }
            }
        }
        Action::Left => {
            pose.turn_steps(3);
            events.push(SessionEvent::Turned { direction: pose.direction, rotation: pose.rotation });
        }
        Action::Right => {
            pose.turn_steps(1);
            events.push(SessionEvent::Turned { direction: pose.direction, rotation: pose.rotation });
        }
        Action::Turn180 => {
            pose.turn_steps(2);
            events.push(SessionEvent::Turned { direction: pose.direction, rotation: pose.rotation });
        }
        Action::Pickup => {
            let (row, col) = pose.cell();
            let first_time = session.picked.insert((row, col));
            session.score += PICKUP_SCORE;
            events.push(SessionEvent::ItemPicked { row, col, first_time });
        }
        Action::Stop => events.push(SessionEvent::Stopped),
        Action::Other(_) => {}
    }
}

// ══════════════════════════════════════════════════════════════
// Manual control
// ══════════════════════════════════════════════════════════════

/// Apply a relative move. Independent of the cursor and the board.
pub fn apply_manual(session: &mut Session, mv: ManualMove) -> Vec<SessionEvent> {
    let pose = &mut session.pose;
    if !pose.apply_manual(mv) {
        return vec![SessionEvent::Blocked];
    }
    match mv {
        ManualMove::Forward | ManualMove::Backward => {
            vec![SessionEvent::Moved { x: pose.x, y: pose.y }]
        }
        ManualMove::TurnLeft | ManualMove::TurnRight => {
            vec![SessionEvent::Turned { direction: pose.direction, rotation: pose.rotation }]
        }
    }
}
