/// Events emitted while the session state changes.
/// The presentation layer consumes these for status messages.

use crate::domain::pose::Direction;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    BonusScored { amount: i64 },
    Moved { x: usize, y: usize },
    Turned { direction: Direction, rotation: i32 },
    ItemPicked { row: usize, col: usize, first_time: bool },
    Stopped,
    /// Cursor points past the instruction sequence (or the board is missing).
    LookupMiss { index: i64 },
    /// Cursor recorded while the clock has not started; nothing applied.
    Deferred { index: i64 },
    Blocked,
    ClockExpired,
}
