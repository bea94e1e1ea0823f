/// Session: the complete state of one dashboard run.
///
/// Owned by the channel coordinator and passed by `&mut` to the
/// interpreter and the frame handler. Nothing here is global.
///
/// ## Mutation entry points
///   - inbound frames (score bonus, route cursor) via `channel::handle_frame`
///   - instruction replay and manual moves via `interpret`
///   - user actions (start, stop, arm, finish, score buttons) via the
///     methods below
///   - the once-per-second clock via `tick_clock`
///
/// The clock only touches counters and flags, never the pose.

use std::collections::BTreeSet;

use crate::domain::board::BoardDescriptor;
use crate::domain::pose::RobotPose;
use crate::sim::event::SessionEvent;
use crate::sim::log::{LogBook, LogSink};

pub const PICKUP_SCORE: i64 = 100;
pub const SCORE_STEP: i64 = 50;
pub const FINISH_BONUS: i64 = 200;
pub const FINISH_PER_SECOND: i64 = 3;
/// Length of the pick-up progress bar.
pub const PROGRESS_BLOCKS: usize = 6;

pub struct Session {
    // ── Score / clock ──
    pub score: i64,
    pub duration_secs: u32,
    pub time_left: u32,
    pub running: bool,
    pub clock_started: bool,
    pub paused: bool,

    // ── Control flags ──
    pub armed: bool,
    pub manual_control: bool,
    pub instructions_started: bool,

    // ── Robot ──
    pub pose: RobotPose,
    /// Collected board cells, 0-based `(row, col)`.
    pub picked: BTreeSet<(usize, usize)>,
    /// Last route index reported by the robot.
    pub cursor: i64,
    /// Cursor received before the clock started, not yet applied.
    pub deferred: Option<i64>,
    /// Action token from the last route frame (display only).
    pub current_command: String,

    // ── Board ──
    pub board: Option<BoardDescriptor>,

    // ── Trace ──
    pub logs: LogBook,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl Session {
    pub fn new(duration_secs: u32) -> Self {
        Session {
            score: 0,
            duration_secs,
            time_left: duration_secs,
            running: false,
            clock_started: false,
            paused: false,
            armed: false,
            manual_control: false,
            instructions_started: false,
            pose: RobotPose::home(),
            picked: BTreeSet::new(),
            cursor: 0,
            deferred: None,
            current_command: String::new(),
            board: None,
            logs: LogBook::new(),
            message: String::new(),
            message_timer: 0,
        }
    }

    pub fn with_board(mut self, board: BoardDescriptor) -> Self {
        self.board = Some(board);
        self
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count down the status message; call once per frame.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }

    pub fn is_picked(&self, row: usize, col: usize) -> bool {
        self.picked.contains(&(row, col))
    }

    /// Filled blocks of the pick-up progress bar.
    pub fn progress(&self) -> usize {
        self.picked.len().min(PROGRESS_BLOCKS)
    }

    // ── User actions (state side; the channel sends the matching command) ──

    /// Start or resume the run. Returns false if already running.
    pub fn start_game(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.clock_started = true;
        self.paused = false;
        self.instructions_started = true;
        true
    }

    /// Emergency stop. Ignored unless armed.
    pub fn emergency_stop(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        self.logs.log("Emergency Stop Activated!");
        self.running = false;
        true
    }

    pub fn toggle_armed(&mut self) {
        self.armed = !self.armed;
    }

    pub fn toggle_manual_control(&mut self) {
        self.manual_control = !self.manual_control;
    }

    /// Back to the start pose (after `resetroute`).
    pub fn reset_pose(&mut self) {
        self.pose = RobotPose::home();
    }

    /// Stop the clock early and bank the time bonus.
    /// Only while the clock is started and the run is live.
    pub fn finish_run(&mut self) -> bool {
        if !self.clock_started || !self.running {
            return false;
        }
        self.running = false;
        self.clock_started = false;
        self.paused = true;
        self.score += FINISH_BONUS + self.time_left as i64 * FINISH_PER_SECOND;
        true
    }

    pub fn adjust_score(&mut self, delta: i64) {
        self.score += delta;
    }

    /// One second of session clock.
    pub fn tick_clock(&mut self) -> Option<SessionEvent> {
        if !self.clock_started {
            return None;
        }
        if self.time_left > 0 {
            self.time_left -= 1;
        }
        if self.time_left == 0 {
            self.running = false;
            self.clock_started = false;
            return Some(SessionEvent::ClockExpired);
        }
        None
    }

    /// Clock as `m:ss`.
    pub fn clock_label(&self) -> String {
        format_clock(self.time_left)
    }

    /// Full run length as `m:ss`.
    pub fn duration_label(&self) -> String {
        format_clock(self.duration_secs)
    }
}

fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
