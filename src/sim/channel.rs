/// Channel coordinator: owns the session and the transport.
///
/// Inbound:  transport.poll → handle_frame → decode → session / interpreter
/// Outbound: user action → session flags → transport.send
///
/// Nothing here returns an error to the caller. Send failures, malformed
/// frames and lookup misses all end up as log entries (or silent events)
/// and the session keeps going.

use crate::domain::instruction::command_name;
use crate::domain::pose::ManualMove;
use crate::link::command::Command;
use crate::link::decoder::{decode, Inbound};
use crate::link::transport::Transport;
use crate::sim::event::SessionEvent;
use crate::sim::interpret;
use crate::sim::log::LogSink;
use crate::sim::session::{Session, SCORE_STEP};

pub struct Channel {
    pub session: Session,
    transport: Transport,
}

impl Channel {
    pub fn new(session: Session, transport: Transport) -> Self {
        Channel { session, transport }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn peer(&self) -> &str {
        self.transport.address()
    }

    /// Drain the link and process every frame in arrival order.
    pub fn pump(&mut self) -> Vec<SessionEvent> {
        let frames = self.transport.poll(&mut self.session.logs);
        let mut events = Vec::new();
        for frame in frames {
            events.extend(handle_frame(&mut self.session, &frame));
        }
        events
    }

    /// Fire-and-forget send. Returns whether the frame went out.
    pub fn dispatch(&mut self, command: Command) -> bool {
        self.transport.send(command.wire(), &mut self.session.logs).is_ok()
    }

    // ── User actions ──

    /// Start or resume. A route cursor that arrived while stopped is
    /// applied now.
    pub fn start_game(&mut self) -> Vec<SessionEvent> {
        if !self.session.start_game() {
            return vec![];
        }
        self.dispatch(Command::Start);
        interpret::replay_deferred(&mut self.session)
    }

    pub fn emergency_stop(&mut self) {
        if self.session.armed {
            self.dispatch(Command::Stop);
            self.session.emergency_stop();
        }
    }

    pub fn toggle_armed(&mut self) {
        self.session.toggle_armed();
    }

    pub fn toggle_manual_control(&mut self) {
        self.dispatch(Command::ManualControl);
        self.session.toggle_manual_control();
    }

    pub fn calibrate(&mut self) {
        self.dispatch(Command::Calibrate);
    }

    pub fn reset_route(&mut self) {
        self.dispatch(Command::ResetRoute);
        self.session.reset_pose();
    }

    /// Manual-control pad. Movement commands also move the local pose.
    pub fn drive(&mut self, command: Command) -> Vec<SessionEvent> {
        if !command.is_drive() {
            return vec![];
        }
        self.dispatch(command);
        let local = match command {
            Command::Forward => ManualMove::Forward,
            Command::Backward => ManualMove::Backward,
            Command::Left => ManualMove::TurnLeft,
            Command::Right => ManualMove::TurnRight,
            _ => return vec![],
        };
        interpret::apply_manual(&mut self.session, local)
    }

    pub fn finish_run(&mut self) {
        self.session.finish_run();
    }

    pub fn bump_score(&mut self, up: bool) {
        self.session.adjust_score(if up { SCORE_STEP } else { -SCORE_STEP });
    }

    pub fn shutdown(&mut self) {
        self.transport.close(&mut self.session.logs);
    }
}

/// Classify one inbound frame and apply it.
pub fn handle_frame(session: &mut Session, text: &str) -> Vec<SessionEvent> {
    match decode(text) {
        Inbound::ScoreBonus { amount } => {
            session.logs.log(format!("Updating score +{amount}"));
            session.score += amount;
            vec![SessionEvent::BonusScored { amount }]
        }
        Inbound::RouteStep { index, action } => {
            session.logs.log(format!(
                "Executing command: {} (index: {index})",
                command_name(&action)
            ));
            session.current_command = action;
            interpret::advance_cursor(session, index)
        }
        Inbound::Malformed(err) => {
            session.logs.error(err.to_string());
            vec![]
        }
        Inbound::Opaque { text } => {
            session.logs.log(text);
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::BoardDescriptor;
    use crate::domain::instruction::{Action, Instruction};
    use crate::domain::pose::{Direction, RobotPose};
    use crate::sim::log::LogKind;

    fn live_session(instructions: Vec<Instruction>) -> Session {
        let board = BoardDescriptor { instructions, ..BoardDescriptor::default() };
        let mut s = Session::new(300).with_board(board);
        s.start_game();
        s
    }

    fn offline(session: Session) -> Channel {
        Channel::new(session, Transport::disconnected("ws://192.168.4.1/connect-websocket"))
    }

    #[test]
    fn bonus_frame_adds_fixed_amount() {
        let mut s = Session::new(300);
        s.cursor = 4;
        let events = handle_frame(&mut s, "green tower");
        assert_eq!(events, vec![SessionEvent::BonusScored { amount: 50 }]);
        assert_eq!(s.score, 50);
        assert_eq!(s.cursor, 4);
        handle_frame(&mut s, "green tower");
        assert_eq!(s.score, 100);
    }

    #[test]
    fn bad_index_leaves_cursor_and_pose() {
        let mut s = live_session(vec![Instruction::new(Action::Right)]);
        s.cursor = 2;
        let pose = s.pose;
        assert!(handle_frame(&mut s, "route_index:abc:F").is_empty());
        assert_eq!(s.cursor, 2);
        assert_eq!(s.pose, pose);
        let last = s.logs.last().unwrap();
        assert_eq!(last.kind, LogKind::Error);
        assert_eq!(last.message, "Invalid route index: abc");
    }

    #[test]
    fn missing_action_logs_error() {
        let mut s = live_session(vec![]);
        assert!(handle_frame(&mut s, "route_index:2").is_empty());
        assert_eq!(s.logs.last().unwrap().kind, LogKind::Error);
        assert_eq!(s.cursor, 0);
    }

    #[test]
    fn opaque_text_logged_verbatim() {
        let mut s = Session::new(300);
        handle_frame(&mut s, "calibration done");
        let last = s.logs.last().unwrap();
        assert_eq!(last.kind, LogKind::Log);
        assert_eq!(last.message, "calibration done");
        assert_eq!(s.score, 0);
    }

    #[test]
    fn frame_action_and_sequence_action_may_disagree() {
        // Robot says "L", the sequence says R: the sequence drives the pose.
        let mut s = live_session(vec![Instruction::new(Action::Right)]);
        handle_frame(&mut s, "route_index:0:L");
        assert_eq!(s.current_command, "L");
        assert_eq!(s.pose.direction, Direction::Down);
        assert_eq!(s.pose.rotation, 180);
        assert_eq!(
            s.logs.last().unwrap().message,
            "Executing command: Left Turn (index: 0)"
        );
    }

    #[test]
    fn route_frames_replay_in_order() {
        let mut s = live_session(vec![
            Instruction::forward_to(0, 1),
            Instruction::new(Action::Right),
            Instruction::forward_to(1, 1),
            Instruction::new(Action::Pickup),
        ]);
        for frame in ["route_index:0:F", "route_index:1:R", "route_index:2:F", "route_index:3:P"] {
            handle_frame(&mut s, frame);
        }
        assert_eq!((s.pose.x, s.pose.y), (2, 2));
        assert_eq!(s.pose.direction, Direction::Down);
        assert!(s.is_picked(1, 1));
        assert_eq!(s.score, 100);
        assert_eq!(s.cursor, 3);
    }

    #[test]
    fn route_frame_before_start_lands_on_start() {
        let board = BoardDescriptor {
            instructions: vec![Instruction::new(Action::Right)],
            ..BoardDescriptor::default()
        };
        let mut ch = offline(Session::new(300).with_board(board));
        handle_frame(&mut ch.session, "route_index:0:R");
        assert_eq!(ch.session.pose, RobotPose::home());

        let events = ch.start_game();
        assert_eq!(events, vec![SessionEvent::Turned { direction: Direction::Down, rotation: 180 }]);
        assert_eq!(ch.session.pose.direction, Direction::Down);
        assert!(ch.start_game().is_empty()); // already running
    }

    #[test]
    fn commands_while_offline_only_log() {
        let mut ch = offline(Session::new(300));
        assert!(!ch.is_connected());
        assert!(!ch.dispatch(Command::Start));
        ch.calibrate();
        assert_eq!(ch.session.logs.errors().count(), 2);
        assert!(ch
            .session
            .logs
            .entries()
            .iter()
            .all(|e| e.message == "WebSocket not connected"));
        assert!(ch.pump().is_empty());
    }

    #[test]
    fn offline_actions_still_update_local_state() {
        let mut ch = offline(Session::new(300));
        ch.start_game();
        assert!(ch.session.running);

        ch.emergency_stop(); // not armed: ignored
        assert!(ch.session.running);
        ch.toggle_armed();
        ch.emergency_stop();
        assert!(!ch.session.running);

        ch.session.pose = RobotPose { x: 4, y: 3, direction: Direction::Up, rotation: 0 };
        ch.reset_route();
        assert_eq!(ch.session.pose, RobotPose::home());

        ch.bump_score(true);
        ch.bump_score(true);
        ch.bump_score(false);
        assert_eq!(ch.session.score, 50);

        ch.toggle_manual_control();
        assert!(ch.session.manual_control);
    }

    #[test]
    fn drive_moves_local_pose() {
        let mut ch = offline(Session::new(300));
        assert_eq!(ch.drive(Command::Forward), vec![SessionEvent::Moved { x: 2, y: 1 }]);
        ch.drive(Command::Left);
        assert_eq!(ch.session.pose.direction, Direction::Up);
        assert_eq!(ch.drive(Command::Forward), vec![SessionEvent::Blocked]);
        assert!(ch.drive(Command::Pickup).is_empty());
        assert!(ch.drive(Command::Start).is_empty());
    }
}
