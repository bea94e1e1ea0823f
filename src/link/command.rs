/// Outbound command vocabulary. Sent verbatim as text frames, no payload.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Start,
    Stop,
    ManualControl,
    Calibrate,
    ResetRoute,
    Forward,
    Backward,
    Left,
    Right,
    Pickup,
}

impl Command {
    pub fn wire(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::ManualControl => "manualcontrol",
            Command::Calibrate => "kalibratie",
            Command::ResetRoute => "resetroute",
            Command::Forward => "forward",
            Command::Backward => "backward",
            Command::Left => "left",
            Command::Right => "right",
            Command::Pickup => "pickup",
        }
    }

    /// Drive commands are the ones the manual-control pad issues.
    pub fn is_drive(self) -> bool {
        matches!(
            self,
            Command::Forward | Command::Backward | Command::Left | Command::Right | Command::Pickup
        )
    }
}
