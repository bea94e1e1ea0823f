/// Robot pose: display position, discrete heading and visual rotation.
///
/// Coordinates are 1-based intersections of the 7×5 line grid, so the
/// robot lives on `x ∈ 1..=6`, `y ∈ 1..=4`. Board cells are 0-based
/// `(row, col)` and map to `(x, y) = (col + 1, row + 1)`.
///
/// `direction` decides every move. `rotation` is only what the renderer
/// shows and is never used to decide where the robot goes.

/// Line grid dimensions (lines, not cells).
pub const GRID_COLS: usize = 7;
pub const GRID_ROWS: usize = 5;

pub const MIN_X: usize = 1;
pub const MAX_X: usize = GRID_COLS - 1;
pub const MIN_Y: usize = 1;
pub const MAX_Y: usize = GRID_ROWS - 1;

/// Clockwise order, index = quarter turns from `Up`.
const CLOCKWISE: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// Advance `steps` quarter turns clockwise.
    pub fn rotated(self, steps: usize) -> Direction {
        CLOCKWISE[(self.index() + steps) % 4]
    }

    pub fn clockwise(self) -> Direction {
        self.rotated(1)
    }

    pub fn counter_clockwise(self) -> Direction {
        self.rotated(3)
    }

    pub fn reverse(self) -> Direction {
        self.rotated(2)
    }

    /// Canonical screen angle: up 0, right 90, down 180, left 270.
    pub fn canonical_angle(self) -> i32 {
        self.index() as i32 * 90
    }

    /// One-cell step as (dx, dy); y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }
}

/// Relative moves from the manual-control surface.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ManualMove {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RobotPose {
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
    /// Accumulated degrees, signed, not normalized.
    pub rotation: i32,
}

impl RobotPose {
    /// Start of every run: top-left intersection, facing right.
    pub fn home() -> Self {
        RobotPose { x: 1, y: 1, direction: Direction::Right, rotation: 90 }
    }

    /// Board cell under the robot, 0-based `(row, col)`.
    pub fn cell(&self) -> (usize, usize) {
        (self.y.saturating_sub(1), self.x.saturating_sub(1))
    }

    /// Absolute jump to a board cell. Targets off the playfield are
    /// refused and leave the pose untouched.
    pub fn jump_to(&mut self, row: usize, col: usize) -> bool {
        let (Some(x), Some(y)) = (col.checked_add(1), row.checked_add(1)) else {
            return false;
        };
        if !(MIN_X..=MAX_X).contains(&x) || !(MIN_Y..=MAX_Y).contains(&y) {
            return false;
        }
        self.x = x;
        self.y = y;
        true
    }

    /// Route-instruction turn: fixed ±90/180 with sign-preserving `% 360`.
    pub fn turn_steps(&mut self, steps: usize) {
        let delta = match steps % 4 {
            1 => 90,
            2 => 180,
            3 => -90,
            _ => 0,
        };
        self.rotation = (self.rotation + delta) % 360;
        self.direction = self.direction.rotated(steps);
    }

    /// Shift one cell along `dir`. Returns false (and does nothing) if
    /// the destination falls outside the playfield.
    pub fn step(&mut self, dir: Direction) -> bool {
        let (dx, dy) = dir.delta();
        let nx = self.x as i32 + dx;
        let ny = self.y as i32 + dy;
        if nx < MIN_X as i32 || nx > MAX_X as i32 || ny < MIN_Y as i32 || ny > MAX_Y as i32 {
            return false;
        }
        self.x = nx as usize;
        self.y = ny as usize;
        true
    }

    /// Manual turn: new heading, rotation moved by the shortest signed
    /// delta toward the heading's canonical angle.
    pub fn face(&mut self, dir: Direction) {
        let current = self.rotation.rem_euclid(360);
        let mut diff = dir.canonical_angle() - current;
        if diff > 180 {
            diff -= 360;
        }
        if diff < -180 {
            diff += 360;
        }
        self.rotation += diff;
        self.direction = dir;
    }

    /// Apply a manual move. Returns whether anything changed.
    pub fn apply_manual(&mut self, mv: ManualMove) -> bool {
        match mv {
            ManualMove::Forward => self.step(self.direction),
            ManualMove::Backward => self.step(self.direction.reverse()),
            ManualMove::TurnLeft => {
                self.face(self.direction.counter_clockwise());
                true
            }
            ManualMove::TurnRight => {
                self.face(self.direction.clockwise());
                true
            }
        }
    }

    /// Glyph used by the renderer, one per heading.
    pub fn glyph(&self) -> char {
        match self.direction {
            Direction::Up => '▲',
            Direction::Right => '▶',
            Direction::Down => '▼',
            Direction::Left => '◀',
        }
    }
}

impl Default for RobotPose {
    fn default() -> Self {
        RobotPose::home()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_cycles() {
        assert_eq!(Direction::Up.clockwise(), Direction::Right);
        assert_eq!(Direction::Left.clockwise(), Direction::Up);
        // counter-clockwise: up → left → down → right → up
        assert_eq!(Direction::Up.counter_clockwise(), Direction::Left);
        assert_eq!(Direction::Left.counter_clockwise(), Direction::Down);
        assert_eq!(Direction::Down.counter_clockwise(), Direction::Right);
        assert_eq!(Direction::Right.counter_clockwise(), Direction::Up);
        assert_eq!(Direction::Right.reverse(), Direction::Left);
    }

    #[test]
    fn forward_right_then_clamped_at_edge() {
        let mut p = RobotPose { x: 3, y: 2, direction: Direction::Right, rotation: 90 };
        assert!(p.apply_manual(ManualMove::Forward));
        assert_eq!(p.x, 4);

        p.x = 6;
        assert!(!p.apply_manual(ManualMove::Forward));
        assert_eq!((p.x, p.y), (6, 2));
    }

    #[test]
    fn backward_moves_against_heading() {
        let mut p = RobotPose { x: 2, y: 2, direction: Direction::Up, rotation: 0 };
        assert!(p.apply_manual(ManualMove::Backward));
        assert_eq!((p.x, p.y), (2, 3));
        p.y = 4;
        assert!(!p.apply_manual(ManualMove::Backward));
        assert_eq!(p.y, 4);
    }

    #[test]
    fn manual_turns_take_shortest_delta() {
        // Facing left at 270; turning right lands on up (0) via +90, not -270.
        let mut p = RobotPose { x: 1, y: 1, direction: Direction::Left, rotation: 270 };
        p.apply_manual(ManualMove::TurnRight);
        assert_eq!(p.direction, Direction::Up);
        assert_eq!(p.rotation, 360);

        // Four left turns from home: heading back to right, one full turn
        // accumulated.
        let mut q = RobotPose::home();
        for _ in 0..4 {
            q.apply_manual(ManualMove::TurnLeft);
        }
        assert_eq!(q.direction, Direction::Right);
        assert_eq!(q.rotation, -270);
        assert_eq!(q.rotation.rem_euclid(360), 90);
    }

    #[test]
    fn manual_turn_from_negative_rotation() {
        // -90 ≡ 270 (left). Turning left faces down (180): delta -90.
        let mut p = RobotPose { x: 1, y: 1, direction: Direction::Left, rotation: -90 };
        p.apply_manual(ManualMove::TurnLeft);
        assert_eq!(p.direction, Direction::Down);
        assert_eq!(p.rotation, -180);
    }

    #[test]
    fn instruction_turns_keep_sign() {
        let mut p = RobotPose::home();
        p.turn_steps(3); // L
        assert_eq!(p.rotation, 0);
        assert_eq!(p.direction, Direction::Up);
        p.turn_steps(3);
        assert_eq!(p.rotation, -90);
        assert_eq!(p.direction, Direction::Left);
        p.turn_steps(2); // T180
        assert_eq!(p.rotation, 90);
        assert_eq!(p.direction, Direction::Right);
    }

    #[test]
    fn cell_is_zero_based() {
        let mut p = RobotPose::home();
        assert!(p.jump_to(2, 4));
        assert_eq!((p.x, p.y), (5, 3));
        assert_eq!(p.cell(), (2, 4));
    }

    #[test]
    fn jump_off_the_playfield_is_refused() {
        let mut p = RobotPose::home();
        assert!(p.jump_to(3, 5));
        assert_eq!((p.x, p.y), (6, 4));

        assert!(!p.jump_to(4, 0));
        assert!(!p.jump_to(0, 6));
        assert!(!p.jump_to(0, usize::MAX));
        assert!(!p.jump_to(usize::MAX, 0));
        assert_eq!((p.x, p.y), (6, 4));
    }
}
