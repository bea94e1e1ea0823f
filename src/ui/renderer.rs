/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout (top to bottom): HUD, command line, playfield, status
/// message, log panel, key help.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::Theme;
use crate::domain::board::Cell as BoardCell;
use crate::domain::instruction::command_name;
use crate::domain::pose::{GRID_COLS, GRID_ROWS, MAX_X, MAX_Y};
use crate::sim::log::LogKind;
use crate::sim::session::{Session, PROGRESS_BLOCKS};

// ── Palette ──

#[derive(Clone, Copy)]
struct Palette {
    bg: Color,
    fg: Color,
    dim: Color,
    accent: Color,
    error: Color,
    robot: Color,
    green: Color,
    red: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                bg: Color::Rgb { r: 18, g: 18, b: 18 },
                fg: Color::Rgb { r: 230, g: 230, b: 230 },
                dim: Color::Rgb { r: 90, g: 90, b: 100 },
                accent: Color::Rgb { r: 120, g: 200, b: 255 },
                error: Color::Rgb { r: 240, g: 80, b: 80 },
                robot: Color::Rgb { r: 255, g: 210, b: 60 },
                green: Color::Rgb { r: 60, g: 220, b: 90 },
                red: Color::Rgb { r: 230, g: 60, b: 60 },
            },
            Theme::Light => Palette {
                bg: Color::Rgb { r: 243, g: 244, b: 246 },
                fg: Color::Rgb { r: 17, g: 24, b: 39 },
                dim: Color::Rgb { r: 160, g: 160, b: 170 },
                accent: Color::Rgb { r: 30, g: 90, b: 200 },
                error: Color::Rgb { r: 200, g: 30, b: 30 },
                robot: Color::Rgb { r: 40, g: 40, b: 40 },
                green: Color::Rgb { r: 20, g: 150, b: 50 },
                red: Color::Rgb { r: 200, g: 30, b: 30 },
            },
        }
    }
}

// ── Cell: the unit of the back-buffer ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '\0', fg: Color::Magenta, bg: Color::Magenta };

    fn blank(p: &Palette) -> Self {
        Cell { ch: ' ', fg: p.fg, bg: p.bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    blank: Cell,
}

impl FrameBuffer {
    fn new(w: usize, h: usize, blank: Cell) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![blank; w * h], blank }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![self.blank; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(self.blank);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            self.blank
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell { ch, fg, bg });
            cx += 1;
        }
    }
}

// ── Renderer ──

/// Terminal columns / rows per grid step.
const CELL_W: usize = 4;
const CELL_H: usize = 2;

const HUD_ROW: usize = 0;
const COMMAND_ROW: usize = 1;
const GRID_ROW: usize = 3;
const GRID_COL: usize = 2;

/// Snapshot of link state the renderer needs besides the session.
pub struct LinkView<'a> {
    pub connected: bool,
    pub peer: &'a str,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    palette: Palette,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    log_rows: usize,
}

impl Renderer {
    pub fn new(theme: Theme, log_rows: usize) -> Self {
        let palette = Palette::for_theme(theme);
        let blank = Cell::blank(&palette);
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            palette,
            front: FrameBuffer::new(0, 0, blank),
            back: FrameBuffer::new(0, 0, blank),
            term_w: 0,
            term_h: 0,
            log_rows,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(self.palette.bg),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, session: &Session, link: &LinkView) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(self.palette.bg), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose_hud(session, link);
        self.compose_command(session);
        let below_grid = self.compose_grid(session);
        self.compose_log(session, below_grid + 1);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = self.palette.fg;
        let mut last_bg = self.palette.bg;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer,
            SetForegroundColor(last_fg),
            SetBackgroundColor(last_bg),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, s: &Session, link: &LinkView) {
        let p = self.palette;
        let state = if s.running {
            "RUNNING"
        } else if s.clock_started || s.paused {
            "PAUSED"
        } else {
            "IDLE"
        };
        let hud = format!(
            " gridbot  {}/{}  Score:{:<6} {:<8}",
            s.clock_label(), s.duration_label(), s.score, state
        );
        self.front.put_str(0, HUD_ROW, &hud, p.fg, p.bg);

        let mut x = hud.chars().count();
        let (label, color) = if link.connected {
            (format!("● {}", link.peer), p.green)
        } else {
            ("○ offline".to_string(), p.error)
        };
        self.front.put_str(x, HUD_ROW, &label, color, p.bg);
        x += label.chars().count() + 2;

        if s.armed {
            self.front.put_str(x, HUD_ROW, "[ARMED]", p.error, p.bg);
            x += 8;
        }
        if s.manual_control {
            self.front.put_str(x, HUD_ROW, "[MANUAL]", p.accent, p.bg);
        }
    }

    fn compose_command(&mut self, s: &Session) {
        let p = self.palette;
        let command = if s.instructions_started && !s.current_command.is_empty() {
            command_name(&s.current_command)
        } else {
            "-".to_string()
        };
        let line = format!(" Command: {:<12} step {:<4}", command, s.cursor);
        self.front.put_str(0, COMMAND_ROW, &line, p.accent, p.bg);

        // Pick-up progress bar
        let mut x = line.chars().count() + 1;
        self.front.put_str(x, COMMAND_ROW, "picked ", p.fg, p.bg);
        x += 7;
        let filled = s.progress();
        for i in 0..PROGRESS_BLOCKS {
            let (ch, fg) = if i < filled { ('■', p.green) } else { ('□', p.dim) };
            self.front.set(x + i, COMMAND_ROW, Cell { ch, fg, bg: p.bg });
        }
    }

    /// Draws the line grid, items and robot. Returns the first row below it.
    fn compose_grid(&mut self, s: &Session) -> usize {
        let p = self.palette;

        for gy in 0..=GRID_ROWS {
            for gx in 0..=GRID_COLS {
                let (col, row) = screen_pos(gx, gy);
                self.front.set(col, row, Cell { ch: '┼', fg: p.dim, bg: p.bg });
                if gx < GRID_COLS {
                    for dx in 1..CELL_W {
                        self.front.set(col + dx, row, Cell { ch: '─', fg: p.dim, bg: p.bg });
                    }
                }
                if gy < GRID_ROWS {
                    for dy in 1..CELL_H {
                        self.front.set(col, row + dy, Cell { ch: '│', fg: p.dim, bg: p.bg });
                    }
                }
            }
        }

        if let Some(board) = &s.board {
            // Planned route underneath the items.
            for wp in &board.route {
                if wp.row < MAX_Y && wp.col < MAX_X {
                    let (col, row) = screen_pos(wp.col + 1, wp.row + 1);
                    let fg = if wp.pickup { p.accent } else { p.dim };
                    self.front.set(col, row, Cell { ch: '·', fg, bg: p.bg });
                }
            }

            let (rows, cols) = board.extent();
            for r in 0..rows.min(MAX_Y) {
                for c in 0..cols.min(MAX_X) {
                    if s.is_picked(r, c) {
                        continue;
                    }
                    let fg = match board.cell(r, c) {
                        BoardCell::Green => p.green,
                        BoardCell::Red => p.red,
                        BoardCell::Empty => continue,
                    };
                    let (col, row) = screen_pos(c + 1, r + 1);
                    self.front.set(col, row, Cell { ch: '●', fg, bg: p.bg });
                }
            }
        }

        let (col, row) = screen_pos(s.pose.x, s.pose.y);
        self.front.set(col, row, Cell { ch: s.pose.glyph(), fg: p.robot, bg: p.bg });

        let info = format!(
            "({},{}) {} {}°",
            s.pose.x, s.pose.y, s.pose.direction.label(), s.pose.rotation
        );
        let (_, bottom) = screen_pos(0, GRID_ROWS);
        self.front.put_str(GRID_COL, bottom + 1, &info, p.dim, p.bg);

        if !s.message.is_empty() {
            self.front.put_str(GRID_COL + info.chars().count() + 3, bottom + 1, &s.message, p.robot, p.bg);
        }

        bottom + 2
    }

    fn compose_log(&mut self, s: &Session, top: usize) {
        let p = self.palette;
        let width = self.front.width.saturating_sub(2);
        self.front.put_str(0, top, &"─".repeat(width + 2), p.dim, p.bg);
        self.front.put_str(2, top, &format!(" log ({}, {} errors) ", s.logs.len(), s.logs.errors().count()), p.dim, p.bg);

        for (i, entry) in s.logs.tail(self.log_rows).iter().enumerate() {
            let fg = match entry.kind {
                LogKind::Error => p.error,
                LogKind::Log => p.fg,
            };
            let line = format!("{:<5} {}", entry.kind.as_str(), entry.message);
            let text: String = line.chars().take(width).collect();
            self.front.put_str(1, top + 1 + i, &text, fg, p.bg);
        }

        let help_row = top + 2 + self.log_rows;
        if help_row < self.front.height {
            self.front.put_str(
                0,
                help_row,
                " [S]tart [F]inish [A]rm [Space]stop [M]anual [K]alib [R]eset  ←↑↓→ drive [P]ick  +/- score  [Q]uit",
                p.dim,
                p.bg,
            );
        }
    }
}

/// Grid intersection → terminal (col, row).
fn screen_pos(gx: usize, gy: usize) -> (usize, usize) {
    (GRID_COL + gx * CELL_W, GRID_ROW + gy * CELL_H)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_lines_are_evenly_spaced() {
        assert_eq!(screen_pos(0, 0), (GRID_COL, GRID_ROW));
        assert_eq!(screen_pos(1, 1), (GRID_COL + CELL_W, GRID_ROW + CELL_H));
        let (right, bottom) = screen_pos(GRID_COLS, GRID_ROWS);
        assert_eq!(right, GRID_COL + 28);
        assert_eq!(bottom, GRID_ROW + 10);
    }

    #[test]
    fn put_str_clips_at_the_edge() {
        let p = Palette::for_theme(Theme::Dark);
        let mut fb = FrameBuffer::new(4, 1, Cell::blank(&p));
        fb.put_str(2, 0, "abc", p.fg, p.bg);
        assert_eq!(fb.get(2, 0).ch, 'a');
        assert_eq!(fb.get(3, 0).ch, 'b');
        assert_eq!(fb.get(9, 9), Cell::blank(&p));
    }
}
