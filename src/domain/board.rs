/// Board descriptor: item layout plus the planned instruction sequence.
///
/// Loaded once from `website.json` (written by the route planner) and
/// read-only afterwards.
///
/// ## Format
///   ```json
///   {
///     "dimensions": { "rows": 4, "cols": 6 },
///     "board": [["G", " ", "R", ...], ...],
///     "route": [{ "row": 0, "col": 0, "pickup": false }, ...],
///     "instructions": [{ "action": "F", "row": 0, "col": 1 }, { "action": "R" }, ...]
///   }
///   ```
///
/// ## Cell legend:
///   "G" = green item (collectable)    "R" = red item (obstacle)
///   anything else = empty

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::instruction::Instruction;
use crate::error::BoardError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Cell {
    #[default]
    Empty,
    Green,
    Red,
}

impl Cell {
    /// Is there an item drawn at this cell?
    pub fn has_item(self) -> bool {
        !matches!(self, Cell::Empty)
    }
}

impl From<String> for Cell {
    fn from(marker: String) -> Self {
        match marker.as_str() {
            "G" => Cell::Green,
            "R" => Cell::Red,
            _ => Cell::Empty,
        }
    }
}

impl From<Cell> for String {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Green => "G".into(),
            Cell::Red => "R".into(),
            Cell::Empty => " ".into(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Dimensions {
    pub rows: usize,
    pub cols: usize,
}

/// One waypoint of the planned route (informational only).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Waypoint {
    pub row: usize,
    pub col: usize,
    #[serde(default)]
    pub pickup: bool,
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct BoardDescriptor {
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub board: Vec<Vec<Cell>>,
    #[serde(default)]
    pub route: Vec<Waypoint>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

impl BoardDescriptor {
    pub fn from_json(text: &str) -> Result<Self, BoardError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, BoardError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Instruction at a peer-reported cursor. Negative or out-of-range
    /// indices simply miss.
    pub fn instruction(&self, index: i64) -> Option<&Instruction> {
        usize::try_from(index).ok().and_then(|i| self.instructions.get(i))
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.board
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(Cell::Empty)
    }

    /// Board size as `(rows, cols)`: declared dimensions, else the grid's
    /// own shape.
    pub fn extent(&self) -> (usize, usize) {
        match self.dimensions {
            Some(d) => (d.rows, d.cols),
            None => (
                self.board.len(),
                self.board.iter().map(Vec::len).max().unwrap_or(0),
            ),
        }
    }

    /// All item cells as `(row, col, cell)`, row-major.
    pub fn items(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.board.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| cell.has_item())
                .map(move |(c, cell)| (r, c, *cell))
        })
    }

    pub fn green_count(&self) -> usize {
        self.items().filter(|(_, _, c)| *c == Cell::Green).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instruction::Action;

    const SAMPLE: &str = r#"{
        "dimensions": { "rows": 2, "cols": 3 },
        "board": [["G", " ", "R"], [" ", "G", "?"]],
        "route": [{ "row": 0, "col": 0, "pickup": true }, { "row": 0, "col": 1, "pickup": false }],
        "instructions": [
            { "action": "F", "row": 0, "col": 0 },
            { "action": "P" },
            { "action": "R" },
            { "action": "S" }
        ]
    }"#;

    #[test]
    fn parses_full_descriptor() {
        let b = BoardDescriptor::from_json(SAMPLE).unwrap();
        assert_eq!(b.dimensions, Some(Dimensions { rows: 2, cols: 3 }));
        assert_eq!(b.cell(0, 0), Cell::Green);
        assert_eq!(b.cell(0, 2), Cell::Red);
        assert_eq!(b.cell(1, 2), Cell::Empty); // unknown marker
        assert_eq!(b.cell(9, 9), Cell::Empty); // out of range
        assert_eq!(b.route.len(), 2);
        assert!(b.route[0].pickup);
        assert_eq!(b.instructions[3].action, Action::Stop);
        assert_eq!(b.green_count(), 2);
        assert_eq!(b.items().count(), 3);
    }

    #[test]
    fn lookup_misses_out_of_range() {
        let b = BoardDescriptor::from_json(SAMPLE).unwrap();
        assert!(b.instruction(0).is_some());
        assert!(b.instruction(4).is_none());
        assert!(b.instruction(-1).is_none());
    }

    #[test]
    fn minimal_descriptor_defaults() {
        let b = BoardDescriptor::from_json("{}").unwrap();
        assert!(b.board.is_empty());
        assert!(b.instructions.is_empty());
        assert!(b.dimensions.is_none());
        assert_eq!(b.extent(), (0, 0));
    }

    #[test]
    fn extent_prefers_declared_dimensions() {
        let b = BoardDescriptor::from_json(SAMPLE).unwrap();
        assert_eq!(b.extent(), (2, 3));
        let ragged = BoardDescriptor::from_json(r#"{"board":[["G"],[" ","R"," "]]}"#).unwrap();
        assert_eq!(ragged.extent(), (2, 3));
    }

    #[test]
    fn rejects_bad_json() {
        assert!(matches!(BoardDescriptor::from_json("{"), Err(BoardError::Json(_))));
        let missing = Path::new("/definitely/not/here/website.json");
        assert!(matches!(BoardDescriptor::load(missing), Err(BoardError::Io(_))));
    }
}
