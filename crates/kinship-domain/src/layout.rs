//! Grid placement for the editor canvas

use crate::member::{Member, Position};
use serde::{Deserialize, Serialize};

/// Row-major grid used to place members when a tree is opened for editing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// Members per row (treated as 1 if zero)
    pub columns: usize,
    /// Horizontal distance between columns
    pub column_spacing: f64,
    /// Vertical distance between rows
    pub row_spacing: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 3,
            column_spacing: 300.0,
            row_spacing: 200.0,
        }
    }
}

impl GridLayout {
    /// Position of the member at `index`
    pub fn position(&self, index: usize) -> Position {
        let columns = self.columns.max(1);
        Position {
            x: (index % columns) as f64 * self.column_spacing,
            y: (index / columns) as f64 * self.row_spacing,
        }
    }

    /// Overwrite every member's position with its grid slot
    pub fn apply(&self, members: &mut [Member]) {
        for (index, member) in members.iter_mut().enumerate() {
            member.position = Some(self.position(index));
        }
    }
}
