// ============================================================
// Layer 4 - Row Selection
// ============================================================
// Which rows of a hub split to fetch.
//
//   All                         → every row of the split
//   First(n)                    → rows [0, n)
//   Range { start, end }        → rows [start, end)
//   Stepped { start, end, step } → start, start+step, ... < end
//
// Bounds follow Python's range(): an end at or before the start
// selects nothing. A selection that reaches a row past the end of
// the split is an error, reported by window() once the split
// length is known.

use crate::error::ShapeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    First(usize),
    Range { start: usize, end: usize },
    Stepped { start: usize, end: usize, step: usize },
}

/// A resolved selection: a contiguous window plus a stride
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    pub offset: usize,
    pub length: usize,
    pub step:   usize,
}

impl RowWindow {
    /// Row indices inside the window, relative to `offset`
    pub fn relative_indices(&self) -> impl Iterator<Item = usize> {
        (0..self.length).step_by(self.step)
    }

    /// Number of rows the window yields
    pub fn count(&self) -> usize {
        self.relative_indices().count()
    }
}

impl Selection {
    /// Resolve against a split of `total` rows.
    ///
    /// Fails for a zero step, and when the last selected row is
    /// past the end of the split.
    pub fn window(self, total: usize) -> Result<RowWindow, ShapeError> {
        let (start, end, step) = match self {
            Self::All                          => (0, total, 1),
            Self::First(n)                     => (0, n, 1),
            Self::Range { start, end }         => (start, end, 1),
            Self::Stepped { start, end, step } => (start, end, step),
        };

        if step == 0 {
            return Err(ShapeError::InvalidSelection("step must not be zero".to_string()));
        }

        if end <= start {
            return Ok(RowWindow { offset: start.min(total), length: 0, step });
        }

        let last = start + (end - start - 1) / step * step;
        if last >= total {
            return Err(ShapeError::SelectionOutOfRange { index: last, total });
        }

        Ok(RowWindow {
            offset: start,
            length: last - start + 1,
            step,
        })
    }
}

impl From<usize> for Selection {
    fn from(n: usize) -> Self {
        Self::First(n)
    }
}

impl From<(usize, usize)> for Selection {
    fn from((start, end): (usize, usize)) -> Self {
        Self::Range { start, end }
    }
}

impl From<(usize, usize, usize)> for Selection {
    fn from((start, end, step): (usize, usize, usize)) -> Self {
        Self::Stepped { start, end, step }
    }
}
