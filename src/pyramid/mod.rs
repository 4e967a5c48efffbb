//! Pyramid state: row count, slot labels and the reposition algorithm.
//!
//! Positions are 1-based everywhere in the public API and map to the
//! 0-based `slots` index `position - 1`. All transitions are synchronous
//! and all-or-nothing; persisting the result is the caller's job.

use std::ops::RangeInclusive;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Hard cap on rows (55 slots)
pub const MAX_ROWS: usize = 10;
/// Hard floor on rows
pub const MIN_ROWS: usize = 1;
/// Rows used when nothing has been saved yet
pub const DEFAULT_ROWS: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PyramidError {
    #[error("position {position} is outside 1..={total}")]
    OutOfRange { position: usize, total: usize },
}

/// Number of slots in a pyramid with `row_count` rows
pub fn total_positions(row_count: usize) -> usize {
    row_count * (row_count + 1) / 2
}

/// Label used for any slot without a name
pub fn fallback_label(position: usize) -> String {
    format!("Player {}", position)
}

/// Fill every missing or empty slot up to the triangular total with its
/// fallback label. Existing labels are never touched and extra trailing
/// slots are left alone. Returns true if anything changed.
pub fn ensure_defaults(row_count: usize, slots: &mut Vec<String>) -> bool {
    let total = total_positions(row_count);
    let mut changed = false;

    if slots.len() < total {
        slots.resize(total, String::new());
    }

    for (i, slot) in slots.iter_mut().take(total).enumerate() {
        if slot.is_empty() {
            *slot = fallback_label(i + 1);
            changed = true;
        }
    }

    changed
}

/// The ranked pyramid: `slots.len() == total_positions(row_count)` after
/// every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidState {
    #[serde(rename = "rowCount", alias = "rows")]
    pub row_count: usize,
    #[serde(default, alias = "players", deserialize_with = "slots_or_blank")]
    pub slots: Vec<String>,
}

/// Stored slots may hold `null` for an unnamed player; read those as blank
/// so `normalize` fills them in.
fn slots_or_blank<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let slots = Vec::<Option<String>>::deserialize(deserializer)?;
    Ok(slots.into_iter().map(Option::unwrap_or_default).collect())
}

impl Default for PyramidState {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS)
    }
}

impl PyramidState {
    /// Fresh pyramid with every slot holding its fallback label
    pub fn new(row_count: usize) -> Self {
        let mut state = Self {
            row_count: row_count.clamp(MIN_ROWS, MAX_ROWS),
            slots: Vec::new(),
        };
        ensure_defaults(state.row_count, &mut state.slots);
        state
    }

    /// Repair a record loaded from storage: clamp the row count, pad empty
    /// slots and drop anything beyond the triangle. Returns true if the
    /// record had to change.
    pub fn normalize(&mut self) -> bool {
        let clamped = self.row_count.clamp(MIN_ROWS, MAX_ROWS);
        let mut changed = clamped != self.row_count;
        self.row_count = clamped;

        changed |= ensure_defaults(self.row_count, &mut self.slots);

        let total = self.total();
        if self.slots.len() > total {
            self.slots.truncate(total);
            changed = true;
        }
        changed
    }

    pub fn total(&self) -> usize {
        total_positions(self.row_count)
    }

    /// Label at a 1-based position
    pub fn label(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .map(String::as_str)
    }

    fn check(&self, position: usize) -> Result<usize, PyramidError> {
        let total = self.total();
        if position == 0 || position > total {
            return Err(PyramidError::OutOfRange { position, total });
        }
        Ok(position - 1)
    }

    /// Add a row at the bottom. Silently ignored at the cap; returns
    /// whether a row was added.
    pub fn add_row(&mut self) -> bool {
        if self.row_count >= MAX_ROWS {
            return false;
        }
        self.row_count += 1;
        ensure_defaults(self.row_count, &mut self.slots);
        true
    }

    /// Remove the bottom row, discarding its labels. Silently ignored at
    /// the floor; returns whether a row was removed.
    pub fn remove_row(&mut self) -> bool {
        if self.row_count <= MIN_ROWS {
            return false;
        }
        self.row_count -= 1;
        let total = self.total();
        self.slots.truncate(total);
        true
    }

    /// Replace one label. Blank input falls back to `Player {position}`.
    pub fn rename_slot(&mut self, position: usize, label: &str) -> Result<(), PyramidError> {
        let index = self.check(position)?;
        let label = label.trim();
        self.slots[index] = if label.is_empty() {
            fallback_label(position)
        } else {
            label.to_string()
        };
        Ok(())
    }

    /// Move the label at `from` to `to`, shifting every label in between
    /// one step toward `from`. This is a splice, not a swap.
    ///
    /// Returns the range of positions whose labels changed, or `None` when
    /// `from == to`. Out-of-range positions leave the state untouched.
    pub fn reposition(
        &mut self,
        from: usize,
        to: usize,
    ) -> Result<Option<RangeInclusive<usize>>, PyramidError> {
        let from_index = self.check(from)?;
        let to_index = self.check(to)?;

        if from == to {
            return Ok(None);
        }

        let moving = self.slots.remove(from_index);
        self.slots.insert(to_index, moving);

        Ok(Some(from.min(to)..=from.max(to)))
    }

    /// Positions of each row, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = RangeInclusive<usize>> {
        (1..=self.row_count).map(|row| {
            let first = total_positions(row - 1) + 1;
            first..=first + row - 1
        })
    }
}

/// 1-based row containing `position`
pub fn row_of(position: usize) -> usize {
    let mut row = 1;
    while total_positions(row) < position {
        row += 1;
    }
    row
}

/// Position at 1-based `row` and 0-based `column`, if the column exists
pub fn position_at(row: usize, column: usize) -> Option<usize> {
    if row == 0 || column >= row {
        return None;
    }
    Some(total_positions(row - 1) + column + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn six() -> PyramidState {
        PyramidState {
            row_count: 3,
            slots: labels(&["A", "B", "C", "D", "E", "F"]),
        }
    }

    #[test]
    fn test_total_positions_is_triangular() {
        for rows in MIN_ROWS..=MAX_ROWS {
            assert_eq!(total_positions(rows), rows * (rows + 1) / 2);
        }
        assert_eq!(total_positions(10), 55);
    }

    #[test]
    fn test_default_state() {
        let state = PyramidState::default();
        assert_eq!(state.row_count, 4);
        assert_eq!(state.slots.len(), 10);
        assert_eq!(state.label(1), Some("Player 1"));
        assert_eq!(state.label(10), Some("Player 10"));
        assert_eq!(state.label(11), None);
        assert_eq!(state.label(0), None);
    }

    #[test]
    fn test_ensure_defaults_keeps_existing_labels() {
        let mut slots = labels(&["Ana", "", "Marko"]);
        let changed = ensure_defaults(3, &mut slots);

        assert!(changed);
        assert_eq!(
            slots,
            labels(&["Ana", "Player 2", "Marko", "Player 4", "Player 5", "Player 6"])
        );

        // Nothing left to fill
        assert!(!ensure_defaults(3, &mut slots));
    }

    #[test]
    fn test_add_row_stops_at_cap() {
        let mut state = PyramidState::new(1);
        for _ in 0..9 {
            assert!(state.add_row());
        }
        assert_eq!(state.row_count, 10);
        assert_eq!(state.total(), 55);
        assert_eq!(state.slots.len(), 55);

        assert!(!state.add_row());
        assert_eq!(state.row_count, 10);
        assert_eq!(state.slots.len(), 55);
    }

    #[test]
    fn test_remove_row_stops_at_floor() {
        let mut state = PyramidState::new(2);
        assert!(state.remove_row());
        assert_eq!(state.slots, labels(&["Player 1"]));
        assert!(!state.remove_row());
        assert_eq!(state.row_count, 1);
    }

    #[test]
    fn test_add_then_remove_restores_labels() {
        let original = six();
        let mut state = original.clone();
        state.add_row();
        assert_eq!(state.label(7), Some("Player 7"));
        state.remove_row();
        assert_eq!(state, original);
    }

    #[test]
    fn test_remove_then_add_loses_bottom_row() {
        let mut state = six();
        state.remove_row();
        state.add_row();
        assert_eq!(state.slots, labels(&["A", "B", "C", "Player 4", "Player 5", "Player 6"]));
    }

    #[test]
    fn test_rename_slot() {
        let mut state = six();
        state.rename_slot(2, "  Ivana ").unwrap();
        assert_eq!(state.slots, labels(&["A", "Ivana", "C", "D", "E", "F"]));

        state.rename_slot(5, "   ").unwrap();
        assert_eq!(state.label(5), Some("Player 5"));

        assert_eq!(
            state.rename_slot(7, "X"),
            Err(PyramidError::OutOfRange { position: 7, total: 6 })
        );
    }

    #[test]
    fn test_reposition_down_shifts_up() {
        let mut state = six();
        let changed = state.reposition(1, 4).unwrap();
        assert_eq!(state.slots, labels(&["B", "C", "D", "A", "E", "F"]));
        assert_eq!(changed, Some(1..=4));
    }

    #[test]
    fn test_reposition_up_shifts_down() {
        let mut state = six();
        let changed = state.reposition(6, 2).unwrap();
        assert_eq!(state.slots, labels(&["A", "F", "B", "C", "D", "E"]));
        assert_eq!(changed, Some(2..=6));
    }

    #[test]
    fn test_reposition_same_position_is_noop() {
        for p in 1..=6 {
            let mut state = six();
            let changed = state.reposition(p, p).unwrap();
            assert_eq!(changed, None);
            assert_eq!(state, six());
        }
    }

    #[test]
    fn test_reposition_inverse_restores() {
        for a in 1..=6 {
            for b in 1..=6 {
                if a == b {
                    continue;
                }
                let mut state = six();
                state.reposition(a, b).unwrap();
                state.reposition(b, a).unwrap();
                assert_eq!(state, six(), "move {} -> {} and back", a, b);
            }
        }
    }

    #[test]
    fn test_reposition_leaves_outside_range_untouched() {
        let before = PyramidState::new(5);
        let mut state = before.clone();
        state.reposition(4, 9).unwrap();

        for p in (1..4).chain(10..=15) {
            assert_eq!(state.label(p), before.label(p));
        }
        assert_eq!(state.label(9), before.label(4));
        for p in 4..9 {
            assert_eq!(state.label(p), before.label(p + 1));
        }
    }

    #[test]
    fn test_reposition_out_of_range_fails_fast() {
        let mut state = six();
        assert_eq!(
            state.reposition(0, 3),
            Err(PyramidError::OutOfRange { position: 0, total: 6 })
        );
        assert_eq!(
            state.reposition(2, 7),
            Err(PyramidError::OutOfRange { position: 7, total: 6 })
        );
        assert_eq!(state, six());
    }

    #[test]
    fn test_normalize_repairs_loaded_record() {
        let mut state = PyramidState {
            row_count: 12,
            slots: labels(&["A"]),
        };
        assert!(state.normalize());
        assert_eq!(state.row_count, 10);
        assert_eq!(state.slots.len(), 55);
        assert_eq!(state.label(1), Some("A"));

        let mut state = PyramidState {
            row_count: 2,
            slots: labels(&["A", "B", "C", "D"]),
        };
        assert!(state.normalize());
        assert_eq!(state.slots, labels(&["A", "B", "C"]));

        let mut state = six();
        assert!(!state.normalize());
    }

    #[test]
    fn test_row_layout() {
        let state = six();
        let rows: Vec<_> = state.rows().collect();
        assert_eq!(rows, vec![1..=1, 2..=3, 4..=6]);

        assert_eq!(row_of(1), 1);
        assert_eq!(row_of(3), 2);
        assert_eq!(row_of(4), 3);
        assert_eq!(row_of(55), 10);

        assert_eq!(position_at(3, 0), Some(4));
        assert_eq!(position_at(3, 2), Some(6));
        assert_eq!(position_at(3, 3), None);
        assert_eq!(position_at(0, 0), None);
    }
}
