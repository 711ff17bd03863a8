//! Row selection for bulk actions. The selection only ever covers rows of the
//! loaded page, and finalized rows are never selectable.

use std::collections::HashSet;

use super::GridError;
use crate::store::TranslationRow;

pub fn is_selectable(row: &TranslationRow) -> bool {
    !row.is_translated
}

#[derive(Debug, Default, Clone)]
pub struct Selection {
    ids: HashSet<i32>,
}

impl Selection {
    pub fn contains(&self, id: i32) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Flip the selection of one row. Returns whether the row is now selected.
    pub fn toggle(&mut self, row: &TranslationRow) -> bool {
        if !self.ids.remove(&row.id) && is_selectable(row) {
            self.ids.insert(row.id);
            return true;
        }
        false
    }

    /// Replace the selection with every selectable row of `rows`
    pub fn select_all_eligible(&mut self, rows: &[TranslationRow]) {
        self.ids = rows
            .iter()
            .filter(|row| is_selectable(row))
            .map(|row| row.id)
            .collect();
    }

    /// Add the selectable rows lying between `start` and `end` in display
    /// order. Both ids must be among `rows`; they may be given in either order.
    pub fn select_range(
        &mut self,
        rows: &[TranslationRow],
        start: i32,
        end: i32,
    ) -> Result<usize, GridError> {
        let position = |id: i32| rows.iter().position(|row| row.id == id);
        let (Some(a), Some(b)) = (position(start), position(end)) else {
            return Err(GridError::RangeNotVisible { start, end });
        };

        let before = self.ids.len();
        self.ids.extend(
            rows[a.min(b)..=a.max(b)]
                .iter()
                .filter(|row| is_selectable(row))
                .map(|row| row.id),
        );
        Ok(self.ids.len() - before)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only ids of selectable rows present in `rows`
    pub fn prune(&mut self, rows: &[TranslationRow]) {
        self.ids
            .retain(|id| rows.iter().any(|row| row.id == *id && is_selectable(row)));
    }

    /// Selected rows among `rows`, in display order
    pub fn in_display_order<'a>(&self, rows: &'a [TranslationRow]) -> Vec<&'a TranslationRow> {
        rows.iter().filter(|row| self.contains(row.id)).collect()
    }
}
