use itertools::Itertools;
use thiserror::Error;

use crate::config::{CATEGORIES, CategoryId, TRAINER_API};
use crate::domain::Candle;

#[cfg(debug_assertions)]
use crate::config::DF;

/// A candle the user tagged with a role. `role_index` is 1-based within its role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedCandle {
    pub candle: Candle,
    pub role_id: CategoryId,
    pub role_index: usize,
}

impl SelectedCandle {
    pub fn time(&self) -> i64 {
        self.candle.time
    }

    /// e.g. "Prior move (2/3)" or "Engulf candle".
    pub fn describe_role(&self) -> String {
        let category = self.role_id.category();
        match category.max {
            Some(max) if max > 1 => format!("{} ({}/{})", category.label, self.role_index, max),
            _ => category.label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("You already selected {max} for \"{label}\".")]
    CapacityExceeded { label: &'static str, max: usize },
    #[error("You should have at least {min} candles (ideally 3+1+1+3), got {got}.")]
    InsufficientCandles { min: usize, got: usize },
}

/// Manual role tagging. One entry per candle time, bounded per role.
#[derive(Debug, Clone)]
pub struct SelectionStateMachine {
    selected: Vec<SelectedCandle>,
    active_category: CategoryId,
    min_payload: usize,
}

impl Default for SelectionStateMachine {
    fn default() -> Self {
        Self::new(TRAINER_API.manual.min_candles)
    }
}

impl SelectionStateMachine {
    pub fn new(min_payload: usize) -> Self {
        Self {
            selected: Vec::new(),
            active_category: CategoryId::first(),
            min_payload,
        }
    }

    pub fn active_category(&self) -> CategoryId {
        self.active_category
    }

    /// Any category may be activated at any time.
    pub fn set_active_category(&mut self, id: CategoryId) {
        self.active_category = id;
    }

    pub fn selected(&self) -> &[SelectedCandle] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn count_for(&self, id: CategoryId) -> usize {
        self.selected.iter().filter(|s| s.role_id == id).count()
    }

    pub fn role_of(&self, time: i64) -> Option<&SelectedCandle> {
        self.selected.iter().find(|s| s.time() == time)
    }

    /// Move `candle` into the active category.
    ///
    /// Any previous tag on the same time is removed first. When the active
    /// category is already full the call is rejected, but that removal stays.
    pub fn toggle_candle(&mut self, candle: Candle) -> Result<usize, SelectionError> {
        self.remove_time(candle.time);

        let category = self.active_category.category();
        let n = self.count_for(category.id);

        if let Some(max) = category.max {
            if n >= max {
                #[cfg(debug_assertions)]
                if DF.log_selection {
                    log::info!("Selection: {} full ({}/{}), rejecting t={}", category.label, n, max, candle.time);
                }
                return Err(SelectionError::CapacityExceeded {
                    label: category.label,
                    max,
                });
            }
        }

        let role_index = n + 1;
        self.selected.push(SelectedCandle {
            candle,
            role_id: category.id,
            role_index,
        });

        #[cfg(debug_assertions)]
        if DF.log_selection {
            log::info!("Selection: t={} -> {} #{}", candle.time, category.label, role_index);
        }
        Ok(role_index)
    }

    /// Clear everything and go back to the first category.
    pub fn reset(&mut self) {
        self.selected.clear();
        self.active_category = CategoryId::first();
    }

    /// Candles in canonical role order (category order, then role index), role data stripped.
    pub fn build_ordered_payload(&self) -> Result<Vec<Candle>, SelectionError> {
        let payload: Vec<Candle> = self
            .selected
            .iter()
            .sorted_by_key(|s| (s.role_id.category().order, s.role_index))
            .map(|s| s.candle)
            .collect();

        if payload.len() < self.min_payload {
            return Err(SelectionError::InsufficientCandles {
                min: self.min_payload,
                got: payload.len(),
            });
        }
        Ok(payload)
    }

    // Drops the entry for `time` and closes the gap in its role's numbering.
    fn remove_time(&mut self, time: i64) {
        let Some(pos) = self.selected.iter().position(|s| s.time() == time) else {
            return;
        };
        let removed = self.selected.remove(pos);
        for s in self
            .selected
            .iter_mut()
            .filter(|s| s.role_id == removed.role_id && s.role_index > removed.role_index)
        {
            s.role_index -= 1;
        }
    }

    /// `used/max` per category, in canonical order, for the category chips.
    pub fn usage(&self) -> Vec<(CategoryId, usize, Option<usize>)> {
        CATEGORIES
            .iter()
            .map(|c| (c.id, self.count_for(c.id), c.max))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(time: i64) -> Candle {
        Candle::new(time, 1.0, 2.0, 0.5, 1.5)
    }

    fn tag(sm: &mut SelectionStateMachine, cat: CategoryId, time: i64) -> Result<usize, SelectionError> {
        sm.set_active_category(cat);
        sm.toggle_candle(c(time))
    }

    #[test]
    fn starts_on_first_category() {
        let sm = SelectionStateMachine::default();
        assert_eq!(sm.active_category(), CategoryId::Prior);
        assert!(sm.is_empty());
    }

    #[test]
    fn capacity_rejects_the_extra_tag_and_leaves_state_unchanged() {
        let mut sm = SelectionStateMachine::default();
        for t in 1..=3 {
            assert_eq!(tag(&mut sm, CategoryId::Prior, t), Ok(t as usize));
        }
        let before = sm.selected().to_vec();
        let err = tag(&mut sm, CategoryId::Prior, 4).unwrap_err();
        assert_eq!(
            err,
            SelectionError::CapacityExceeded {
                label: "Prior move",
                max: 3
            }
        );
        assert_eq!(sm.selected(), before.as_slice());
    }

    #[test]
    fn retagging_a_time_moves_it_instead_of_duplicating() {
        let mut sm = SelectionStateMachine::default();
        tag(&mut sm, CategoryId::Prior, 10).unwrap();
        tag(&mut sm, CategoryId::Engulf, 10).unwrap();
        assert_eq!(sm.len(), 1);
        let entry = sm.role_of(10).unwrap();
        assert_eq!(entry.role_id, CategoryId::Engulf);
        assert_eq!(entry.role_index, 1);
        assert_eq!(sm.count_for(CategoryId::Prior), 0);
    }

    #[test]
    fn rejected_move_into_full_category_keeps_the_removal() {
        let mut sm = SelectionStateMachine::default();
        tag(&mut sm, CategoryId::Prior, 1).unwrap();
        tag(&mut sm, CategoryId::Engulf, 2).unwrap();
        // Engulf is full; moving t=1 there drops its prior tag and adds nothing.
        assert!(tag(&mut sm, CategoryId::Engulf, 1).is_err());
        assert!(sm.role_of(1).is_none());
        assert_eq!(sm.len(), 1);
    }

    #[test]
    fn role_indices_stay_unique_after_a_removal() {
        let mut sm = SelectionStateMachine::default();
        for t in 1..=3 {
            tag(&mut sm, CategoryId::Prior, t).unwrap();
        }
        // Re-click the first one in the same category: it moves to the back.
        tag(&mut sm, CategoryId::Prior, 1).unwrap();
        let mut idx: Vec<(i64, usize)> = sm.selected().iter().map(|s| (s.time(), s.role_index)).collect();
        idx.sort();
        assert_eq!(idx, vec![(1, 3), (2, 1), (3, 2)]);
    }

    #[test]
    fn ordered_payload_follows_category_order_then_role_index() {
        use CategoryId::*;
        let mut sm = SelectionStateMachine::default();
        // click order: fvg#1, prior#1, engulf#1, prior#2, lastTrend#1, prior#3, fvg#2, fvg#3
        let clicks = [
            (Displacement, 100),
            (Prior, 101),
            (Engulf, 102),
            (Prior, 103),
            (LastTrend, 104),
            (Prior, 105),
            (Displacement, 106),
            (Displacement, 107),
        ];
        for (cat, t) in clicks {
            tag(&mut sm, cat, t).unwrap();
        }
        let times: Vec<i64> = sm.build_ordered_payload().unwrap().iter().map(|c| c.time).collect();
        assert_eq!(times, vec![101, 103, 105, 104, 102, 100, 106, 107]);
    }

    #[test]
    fn payload_needs_at_least_five_candles() {
        let mut sm = SelectionStateMachine::default();
        for t in 1..=3 {
            tag(&mut sm, CategoryId::Prior, t).unwrap();
        }
        tag(&mut sm, CategoryId::LastTrend, 4).unwrap();
        assert_eq!(
            sm.build_ordered_payload(),
            Err(SelectionError::InsufficientCandles { min: 5, got: 4 })
        );
        tag(&mut sm, CategoryId::Engulf, 5).unwrap();
        assert_eq!(sm.build_ordered_payload().unwrap().len(), 5);
    }

    #[test]
    fn reset_clears_and_returns_to_first_category() {
        let mut sm = SelectionStateMachine::default();
        tag(&mut sm, CategoryId::Displacement, 1).unwrap();
        sm.reset();
        assert!(sm.is_empty());
        assert_eq!(sm.active_category(), CategoryId::Prior);
    }

    #[test]
    fn describe_role_shows_position_for_multi_slot_roles() {
        let mut sm = SelectionStateMachine::default();
        tag(&mut sm, CategoryId::Prior, 1).unwrap();
        tag(&mut sm, CategoryId::Prior, 2).unwrap();
        tag(&mut sm, CategoryId::LastTrend, 3).unwrap();
        assert_eq!(sm.role_of(2).unwrap().describe_role(), "Prior move (2/3)");
        assert_eq!(sm.role_of(3).unwrap().describe_role(), "Last candle of trend");
        assert_eq!(sm.usage()[0], (CategoryId::Prior, 2, Some(3)));
    }
}
