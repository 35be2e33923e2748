//! Manual-selection roles, in canonical pattern order.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryId {
    Prior,
    LastTrend,
    Engulf,
    Displacement,
}

#[derive(Debug, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub label: &'static str,
    /// `None` means unbounded.
    pub max: Option<usize>,
    pub order: u8,
}

pub const CATEGORIES: &[Category] = &[
    Category {
        id: CategoryId::Prior,
        label: "Prior move",
        max: Some(3),
        order: 0,
    },
    Category {
        id: CategoryId::LastTrend,
        label: "Last candle of trend",
        max: Some(1),
        order: 1,
    },
    Category {
        id: CategoryId::Engulf,
        label: "Engulf candle",
        max: Some(1),
        order: 2,
    },
    Category {
        id: CategoryId::Displacement,
        label: "FVG / Displacement",
        max: Some(3),
        order: 3,
    },
];

impl CategoryId {
    pub fn category(self) -> &'static Category {
        // Every id has exactly one row.
        CATEGORIES
            .iter()
            .find(|c| c.id == self)
            .unwrap_or(&CATEGORIES[0])
    }

    /// First category in canonical order (the reset target).
    pub fn first() -> Self {
        CATEGORIES
            .iter()
            .min_by_key(|c| c.order)
            .map(|c| c.id)
            .unwrap_or(CategoryId::Prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_are_unique_and_first_is_prior() {
        let mut orders: Vec<u8> = CATEGORIES.iter().map(|c| c.order).collect();
        orders.dedup();
        assert_eq!(orders.len(), CATEGORIES.len());
        assert_eq!(CategoryId::first(), CategoryId::Prior);
    }

    #[test]
    fn capacities_match_pattern_shape() {
        let total: usize = CATEGORIES.iter().filter_map(|c| c.max).sum();
        assert_eq!(total, 8);
        assert_eq!(CategoryId::Engulf.category().max, Some(1));
    }
}
