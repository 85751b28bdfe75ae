//! Dish appearance years: for each dish, the earliest and latest menu year
//! reached through the MenuItem -> MenuPage -> Menu chain.
//!
//! Left-join semantics: every dish in the Dish table gets a span, and a dish
//! with no referencing item or no usable menu date keeps `None` on both
//! sides. Unparsable dates (and dates outside the plausible menu window)
//! contribute no evidence.

use std::collections::HashMap;

use crate::data::tables::{menu_year, Dataset};

/// Earliest/latest year a dish appears on any menu. `None` means no usable
/// date evidence on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppearanceSpan {
    pub earliest_year: Option<i32>,
    pub latest_year: Option<i32>,
}

impl AppearanceSpan {
    fn observe(&mut self, year: i32) {
        self.earliest_year = Some(self.earliest_year.map_or(year, |y| y.min(year)));
        self.latest_year = Some(self.latest_year.map_or(year, |y| y.max(year)));
    }
}

/// Compute the appearance span for every dish in `dataset`.
pub fn dish_appearances(dataset: &Dataset) -> HashMap<u64, AppearanceSpan> {
    let menu_years: HashMap<u64, Option<i32>> = dataset
        .menus
        .iter()
        .map(|m| (m.id, m.date.as_deref().and_then(menu_year)))
        .collect();
    let page_menus: HashMap<u64, u64> = dataset
        .pages
        .iter()
        .filter_map(|p| p.menu_id.map(|menu_id| (p.id, menu_id)))
        .collect();

    let mut spans: HashMap<u64, AppearanceSpan> = dataset
        .dishes
        .iter()
        .map(|d| (d.id, AppearanceSpan::default()))
        .collect();

    for item in &dataset.items {
        let Some(dish_id) = item.dish_id else { continue };
        // Items pointing at unknown dishes are IC3's concern, not evidence.
        let Some(span) = spans.get_mut(&dish_id) else { continue };
        let year = item
            .menu_page_id
            .and_then(|page_id| page_menus.get(&page_id))
            .and_then(|menu_id| menu_years.get(menu_id).copied().flatten());
        if let Some(year) = year {
            span.observe(year);
        }
    }

    spans
}
