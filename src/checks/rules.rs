//! The integrity rules. Each rule is a pure function of one `Dataset`
//! snapshot and returns the violating record ids; a clean (or empty) input
//! yields an empty list. Boundary comparisons are inclusive everywhere.

use std::collections::HashMap;

use crate::checks::appearance::dish_appearances;
use crate::data::tables::{
    parse_timestamp, Dataset, FIRST_PLAUSIBLE_YEAR, LAST_PLAUSIBLE_YEAR,
};

/// MenuPage rows whose `menu_id` is not a valid Menu id.
pub fn check_menu_id(dataset: &Dataset) -> Vec<u64> {
    let menu_ids = dataset.menu_ids();
    dataset
        .pages
        .iter()
        .filter(|p| !p.menu_id.is_some_and(|id| menu_ids.contains(&id)))
        .map(|p| p.id)
        .collect()
}

/// MenuItem rows whose `menu_page_id` is not a valid MenuPage id.
pub fn check_menu_page_id(dataset: &Dataset) -> Vec<u64> {
    let page_ids = dataset.page_ids();
    dataset
        .items
        .iter()
        .filter(|i| !i.menu_page_id.is_some_and(|id| page_ids.contains(&id)))
        .map(|i| i.id)
        .collect()
}

/// MenuItem rows whose `dish_id` is not a valid Dish id.
pub fn check_dish_id(dataset: &Dataset) -> Vec<u64> {
    let dish_ids = dataset.dish_ids();
    dataset
        .items
        .iter()
        .filter(|i| !i.dish_id.is_some_and(|id| dish_ids.contains(&id)))
        .map(|i| i.id)
        .collect()
}

/// Dish rows whose appearance years are missing, out of range, reversed, or
/// inconsistent with the years aggregated from their referencing menus.
pub fn check_dish_dates(dataset: &Dataset) -> Vec<u64> {
    let spans = dish_appearances(dataset);
    let year_range = FIRST_PLAUSIBLE_YEAR..=LAST_PLAUSIBLE_YEAR;
    dataset
        .dishes
        .iter()
        .filter(|dish| {
            let range_ok = matches!(
                (dish.first_appeared, dish.last_appeared),
                (Some(first), Some(last))
                    if year_range.contains(&first) && year_range.contains(&last) && first <= last
            );
            let consistent = spans.get(&dish.id).is_some_and(|span| {
                dish.first_appeared == span.earliest_year && dish.last_appeared == span.latest_year
            });
            !range_ok || !consistent
        })
        .map(|dish| dish.id)
        .collect()
}

/// MenuItem rows whose price falls outside the paired dish's bounds. Rows
/// whose `dish_id` does not join are IC3 violations and are skipped here;
/// after the join, a null price or a null bound counts as a violation.
pub fn check_price_bounds(dataset: &Dataset) -> Vec<u64> {
    let bounds: HashMap<u64, (Option<f64>, Option<f64>)> = dataset
        .dishes
        .iter()
        .map(|d| (d.id, (d.lowest_price, d.highest_price)))
        .collect();
    dataset
        .items
        .iter()
        .filter(|item| {
            let Some(&(low, high)) = item.dish_id.and_then(|id| bounds.get(&id)) else {
                return false;
            };
            !matches!(
                (item.price, low, high),
                (Some(price), Some(low), Some(high)) if low <= price && price <= high
            )
        })
        .map(|item| item.id)
        .collect()
}

/// Groups of MenuItem ids sharing a `(dish_id, menu_page_id)` pair. Each
/// group lists the conflicting ids in row order; groups are ordered by their
/// first id.
pub fn check_duplicate_pairs(dataset: &Dataset) -> Vec<Vec<u64>> {
    let mut by_pair: HashMap<(Option<u64>, Option<u64>), Vec<u64>> = HashMap::new();
    for item in &dataset.items {
        by_pair
            .entry((item.dish_id, item.menu_page_id))
            .or_default()
            .push(item.id);
    }
    let mut groups: Vec<Vec<u64>> = by_pair
        .into_values()
        .filter(|ids| ids.len() > 1)
        .collect();
    groups.sort_by_key(|ids| ids[0]);
    groups
}

/// MenuItem rows where `created_at` and `updated_at` cannot be shown to be
/// in order: either timestamp unparsable, or `created_at > updated_at`.
pub fn check_created_updated(dataset: &Dataset) -> Vec<u64> {
    dataset
        .items
        .iter()
        .filter(|item| {
            !matches!(
                (
                    parse_timestamp(&item.created_at),
                    parse_timestamp(&item.updated_at),
                ),
                (Some(created), Some(updated)) if created <= updated
            )
        })
        .map(|item| item.id)
        .collect()
}
