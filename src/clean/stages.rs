//! The individual repair stages. Each stage consumes a `Dataset` and returns
//! a new one plus an outcome with repaired/dropped row counts; stage order
//! lives in `run_pipeline`.
//!
//! Rows with no evidence left to repair from (no usable menu date anywhere,
//! no price anywhere) are dropped; every other defect is fixed in place.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;

use crate::checks::appearance::dish_appearances;
use crate::clean::StageOutcome;
use crate::data::tables::{parse_timestamp, Dataset};

/// Where `created_at > updated_at`, pull `updated_at` forward to match.
/// Rows with an unparsable timestamp are left for later stages.
pub fn fix_timestamp_order(mut dataset: Dataset) -> (Dataset, StageOutcome) {
    let mut repaired = 0;
    for item in &mut dataset.items {
        if let (Some(created), Some(updated)) = (
            parse_timestamp(&item.created_at),
            parse_timestamp(&item.updated_at),
        ) {
            if created > updated {
                item.updated_at = item.created_at.clone();
                repaired += 1;
            }
        }
    }
    (dataset, StageOutcome::new("fix_timestamp_order", repaired, 0))
}

/// Drop MenuPage rows whose `menu_id` does not reference an existing menu.
pub fn drop_orphan_pages(mut dataset: Dataset) -> (Dataset, StageOutcome) {
    let menu_ids = dataset.menu_ids();
    let before = dataset.pages.len();
    dataset
        .pages
        .retain(|page| page.menu_id.is_some_and(|id| menu_ids.contains(&id)));
    let dropped = before - dataset.pages.len();
    (dataset, StageOutcome::new("drop_orphan_pages", 0, dropped))
}

/// Drop MenuItem rows whose `menu_page_id` does not reference a surviving
/// page. Runs after `drop_orphan_pages` so removed pages take their items
/// with them.
pub fn drop_orphan_items(mut dataset: Dataset) -> (Dataset, StageOutcome) {
    let page_ids = dataset.page_ids();
    let before = dataset.items.len();
    dataset
        .items
        .retain(|item| item.menu_page_id.is_some_and(|id| page_ids.contains(&id)));
    let dropped = before - dataset.items.len();
    (dataset, StageOutcome::new("drop_orphan_items", 0, dropped))
}

/// Overwrite each dish's `first_appeared`/`last_appeared` with the years
/// aggregated from its (already cleaned) referencing menus. Spans carry both
/// years or neither, so a dish with no date evidence at all is dropped.
pub fn recompute_dish_years(dataset: Dataset) -> (Dataset, StageOutcome) {
    let spans = dish_appearances(&dataset);
    let mut dataset = dataset;
    let before = dataset.dishes.len();
    let mut repaired = 0;
    let mut kept = Vec::with_capacity(before);
    for mut dish in dataset.dishes {
        let span = spans.get(&dish.id).copied().unwrap_or_default();
        let (Some(first), Some(last)) = (span.earliest_year, span.latest_year) else {
            continue;
        };
        if dish.first_appeared != Some(first) || dish.last_appeared != Some(last) {
            repaired += 1;
        }
        dish.first_appeared = Some(first);
        dish.last_appeared = Some(last);
        kept.push(dish);
    }
    let dropped = before - kept.len();
    dataset.dishes = kept;
    (
        dataset,
        StageOutcome::new("recompute_dish_years", repaired, dropped),
    )
}

/// Fill missing dish price bounds from the dish's own menu-item prices, then
/// from the opposite bound. A dish with no price evidence anywhere is
/// dropped; reversed bounds are swapped so the later clamp is well-defined.
pub fn repair_dish_prices(dataset: Dataset) -> (Dataset, StageOutcome) {
    let mut observed: HashMap<u64, (f64, f64)> = HashMap::new();
    for item in &dataset.items {
        if let (Some(dish_id), Some(price)) = (item.dish_id, item.price) {
            observed
                .entry(dish_id)
                .and_modify(|(min, max)| {
                    *min = min.min(price);
                    *max = max.max(price);
                })
                .or_insert((price, price));
        }
    }

    let mut dataset = dataset;
    let before = dataset.dishes.len();
    let mut repaired = 0;
    let mut kept = Vec::with_capacity(before);
    for mut dish in dataset.dishes {
        let item_span = observed.get(&dish.id).copied();
        let low = dish
            .lowest_price
            .or(item_span.map(|(min, _)| min))
            .or(dish.highest_price);
        let high = dish
            .highest_price
            .or(item_span.map(|(_, max)| max))
            .or(low);
        let (Some(mut low), Some(mut high)) = (low, high) else {
            continue;
        };
        if low > high {
            std::mem::swap(&mut low, &mut high);
        }
        if dish.lowest_price != Some(low) || dish.highest_price != Some(high) {
            repaired += 1;
        }
        dish.lowest_price = Some(low);
        dish.highest_price = Some(high);
        kept.push(dish);
    }
    let dropped = before - kept.len();
    dataset.dishes = kept;
    (
        dataset,
        StageOutcome::new("repair_dish_prices", repaired, dropped),
    )
}

/// Repair each item's price against its dish bounds: derive a missing bound
/// from the item's own price and the other bound, fill a missing price with
/// the bound midpoint, then clamp into `[lowest, highest]`. Items with no
/// price evidence at all are dropped.
pub fn repair_item_prices(dataset: Dataset) -> (Dataset, StageOutcome) {
    let bounds: HashMap<u64, (Option<f64>, Option<f64>)> = dataset
        .dishes
        .iter()
        .map(|d| (d.id, (d.lowest_price, d.highest_price)))
        .collect();

    let mut dataset = dataset;
    let before = dataset.items.len();
    let mut repaired = 0;
    let mut kept = Vec::with_capacity(before);
    for mut item in dataset.items {
        let (dish_low, dish_high) = item
            .dish_id
            .and_then(|id| bounds.get(&id).copied())
            .unwrap_or((None, None));
        let low = dish_low.or_else(|| min_opt(item.price, dish_high));
        let high = dish_high.or_else(|| max_opt(item.price, low));
        let price = item
            .price
            .or_else(|| low.zip(high).map(|(l, h)| (l + h) / 2.0));
        let Some(price) = price else {
            continue;
        };
        let clamped = match (low, high) {
            (Some(low), Some(high)) => price.max(low).min(high),
            (Some(low), None) => price.max(low),
            (None, Some(high)) => price.min(high),
            (None, None) => price,
        };
        if item.price != Some(clamped) {
            repaired += 1;
        }
        item.price = Some(clamped);
        kept.push(item);
    }
    let dropped = before - kept.len();
    dataset.items = kept;
    (
        dataset,
        StageOutcome::new("repair_item_prices", repaired, dropped),
    )
}

/// For each `(dish_id, menu_page_id)` pair keep only the most recently
/// updated item; ties (and unparsable timestamps, which rank lowest) keep
/// the lowest id.
pub fn dedup_page_dish_pairs(mut dataset: Dataset) -> (Dataset, StageOutcome) {
    type Rank = (Option<NaiveDateTime>, Reverse<u64>);
    let mut best: HashMap<(Option<u64>, Option<u64>), Rank> = HashMap::new();
    for item in &dataset.items {
        let rank: Rank = (parse_timestamp(&item.updated_at), Reverse(item.id));
        best.entry((item.dish_id, item.menu_page_id))
            .and_modify(|current| {
                if rank > *current {
                    *current = rank;
                }
            })
            .or_insert(rank);
    }
    let keep: HashSet<u64> = best.values().map(|(_, Reverse(id))| *id).collect();

    let before = dataset.items.len();
    dataset.items.retain(|item| keep.contains(&item.id));
    let dropped = before - dataset.items.len();
    (
        dataset,
        StageOutcome::new("dedup_page_dish_pairs", 0, dropped),
    )
}

/// Drop MenuItem rows whose `dish_id` does not reference a surviving dish.
/// Runs last among the item drops so it sees the post-repair Dish table.
pub fn drop_invalid_dish_items(mut dataset: Dataset) -> (Dataset, StageOutcome) {
    let dish_ids = dataset.dish_ids();
    let before = dataset.items.len();
    dataset
        .items
        .retain(|item| item.dish_id.is_some_and(|id| dish_ids.contains(&id)));
    let dropped = before - dataset.items.len();
    (
        dataset,
        StageOutcome::new("drop_invalid_dish_items", 0, dropped),
    )
}

fn min_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

fn max_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}
