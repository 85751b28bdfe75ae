//! Read-only diagnostic pass: a registry of independent integrity rules run
//! over one immutable `Dataset` snapshot. Rules never fail; each returns a
//! possibly empty violation collection, and the registry runs them in
//! parallel since they are mutually independent.

pub mod appearance;
pub mod rules;

use rayon::prelude::*;
use serde::Serialize;

use crate::data::tables::Dataset;

/// What a rule found: flat violating ids, or ids grouped by conflicting key
/// (the duplicate-pair rule).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violations {
    Ids(Vec<u64>),
    Groups(Vec<Vec<u64>>),
}

/// One named rule over an immutable snapshot.
pub struct RuleSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub run: fn(&Dataset) -> Violations,
}

/// Result of one rule, ready for console or JSON output. `violating_ids` is
/// always the flat list; `groups` is only present for the duplicate rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub rule: &'static str,
    pub description: &'static str,
    pub count: usize,
    pub violating_ids: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Vec<u64>>>,
}

fn duplicate_pair_rule(dataset: &Dataset) -> Violations {
    Violations::Groups(rules::check_duplicate_pairs(dataset))
}

fn created_updated_rule(dataset: &Dataset) -> Violations {
    Violations::Ids(rules::check_created_updated(dataset))
}

fn menu_id_rule(dataset: &Dataset) -> Violations {
    Violations::Ids(rules::check_menu_id(dataset))
}

fn menu_page_id_rule(dataset: &Dataset) -> Violations {
    Violations::Ids(rules::check_menu_page_id(dataset))
}

fn dish_id_rule(dataset: &Dataset) -> Violations {
    Violations::Ids(rules::check_dish_id(dataset))
}

fn dish_dates_rule(dataset: &Dataset) -> Violations {
    Violations::Ids(rules::check_dish_dates(dataset))
}

fn price_bounds_rule(dataset: &Dataset) -> Violations {
    Violations::Ids(rules::check_price_bounds(dataset))
}

/// Every rule, in report order.
pub const RULES: &[RuleSpec] = &[
    RuleSpec {
        name: "duplicate_page_dish",
        description: "duplicate (dish_id, menu_page_id) pairs in MenuItem",
        run: duplicate_pair_rule,
    },
    RuleSpec {
        name: "created_updated",
        description: "invalid update and create time in MenuItem",
        run: created_updated_rule,
    },
    RuleSpec {
        name: "menu_id",
        description: "invalid menu_id in MenuPage",
        run: menu_id_rule,
    },
    RuleSpec {
        name: "menu_page_id",
        description: "invalid menu_page_id in MenuItem",
        run: menu_page_id_rule,
    },
    RuleSpec {
        name: "dish_id",
        description: "invalid dish_id in MenuItem",
        run: dish_id_rule,
    },
    RuleSpec {
        name: "dish_dates",
        description: "invalid dates in first and last appeared in Dish",
        run: dish_dates_rule,
    },
    RuleSpec {
        name: "price_bounds",
        description: "invalid price in MenuItem",
        run: price_bounds_rule,
    },
];

/// Run every rule against `dataset`. Rules are read-only and independent, so
/// they run in parallel; report order matches the registry.
pub fn run_all_checks(dataset: &Dataset) -> Vec<RuleReport> {
    RULES
        .par_iter()
        .map(|spec| {
            let (violating_ids, groups) = match (spec.run)(dataset) {
                Violations::Ids(ids) => (ids, None),
                Violations::Groups(groups) => {
                    (groups.iter().flatten().copied().collect(), Some(groups))
                }
            };
            RuleReport {
                rule: spec.name,
                description: spec.description,
                count: violating_ids.len(),
                violating_ids,
                groups,
            }
        })
        .collect()
}

/// True when no rule reports a violation.
pub fn all_clean(reports: &[RuleReport]) -> bool {
    reports.iter().all(|report| report.count == 0)
}
