//! Rule-level tests for the integrity checker: each rule flags exactly the
//! offending ids and stays silent on clean or empty input.

use menuscrub::checks::{all_clean, run_all_checks, rules};
use menuscrub::data::tables::{Dataset, Dish, Menu, MenuItem, MenuPage};

fn menu(id: u64, date: Option<&str>) -> Menu {
    Menu {
        id,
        date: date.map(str::to_string),
    }
}

fn page(id: u64, menu_id: Option<u64>) -> MenuPage {
    MenuPage { id, menu_id }
}

fn item(id: u64, page_id: Option<u64>, dish_id: Option<u64>, price: Option<f64>) -> MenuItem {
    MenuItem {
        id,
        menu_page_id: page_id,
        dish_id,
        price,
        created_at: "2019-01-01 00:00:00".to_string(),
        updated_at: "2019-06-01 00:00:00".to_string(),
    }
}

fn dish(
    id: u64,
    years: (Option<i32>, Option<i32>),
    bounds: (Option<f64>, Option<f64>),
) -> Dish {
    Dish {
        id,
        first_appeared: years.0,
        last_appeared: years.1,
        lowest_price: bounds.0,
        highest_price: bounds.1,
    }
}

#[test]
fn menu_id_rule_flags_orphan_and_null_pages() {
    let dataset = Dataset {
        menus: vec![menu(1, Some("1900-01-01"))],
        pages: vec![page(10, Some(1)), page(11, Some(99)), page(12, None)],
        ..Dataset::default()
    };
    assert_eq!(rules::check_menu_id(&dataset), vec![11, 12]);
}

#[test]
fn menu_page_id_rule_flags_orphan_items() {
    let dataset = Dataset {
        pages: vec![page(10, Some(1))],
        items: vec![
            item(100, Some(10), Some(1), Some(1.0)),
            item(101, Some(55), Some(1), Some(1.0)),
            item(102, None, Some(1), Some(1.0)),
        ],
        ..Dataset::default()
    };
    assert_eq!(rules::check_menu_page_id(&dataset), vec![101, 102]);
}

#[test]
fn dish_id_rule_flags_unknown_dishes() {
    let dataset = Dataset {
        items: vec![
            item(100, Some(10), Some(1000), Some(1.0)),
            item(101, Some(10), Some(9999), Some(1.0)),
            item(102, Some(10), None, Some(1.0)),
        ],
        dishes: vec![dish(1000, (Some(1900), Some(1900)), (Some(1.0), Some(2.0)))],
        ..Dataset::default()
    };
    assert_eq!(rules::check_dish_id(&dataset), vec![101, 102]);
}

#[test]
fn dish_dates_rule_accepts_years_matching_menu_evidence() {
    let dataset = Dataset {
        menus: vec![menu(1, Some("1900-01-01")), menu(2, Some("1930-06-15"))],
        pages: vec![page(10, Some(1)), page(20, Some(2))],
        items: vec![
            item(100, Some(10), Some(1000), Some(1.0)),
            item(101, Some(20), Some(1000), Some(1.0)),
        ],
        dishes: vec![dish(1000, (Some(1900), Some(1930)), (Some(1.0), Some(2.0)))],
    };
    assert!(rules::check_dish_dates(&dataset).is_empty());
}

#[test]
fn dish_dates_rule_flags_mismatch_nulls_and_reversed_years() {
    let dataset = Dataset {
        menus: vec![menu(1, Some("1900-01-01"))],
        pages: vec![page(10, Some(1))],
        items: vec![
            item(100, Some(10), Some(1000), Some(1.0)),
            item(101, Some(10), Some(2000), Some(1.0)),
            item(102, Some(10), Some(3000), Some(1.0)),
        ],
        dishes: vec![
            // Curated years disagree with the single 1900 menu.
            dish(1000, (Some(1950), Some(1960)), (None, None)),
            dish(2000, (None, None), (None, None)),
            dish(3000, (Some(1930), Some(1900)), (None, None)),
        ],
    };
    assert_eq!(rules::check_dish_dates(&dataset), vec![1000, 2000, 3000]);
}

#[test]
fn dish_dates_rule_flags_out_of_range_years() {
    let dataset = Dataset {
        menus: vec![menu(1, Some("0450-01-01"))],
        pages: vec![page(10, Some(1))],
        items: vec![item(100, Some(10), Some(1000), Some(1.0))],
        // Years echo the implausible menu date, which is not valid evidence.
        dishes: vec![dish(1000, (Some(450), Some(450)), (None, None))],
    };
    assert_eq!(rules::check_dish_dates(&dataset), vec![1000]);
}

#[test]
fn price_rule_is_inclusive_at_both_bounds() {
    let dataset = Dataset {
        items: vec![
            item(100, Some(10), Some(1000), Some(1.0)),
            item(101, Some(10), Some(1000), Some(10.0)),
            item(102, Some(10), Some(1000), Some(10.5)),
            item(103, Some(10), Some(1000), Some(0.5)),
        ],
        dishes: vec![dish(1000, (Some(1900), Some(1900)), (Some(1.0), Some(10.0)))],
        ..Dataset::default()
    };
    assert_eq!(rules::check_price_bounds(&dataset), vec![102, 103]);
}

#[test]
fn price_rule_treats_nulls_as_violations_after_the_join() {
    let dataset = Dataset {
        items: vec![
            item(100, Some(10), Some(1000), None),
            item(101, Some(10), Some(2000), Some(3.0)),
            // Unknown dish: IC3 territory, skipped here.
            item(102, Some(10), Some(9999), Some(3.0)),
        ],
        dishes: vec![
            dish(1000, (None, None), (Some(1.0), Some(10.0))),
            dish(2000, (None, None), (None, Some(10.0))),
        ],
        ..Dataset::default()
    };
    assert_eq!(rules::check_price_bounds(&dataset), vec![100, 101]);
}

#[test]
fn duplicate_rule_groups_conflicting_ids() {
    let dataset = Dataset {
        items: vec![
            item(100, Some(10), Some(1), Some(1.0)),
            item(101, Some(10), Some(1), Some(1.0)),
            item(102, Some(20), Some(1), Some(1.0)),
            item(103, Some(10), Some(1), Some(1.0)),
            item(104, Some(20), Some(2), Some(1.0)),
            item(105, Some(20), Some(2), Some(1.0)),
        ],
        ..Dataset::default()
    };
    assert_eq!(
        rules::check_duplicate_pairs(&dataset),
        vec![vec![100, 101, 103], vec![104, 105]]
    );
}

#[test]
fn created_updated_rule_flags_reversed_and_unparsable_rows() {
    let mut reversed = item(100, Some(10), Some(1), Some(1.0));
    reversed.created_at = "2020-01-02 00:00:00".to_string();
    reversed.updated_at = "2020-01-01 00:00:00".to_string();
    let mut garbled = item(101, Some(10), Some(1), Some(1.0));
    garbled.updated_at = "whenever".to_string();
    let mut equal = item(102, Some(10), Some(1), Some(1.0));
    equal.created_at = "2020-01-01 00:00:00".to_string();
    equal.updated_at = "2020-01-01 00:00:00".to_string();

    let dataset = Dataset {
        items: vec![reversed, garbled, equal],
        ..Dataset::default()
    };
    assert_eq!(rules::check_created_updated(&dataset), vec![100, 101]);
}

#[test]
fn empty_dataset_yields_empty_violation_lists() {
    let reports = run_all_checks(&Dataset::default());
    assert_eq!(reports.len(), 7);
    assert!(all_clean(&reports));
    for report in &reports {
        assert!(report.violating_ids.is_empty());
    }
}

#[test]
fn duplicate_report_carries_groups_and_flat_count() {
    let dataset = Dataset {
        items: vec![
            item(100, Some(10), Some(1), Some(1.0)),
            item(101, Some(10), Some(1), Some(1.0)),
        ],
        ..Dataset::default()
    };
    let reports = run_all_checks(&dataset);
    let dup = reports
        .iter()
        .find(|r| r.rule == "duplicate_page_dish")
        .expect("duplicate rule should be in the registry");
    assert_eq!(dup.count, 2);
    assert_eq!(dup.violating_ids, vec![100, 101]);
    assert_eq!(dup.groups.as_deref(), Some(&[vec![100, 101]][..]));
}

#[test]
fn scenario_original_data_flags_dates_but_not_price() {
    // Menu 1900, item priced 5 within [1, 10], dish curated as 1950-1960.
    let mut reversed = item(100, Some(10), Some(1000), Some(5.0));
    reversed.created_at = "2020-01-02 00:00:00".to_string();
    reversed.updated_at = "2020-01-01 00:00:00".to_string();
    let dataset = Dataset {
        menus: vec![menu(1, Some("1900-01-01"))],
        pages: vec![page(10, Some(1))],
        items: vec![reversed],
        dishes: vec![dish(1000, (Some(1950), Some(1960)), (Some(1.0), Some(10.0)))],
    };

    assert!(rules::check_price_bounds(&dataset).is_empty());
    assert_eq!(rules::check_dish_dates(&dataset), vec![1000]);
    assert_eq!(rules::check_created_updated(&dataset), vec![100]);
}
