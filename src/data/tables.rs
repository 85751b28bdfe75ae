//! Record types for the four menu relations and the `Dataset` snapshot the
//! checker and the repair pipeline operate on.
//!
//! Numeric fields that the source data leaves blank or garbled are nullable:
//! a cell that fails to parse becomes `None` rather than keeping the raw
//! string, and the null then flows through joins and aggregations.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Earliest year a menu date is accepted as evidence.
pub const FIRST_PLAUSIBLE_YEAR: i32 = 1800;
/// Latest year a menu date is accepted as evidence.
pub const LAST_PLAUSIBLE_YEAR: i32 = 2024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub id: u64,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuPage {
    pub id: u64,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub menu_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u64,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub menu_page_id: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub dish_id: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub price: Option<f64>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub id: u64,
    #[serde(default, deserialize_with = "de_opt_year")]
    pub first_appeared: Option<i32>,
    #[serde(default, deserialize_with = "de_opt_year")]
    pub last_appeared: Option<i32>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub lowest_price: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub highest_price: Option<f64>,
}

/// One immutable snapshot of the four relations, in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub menus: Vec<Menu>,
    pub pages: Vec<MenuPage>,
    pub items: Vec<MenuItem>,
    pub dishes: Vec<Dish>,
}

/// Row counts per table, for before/after reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub menus: usize,
    pub pages: usize,
    pub items: usize,
    pub dishes: usize,
}

impl Dataset {
    pub fn counts(&self) -> TableCounts {
        TableCounts {
            menus: self.menus.len(),
            pages: self.pages.len(),
            items: self.items.len(),
            dishes: self.dishes.len(),
        }
    }

    pub fn menu_ids(&self) -> HashSet<u64> {
        self.menus.iter().map(|m| m.id).collect()
    }

    pub fn page_ids(&self) -> HashSet<u64> {
        self.pages.iter().map(|p| p.id).collect()
    }

    pub fn dish_ids(&self) -> HashSet<u64> {
        self.dishes.iter().map(|d| d.id).collect()
    }
}

/// Parse a menu date and return its year, or `None` when the cell is blank,
/// unparsable, or outside the plausible menu window. An impossible year is
/// not evidence of anything, so it is treated exactly like a missing date.
pub fn menu_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S"))
        .ok()?;
    let year = date.year();
    (FIRST_PLAUSIBLE_YEAR..=LAST_PLAUSIBLE_YEAR)
        .contains(&year)
        .then_some(year)
}

/// Parse a row timestamp such as `2011-04-19 04:33:15 UTC`. Unparsable or
/// blank timestamps become `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_end_matches(" UTC");
    if trimmed.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn de_opt_u64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u64>, D::Error> {
    let raw = Option::<String>::deserialize(de)?;
    Ok(non_blank(raw).and_then(|s| {
        s.parse::<u64>()
            .ok()
            .or_else(|| whole_float(&s).filter(|v| *v >= 0.0).map(|v| v as u64))
    }))
}

fn de_opt_f64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<String>::deserialize(de)?;
    Ok(non_blank(raw).and_then(|s| s.parse::<f64>().ok().filter(|v| v.is_finite())))
}

fn de_opt_year<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i32>, D::Error> {
    let raw = Option::<String>::deserialize(de)?;
    Ok(non_blank(raw).and_then(|s| {
        s.parse::<i32>()
            .ok()
            .or_else(|| whole_float(&s).map(|v| v as i32))
    }))
}

// Year and id columns sometimes arrive as floats ("1897.0") from earlier
// spreadsheet round-trips; accept them when they are whole numbers.
fn whole_float(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64)
}
