//! Integrity checking and repair for the four-table historical menu dataset
//! (Menu, MenuPage, MenuItem, Dish). Loads the relations from CSV, runs a
//! read-only diagnostic pass, and applies an ordered repair pipeline that
//! leaves every integrity constraint satisfied.

pub mod checks;
pub mod clean;
pub mod cli;
pub mod data;
