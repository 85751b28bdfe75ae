//! CSV load/store for the four menu relations.
//!
//! Reads `Menu.csv`, `MenuPage.csv`, `MenuItem.csv`, and `Dish.csv` from a
//! directory and writes cleaned copies back out. Extra columns in the input
//! are ignored; the output carries exactly the modeled columns.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::data::tables::Dataset;

pub const MENU_FILE: &str = "Menu.csv";
pub const MENU_PAGE_FILE: &str = "MenuPage.csv";
pub const MENU_ITEM_FILE: &str = "MenuItem.csv";
pub const DISH_FILE: &str = "Dish.csv";

#[derive(Debug)]
pub enum LoadError {
    Open(PathBuf, csv::Error),
    Row(PathBuf, csv::Error),
    Write(PathBuf, csv::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(path, err) => write!(f, "failed to open '{}': {err}", path.display()),
            Self::Row(path, err) => write!(f, "failed to parse row in '{}': {err}", path.display()),
            Self::Write(path, err) => write!(f, "failed to write '{}': {err}", path.display()),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open(_, err) | Self::Row(_, err) | Self::Write(_, err) => Some(err),
        }
    }
}

/// Load the four relations from `dir`, preserving row order.
pub fn load_dataset(dir: &Path) -> Result<Dataset, LoadError> {
    Ok(Dataset {
        menus: read_table(&dir.join(MENU_FILE))?,
        pages: read_table(&dir.join(MENU_PAGE_FILE))?,
        items: read_table(&dir.join(MENU_ITEM_FILE))?,
        dishes: read_table(&dir.join(DISH_FILE))?,
    })
}

/// Write the four relations to `dir`, creating it if needed.
pub fn write_dataset(dir: &Path, dataset: &Dataset) -> Result<(), LoadError> {
    if let Err(err) = std::fs::create_dir_all(dir) {
        return Err(LoadError::Write(dir.to_path_buf(), err.into()));
    }
    write_table(&dir.join(MENU_FILE), &dataset.menus)?;
    write_table(&dir.join(MENU_PAGE_FILE), &dataset.pages)?;
    write_table(&dir.join(MENU_ITEM_FILE), &dataset.items)?;
    write_table(&dir.join(DISH_FILE), &dataset.dishes)?;
    Ok(())
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|err| LoadError::Open(path.to_path_buf(), err))?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row = result.map_err(|err| LoadError::Row(path.to_path_buf(), err))?;
        rows.push(row);
    }
    Ok(rows)
}

fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), LoadError> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|err| LoadError::Write(path.to_path_buf(), err))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|err| LoadError::Write(path.to_path_buf(), err))?;
    }
    writer
        .flush()
        .map_err(|err| LoadError::Write(path.to_path_buf(), err.into()))
}
