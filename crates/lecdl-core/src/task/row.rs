//! Row source: sheets of rows keyed by column name.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// One raw cell value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cell {
    /// Cell absent or explicitly null.
    #[default]
    Missing,
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Cell text, or `None` when missing.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Missing => None,
            Cell::Text(s) => Some(s),
        }
    }

    /// Missing or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.as_str().map(|s| s.trim().is_empty()).unwrap_or(true)
    }

    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Missing,
            Value::String(s) => Cell::Text(s.clone()),
            Value::Number(n) => Cell::Text(n.to_string()),
            Value::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

static MISSING: Cell = Cell::Missing;

/// One spreadsheet row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: HashMap<String, Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, cell: Cell) {
        self.cells.insert(column.into(), cell);
    }

    pub fn get(&self, column: &str) -> &Cell {
        self.cells.get(column).unwrap_or(&MISSING)
    }

    /// Cell text, or `""` when missing.
    pub fn text(&self, column: &str) -> &str {
        self.get(column).as_str().unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, Option<V>)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.set(k, v.map(|v| Cell::Text(v.into())).unwrap_or(Cell::Missing));
        }
        row
    }
}

/// A named sheet: header columns plus rows in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// All sheets of one workbook, in workbook order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct WorkbookDoc {
    sheets: Vec<SheetDoc>,
}

#[derive(Debug, Deserialize)]
struct SheetDoc {
    name: String,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<serde_json::Map<String, Value>>,
}

impl Workbook {
    /// Parses a JSON workbook:
    /// `{"sheets":[{"name":..,"columns":[..],"rows":[{col: value|null}]}]}`.
    /// When `columns` is omitted it is the union of row keys.
    pub fn from_json_str(data: &str) -> Result<Self> {
        let doc: WorkbookDoc = serde_json::from_str(data).context("parse workbook JSON")?;
        let sheets = doc
            .sheets
            .into_iter()
            .map(|s| {
                let mut columns = s.columns;
                if columns.is_empty() {
                    for row in &s.rows {
                        for key in row.keys() {
                            if !columns.contains(key) {
                                columns.push(key.clone());
                            }
                        }
                    }
                }
                let rows = s
                    .rows
                    .iter()
                    .map(|r| {
                        let mut row = Row::new();
                        for (k, v) in r {
                            row.set(k.clone(), Cell::from_json(v));
                        }
                        row
                    })
                    .collect();
                Sheet {
                    name: s.name,
                    columns,
                    rows,
                }
            })
            .collect();
        Ok(Self { sheets })
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("read workbook: {}", path.display()))?;
        Self::from_json_str(&data).with_context(|| format!("load workbook: {}", path.display()))
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}
