//! Rows to download tasks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::LecdlConfig;
use crate::naming::{self, SheetLayout, StemFields};
use crate::state_store::{DownloadIdentity, Provenance};
use crate::url_model::{classify_url, UrlType};

use super::row::{Cell, Row, Sheet, Workbook};
use super::schema::{SchemaError, SheetSchema};

/// One (row, URL column) pair ready for the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub identity: DownloadIdentity,
    pub provenance: Provenance,
    pub url_type: UrlType,
}

impl DownloadTask {
    pub fn url(&self) -> &str {
        &self.identity.url
    }

    /// Extension-less target stem.
    pub fn target(&self) -> &Path {
        &self.identity.target_file_path
    }
}

/// Forward-only fill of sticky columns within one sheet.
///
/// An empty cell takes the last non-empty value seen in an earlier row; with
/// no earlier value it stays empty.
#[derive(Debug, Clone, Default)]
pub struct CarryForward {
    columns: Vec<String>,
    last: HashMap<String, String>,
}

impl CarryForward {
    pub fn new(columns: &[String]) -> Self {
        Self {
            columns: columns.to_vec(),
            last: HashMap::new(),
        }
    }

    /// Returns `row` with carry-forward columns filled, and remembers its
    /// non-empty values for the rows that follow.
    pub fn apply(&mut self, row: &Row) -> Row {
        let mut resolved = row.clone();
        for column in &self.columns {
            let cell = row.get(column);
            if cell.is_blank() {
                if let Some(prev) = self.last.get(column) {
                    resolved.set(column.clone(), Cell::Text(prev.clone()));
                }
            } else if let Some(value) = cell.as_str() {
                self.last.insert(column.clone(), value.to_string());
            }
        }
        resolved
    }
}

fn is_placeholder(cell: &Cell) -> bool {
    match cell.as_str() {
        None => true,
        Some(s) => {
            let s = s.trim();
            s.is_empty() || s == "-"
        }
    }
}

/// Turns workbook rows into the ordered task list.
#[derive(Debug, Clone)]
pub struct TaskGenerator {
    download_dir: PathBuf,
    max_filename_len: usize,
    chapter_sheets: Vec<String>,
    custom: HashMap<String, SheetSchema>,
}

impl TaskGenerator {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            max_filename_len: naming::DEFAULT_MAX_LEN,
            chapter_sheets: vec!["コンテンツ".to_string()],
            custom: HashMap::new(),
        }
    }

    pub fn from_config(cfg: &LecdlConfig) -> Self {
        Self::new(&cfg.download_dir)
            .max_filename_len(cfg.max_filename_len)
            .chapter_sheets(cfg.chapter_sheets.clone())
    }

    pub fn max_filename_len(mut self, len: usize) -> Self {
        self.max_filename_len = len;
        self
    }

    pub fn chapter_sheets(mut self, sheets: Vec<String>) -> Self {
        self.chapter_sheets = sheets;
        self
    }

    /// Uses `schema` for `sheet` instead of the layout default. Explicit
    /// schemas are validated strictly.
    pub fn with_schema(mut self, sheet: impl Into<String>, schema: SheetSchema) -> Self {
        self.custom.insert(sheet.into(), schema);
        self
    }

    pub fn schema_for(&self, sheet: &str) -> SheetSchema {
        if let Some(schema) = self.custom.get(sheet) {
            return schema.clone();
        }
        let layout = if self.chapter_sheets.iter().any(|s| s == sheet) {
            SheetLayout::Chapter
        } else {
            SheetLayout::Calendar
        };
        SheetSchema::for_layout(layout)
    }

    /// Tasks for one sheet in row order, then URL-column order.
    pub fn generate_sheet(&self, sheet: &Sheet) -> Result<Vec<DownloadTask>, SchemaError> {
        let schema = self.schema_for(&sheet.name);
        schema.validate(sheet)?;
        Ok(self.generate_with(&schema, sheet))
    }

    fn generate_with(&self, schema: &SheetSchema, sheet: &Sheet) -> Vec<DownloadTask> {
        let mut carry = CarryForward::new(&schema.carry_forward);
        let mut tasks = Vec::new();
        let text = |row: &Row, col: &Option<String>| -> String {
            col.as_deref()
                .map(|c| row.text(c).trim().to_string())
                .unwrap_or_default()
        };

        for (row_index, raw) in sheet.rows.iter().enumerate() {
            let row = carry.apply(raw);
            let title = row.text(&schema.title_column).trim().to_string();
            let mode = text(&row, &schema.mode_column);
            let year = text(&row, &schema.year_column);
            let date = text(&row, &schema.date_column);
            let fields = StemFields {
                row_index,
                title: &title,
                mode: &mode,
                year: &year,
                date: &date,
            };

            for column in &schema.url_columns {
                let cell = row.get(&column.name);
                if is_placeholder(cell) {
                    continue;
                }
                let url = cell.as_str().unwrap_or_default().trim().to_string();
                let url_type = classify_url(&url);
                if url_type == UrlType::Unknown {
                    tracing::warn!(
                        sheet = %sheet.name,
                        row = row_index,
                        url = %url,
                        "unrecognized URL type; passing to fetcher as unknown"
                    );
                }
                let relative = naming::generate_path(
                    &sheet.name,
                    schema.layout,
                    &fields,
                    column.role,
                    self.max_filename_len,
                );
                tasks.push(DownloadTask {
                    identity: DownloadIdentity::new(url, self.download_dir.join(relative)),
                    provenance: Provenance {
                        sheet: sheet.name.clone(),
                        row_index,
                        column_role: column.role,
                    },
                    url_type,
                });
            }
        }
        tasks
    }

    /// Tasks for every sheet (or only `only`, when non-empty), in workbook order.
    ///
    /// A sheet without any URL column of its default schema is not a lecture
    /// sheet and is skipped with a warning. Other schema errors are fatal.
    pub fn generate(
        &self,
        workbook: &Workbook,
        only: &[String],
    ) -> Result<Vec<DownloadTask>, SchemaError> {
        for name in only {
            if workbook.sheet(name).is_none() {
                tracing::warn!(sheet = %name, "requested sheet not found in workbook");
            }
        }
        let mut tasks = Vec::new();
        for sheet in &workbook.sheets {
            if !only.is_empty() && !only.contains(&sheet.name) {
                continue;
            }
            match self.generate_sheet(sheet) {
                Ok(mut t) => {
                    tracing::debug!(sheet = %sheet.name, tasks = t.len(), "generated tasks");
                    tasks.append(&mut t);
                }
                Err(SchemaError::NoUrlColumns { .. }) if !self.custom.contains_key(&sheet.name) => {
                    tracing::warn!(sheet = %sheet.name, "no URL columns; skipping sheet");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(tasks)
    }
}
