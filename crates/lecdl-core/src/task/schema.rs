//! Per-sheet column schemas.

use thiserror::Error;

use crate::naming::{ColumnRole, SheetLayout};

use super::row::Sheet;

/// A URL-bearing column and the role it plays in the stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlColumn {
    pub name: String,
    pub role: ColumnRole,
}

/// Which columns of a sheet feed the filename policy and which hold URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSchema {
    pub layout: SheetLayout,
    pub title_column: String,
    pub mode_column: Option<String>,
    pub year_column: Option<String>,
    pub date_column: Option<String>,
    /// URL columns in the order tasks are emitted per row.
    pub url_columns: Vec<UrlColumn>,
    /// Columns whose last non-empty value fills later empty cells.
    pub carry_forward: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("sheet {sheet:?} has no column {column:?}")]
    MissingColumn { sheet: String, column: String },

    #[error("sheet {sheet:?} has none of the URL columns {expected:?}")]
    NoUrlColumns { sheet: String, expected: Vec<String> },

    #[error("column role {role} is assigned to more than one column")]
    DuplicateRole { role: ColumnRole },
}

impl SheetSchema {
    /// Empty schema; add columns with the builder methods.
    pub fn new(layout: SheetLayout, title_column: impl Into<String>) -> Self {
        Self {
            layout,
            title_column: title_column.into(),
            mode_column: None,
            year_column: None,
            date_column: None,
            url_columns: Vec::new(),
            carry_forward: Vec::new(),
        }
    }

    /// Lecture calendar sheets: one row per session.
    pub fn calendar() -> Self {
        Self::new(SheetLayout::Calendar, "講義タイトル")
            .mode_column("開催種別")
            .year_column("実施年")
            .date_column("実施日")
            .url_column("録画（動画視聴リンク）", ColumnRole::ViewLink)
            .url_column("録画（動画DLリンク）", ColumnRole::DownloadLink)
            .url_column("資料1", ColumnRole::Document(1))
            .url_column("資料2", ColumnRole::Document(2))
            .url_column("資料3", ColumnRole::Document(3))
            .url_column("資料4", ColumnRole::Document(4))
            .carry_forward("実施年")
            .carry_forward("実施日")
    }

    /// Self-paced content sheets with chapter-numbered titles.
    pub fn chapter() -> Self {
        Self::new(SheetLayout::Chapter, "コンテンツタイトル")
            .url_column("動画リンク", ColumnRole::ViewLink)
            .url_column("動画DLリンク", ColumnRole::DownloadLink)
            .url_column("資料1", ColumnRole::Document(1))
            .url_column("資料2", ColumnRole::Document(2))
    }

    /// Default schema for a layout.
    pub fn for_layout(layout: SheetLayout) -> Self {
        match layout {
            SheetLayout::Calendar => Self::calendar(),
            SheetLayout::Chapter => Self::chapter(),
        }
    }

    pub fn mode_column(mut self, name: impl Into<String>) -> Self {
        self.mode_column = Some(name.into());
        self
    }

    pub fn year_column(mut self, name: impl Into<String>) -> Self {
        self.year_column = Some(name.into());
        self
    }

    pub fn date_column(mut self, name: impl Into<String>) -> Self {
        self.date_column = Some(name.into());
        self
    }

    pub fn url_column(mut self, name: impl Into<String>, role: ColumnRole) -> Self {
        self.url_columns.push(UrlColumn {
            name: name.into(),
            role,
        });
        self
    }

    pub fn carry_forward(mut self, name: impl Into<String>) -> Self {
        self.carry_forward.push(name.into());
        self
    }

    /// Checks the schema against a sheet's header.
    ///
    /// The title column must exist and at least one URL column must be
    /// present. URL columns missing from the sheet are simply not read.
    pub fn validate(&self, sheet: &Sheet) -> Result<(), SchemaError> {
        for (i, col) in self.url_columns.iter().enumerate() {
            if self.url_columns[..i].iter().any(|c| c.role == col.role) {
                return Err(SchemaError::DuplicateRole { role: col.role });
            }
        }
        if !self.url_columns.iter().any(|c| sheet.has_column(&c.name)) {
            return Err(SchemaError::NoUrlColumns {
                sheet: sheet.name.clone(),
                expected: self.url_columns.iter().map(|c| c.name.clone()).collect(),
            });
        }
        if !sheet.has_column(&self.title_column) {
            return Err(SchemaError::MissingColumn {
                sheet: sheet.name.clone(),
                column: self.title_column.clone(),
            });
        }
        Ok(())
    }
}
