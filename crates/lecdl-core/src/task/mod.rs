//! Task generation: sheets of rows to an ordered list of download tasks.

mod generator;
mod row;
mod schema;

pub use generator::{CarryForward, DownloadTask, TaskGenerator};
pub use row::{Cell, Row, Sheet, Workbook};
pub use schema::{SchemaError, SheetSchema, UrlColumn};

pub use crate::naming::{ColumnRole, SheetLayout};
