//! Run report types and helpers.

mod report;

pub use report::MigrationReport;
