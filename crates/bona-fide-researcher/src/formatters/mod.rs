//! Output formatting for verification reports.

pub mod json;
pub mod text;

pub use json::compact_report;
pub use text::format_report_text;
