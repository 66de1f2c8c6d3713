//! Report output port trait.

use crate::domain::analytics::AnalyticsReport;
use crate::domain::error::LedgerError;

/// Port for presenting analytics results.
pub trait ReportPort {
    fn write(&self, report: &AnalyticsReport) -> Result<(), LedgerError>;
}
