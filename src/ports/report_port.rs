//! Per-cycle report port trait.

use crate::domain::decision_loop::CycleReport;

/// Presentation sink invoked once per completed cycle.
pub trait ReportPort {
    fn report(&mut self, report: &CycleReport);
}
