//! Absence limit arithmetic.
//!
//! A student may miss at most 15% of a module's total hours (truncated). Every
//! recorded absence counts as one hour.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{AbsenceMap, ModuleDto};

/// Share of the total hours that may be missed.
pub const ALLOWED_ABSENCE_RATIO: f64 = 0.15;

/// Percentage from which a module is flagged as at risk.
pub const AT_RISK_PERCENTAGE: f64 = 80.0;

/// Maximum number of absences allowed for a module, `trunc(hours * 0.15)`.
pub fn max_allowed_absences(total_hours: u32) -> u32 {
    (f64::from(total_hours) * ALLOWED_ABSENCE_RATIO).trunc() as u32
}

/// Percentage of the allowance already used, capped at 100. Zero when nothing may be missed.
pub fn percentage_used(total_hours: u32, absences: u32) -> f64 {
    let max = max_allowed_absences(total_hours);
    if max == 0 {
        return 0.0;
    }
    (f64::from(absences) / f64::from(max) * 100.0).min(100.0)
}

/// Absences still available before the limit is reached.
pub fn remaining_absences(total_hours: u32, absences: u32) -> u32 {
    max_allowed_absences(total_hours).saturating_sub(absences)
}

/// Classification of a module by the share of its allowance already used.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AbsenceStatus {
    Ok,
    AtRisk,
    LimitReached,
}

impl AbsenceStatus {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 100.0 {
            AbsenceStatus::LimitReached
        } else if percentage >= AT_RISK_PERCENTAGE {
            AbsenceStatus::AtRisk
        } else {
            AbsenceStatus::Ok
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            AbsenceStatus::Ok => "ok",
            AbsenceStatus::AtRisk => "at risk",
            AbsenceStatus::LimitReached => "limit reached",
        }
    }
}

/// Limit report of a single module.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleAbsenceReport {
    pub module_id: i32,
    pub name: String,
    pub total_hours: u32,
    pub absences: u32,
    pub max_allowed: u32,
    pub remaining: u32,
    pub percentage_used: f64,
    pub status: AbsenceStatus,
}

impl ModuleAbsenceReport {
    pub fn new(module: &ModuleDto, absences: u32) -> Self {
        let percentage = percentage_used(module.total_hours, absences);
        Self {
            module_id: module.id,
            name: module.name.clone(),
            total_hours: module.total_hours,
            absences,
            max_allowed: max_allowed_absences(module.total_hours),
            remaining: remaining_absences(module.total_hours, absences),
            percentage_used: percentage,
            status: AbsenceStatus::from_percentage(percentage),
        }
    }
}

/// Limit reports of every module of a course plus course-wide totals.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseAbsenceSummary {
    pub modules: Vec<ModuleAbsenceReport>,
    pub total_hours: u32,
    pub total_absences: u32,
    pub total_allowed: u32,
    /// Total absences over total allowed absences, not capped.
    pub overall_percentage: f64,
    pub modules_ok: usize,
    pub modules_at_risk: usize,
    pub modules_limit_reached: usize,
}

/// Builds the summary of `modules` from the user's absence mapping.
pub fn summarize(modules: &[ModuleDto], absences: &AbsenceMap) -> CourseAbsenceSummary {
    let reports: Vec<ModuleAbsenceReport> = modules
        .iter()
        .map(|module| ModuleAbsenceReport::new(module, absences.get(&module.id).copied().unwrap_or(0)))
        .collect();

    let total_hours = reports.iter().map(|r| r.total_hours).sum();
    let total_absences: u32 = reports.iter().map(|r| r.absences).sum();
    let total_allowed: u32 = reports.iter().map(|r| r.max_allowed).sum();
    let overall_percentage = if total_allowed > 0 {
        f64::from(total_absences) * 100.0 / f64::from(total_allowed)
    } else {
        0.0
    };
    let count = |status: AbsenceStatus| reports.iter().filter(|r| r.status == status).count();

    CourseAbsenceSummary {
        modules_ok: count(AbsenceStatus::Ok),
        modules_at_risk: count(AbsenceStatus::AtRisk),
        modules_limit_reached: count(AbsenceStatus::LimitReached),
        modules: reports,
        total_hours,
        total_absences,
        total_allowed,
        overall_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(id: i32, total_hours: u32) -> ModuleDto {
        ModuleDto {
            id,
            course_id: 1,
            module_code: format!("{id:04}"),
            name: format!("Module {id}"),
            total_hours,
            weekly_hours: total_hours / 33,
            color: None,
        }
    }

    #[test]
    fn test_max_allowed_truncates() {
        assert_eq!(max_allowed_absences(200), 30);
        assert_eq!(max_allowed_absences(167), 25);
        assert_eq!(max_allowed_absences(67), 10);
        assert_eq!(max_allowed_absences(33), 4);
        assert_eq!(max_allowed_absences(6), 0);
    }

    #[test]
    fn test_two_hundred_hour_module_limit_scenario() {
        let at_limit = percentage_used(200, 30);
        assert_eq!(at_limit, 100.0);
        assert_eq!(AbsenceStatus::from_percentage(at_limit), AbsenceStatus::LimitReached);
        assert_eq!(AbsenceStatus::LimitReached.label(), "limit reached");

        let after_remove = percentage_used(200, 29);
        assert!((after_remove - 96.666).abs() < 0.01);
        assert_eq!(AbsenceStatus::from_percentage(after_remove), AbsenceStatus::AtRisk);
        assert_eq!(remaining_absences(200, 29), 1);
    }

    #[test]
    fn test_percentage_is_capped_and_safe_for_tiny_modules() {
        assert_eq!(percentage_used(200, 45), 100.0);
        assert_eq!(remaining_absences(200, 45), 0);
        assert_eq!(percentage_used(6, 3), 0.0);
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(AbsenceStatus::from_percentage(0.0), AbsenceStatus::Ok);
        assert_eq!(AbsenceStatus::from_percentage(79.9), AbsenceStatus::Ok);
        assert_eq!(AbsenceStatus::from_percentage(80.0), AbsenceStatus::AtRisk);
        assert_eq!(AbsenceStatus::from_percentage(100.0), AbsenceStatus::LimitReached);
    }

    #[test]
    fn test_summarize_course() {
        let modules = vec![module(1, 200), module(2, 100), module(3, 67)];
        let absences = AbsenceMap::from([(1, 30), (2, 12), (99, 4)]);

        let summary = summarize(&modules, &absences);

        assert_eq!(summary.modules.len(), 3);
        assert_eq!(summary.total_hours, 367);
        // Module 99 is not part of the course and is ignored
        assert_eq!(summary.total_absences, 42);
        assert_eq!(summary.total_allowed, 30 + 15 + 10);
        assert_eq!(summary.modules_limit_reached, 1);
        assert_eq!(summary.modules_at_risk, 1);
        assert_eq!(summary.modules_ok, 1);
        assert_eq!(summary.modules[2].absences, 0);
        assert!((summary.overall_percentage - 42.0 * 100.0 / 55.0).abs() < 1e-9);
    }
}
