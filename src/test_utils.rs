//! Test utilities and helpers
//!
//! Mock data factories and plan scanners shared by the unit tests.

use chrono::NaiveDate;

use crate::allocator::GlobalBudget;
use crate::capacity::calculate_capacity_for;
use crate::generator::generate_plan;
use crate::models::activity::Activity;
use crate::models::inputs::{FormInputs, PlanOptions, Stage};
use crate::models::plan::Plan;
use crate::state::{derive_initial_state, StudentState};

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Parse a test date literal.
pub fn date(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// Options pinned to a fixed reference day.
pub fn options_for(today: &str) -> PlanOptions {
  PlanOptions { today: Some(date(today)) }
}

/// Baseline form inputs: Madrid, Primaria, exam on 2026-03-12, four weekday
/// hours, free weekends.
pub fn mock_inputs() -> FormInputs {
  FormInputs {
    exam_date: date("2026-03-12"),
    availability_hours: [4.0, 4.0, 4.0, 4.0, 4.0, 0.0, 0.0],
    presented_before: false,
    already_studying: false,
    region: "Madrid".to_string(),
    stage: Stage::Primaria,
    theme_count: None,
    plan_programming: None,
    student_type: None,
  }
}

/// Fresh student state for the baseline inputs as of 2026-01-01.
pub fn mock_state() -> StudentState {
  let inputs = mock_inputs();
  let capacity = calculate_capacity_for(&inputs, date("2026-01-01"));
  derive_initial_state(&inputs, &capacity, date("2026-01-01"))
}

/// Untouched scheduling budget for the baseline state.
pub fn mock_budget() -> GlobalBudget {
  let inputs = mock_inputs();
  let capacity = calculate_capacity_for(&inputs, date("2026-01-01"));
  GlobalBudget::new(&mock_state(), &capacity)
}

/// The baseline plan most scenario tests start from.
pub fn baseline_plan() -> Plan {
  generate_plan(&mock_inputs(), &options_for("2026-01-01"))
}

/// ---------------------------------------------------------------------------
/// Plan Scanners
/// ---------------------------------------------------------------------------

/// Total minutes scheduled for `activity` on `unit` across the plan.
pub fn unit_minutes_by_activity(plan: &Plan, unit: &str, activity: Activity) -> i64 {
  plan
    .days
    .iter()
    .flat_map(|d| &d.blocks)
    .filter(|b| b.activity == activity && b.unit.as_deref() == Some(unit))
    .map(|b| b.duration_minutes)
    .sum()
}

/// Total STUDY_THEME minutes scheduled for `unit`.
pub fn study_theme_minutes_for_unit(plan: &Plan, unit: &str) -> i64 {
  unit_minutes_by_activity(plan, unit, Activity::StudyTheme)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats agree within a tolerance.
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "{} and {} differ by {} (tolerance {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mock_factories_create_valid_data() {
    let inputs = mock_inputs();
    assert_eq!(inputs.units_count(), 20);
    assert_eq!(inputs.stage, Stage::Primaria);

    let state = mock_state();
    assert_eq!(state.units.len(), 20);
    assert_eq!(state.meta.today, date("2026-01-01"));

    let budget = mock_budget();
    assert_eq!(budget.theory_remaining, 20 * 510);
    assert_approx_eq!(budget.cases_remaining as f64, 6120.0, 0.5);
  }

  #[test]
  fn test_scanners_sum_matching_blocks() {
    let plan = baseline_plan();
    let study = study_theme_minutes_for_unit(&plan, "Unidad 1");
    assert!(study > 0);
    assert_eq!(study, unit_minutes_by_activity(&plan, "Unidad 1", Activity::StudyTheme));
    assert_eq!(unit_minutes_by_activity(&plan, "Unidad 99", Activity::StudyTheme), 0);
  }
}
