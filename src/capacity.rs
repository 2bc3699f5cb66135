//! Capacity model
//!
//! Maps calendar availability to planable minutes. Pure function of the form
//! inputs and a reference day; the final two weeks before the exam are held
//! back as reserve and receive no blocks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{add_days, diff_days, weekday_index_monday};
use crate::models::inputs::{FormInputs, PlanOptions};

/// Weeks before the exam kept free of scheduled work.
pub const RESERVE_WEEKS: i64 = 2;

/// Required theory minutes for one curriculum unit (study + secondaries).
pub const THEORY_ENVELOPE_MINUTES: i64 = 510;

/// Planned cases minutes as a share of planned theory minutes.
pub const CASES_SHARE_OF_THEORY: f64 = 0.6;

/// Planned programming minutes as a share of planned theory minutes.
pub const PROGRAMMING_SHARE_OF_THEORY: f64 = 0.4;

const BUFFER_GOOD_RATIO: f64 = 0.20;
const BUFFER_EDGE_RATIO: f64 = 0.10;

/// ---------------------------------------------------------------------------
/// Buffer status
/// ---------------------------------------------------------------------------

/// Three-tier headroom indicator shared by capacity and slack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferStatus {
  Good,
  Edge,
  Warning,
}

impl BufferStatus {
  pub fn from_ratio(ratio: f64) -> Self {
    if ratio >= BUFFER_GOOD_RATIO {
      BufferStatus::Good
    } else if ratio >= BUFFER_EDGE_RATIO {
      BufferStatus::Edge
    } else {
      BufferStatus::Warning
    }
  }
}

/// ---------------------------------------------------------------------------
/// Plan capacity
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCapacity {
  pub today: NaiveDate,
  pub exam_date: NaiveDate,

  pub days_until_exam: i64,
  pub total_weeks: i64,
  pub effective_planning_weeks: i64,

  /// Planable minutes inside the effective window, summed per day from the
  /// weekday availability pattern (hours rounded to minutes once per day).
  pub available_effective_minutes: i64,

  pub units_count: u32,
  pub theory_planned: i64,
  pub cases_planned: i64,
  pub programming_planned: i64,
  pub planned_minutes: i64,

  pub buffer_minutes: i64,
  pub buffer_ratio: f64,
  pub buffer_status: BufferStatus,
}

/// Availability for one calendar day, in whole minutes. Negative or non-finite
/// entries are treated as zero.
pub(crate) fn day_minutes(inputs: &FormInputs, date: NaiveDate) -> i64 {
  let hours = inputs.availability_hours[weekday_index_monday(date)];
  if !hours.is_finite() || hours <= 0.0 {
    return 0;
  }
  (hours * 60.0).round() as i64
}

/// Derive the plan capacity for `(inputs, today)`.
pub fn calculate_capacity(inputs: &FormInputs, options: &PlanOptions) -> PlanCapacity {
  let today = crate::resolve_today(options);
  calculate_capacity_for(inputs, today)
}

pub(crate) fn calculate_capacity_for(inputs: &FormInputs, today: NaiveDate) -> PlanCapacity {
  let days_until_exam = diff_days(today, inputs.exam_date).max(0);
  let total_weeks = (days_until_exam + 6) / 7;
  let effective_planning_weeks = (total_weeks - RESERVE_WEEKS).max(0);

  let mut available_effective_minutes = 0;
  for d in 0..effective_planning_weeks * 7 {
    available_effective_minutes += day_minutes(inputs, add_days(today, d));
  }

  let units_count = inputs.units_count();
  let theory_planned = units_count as i64 * THEORY_ENVELOPE_MINUTES;
  let cases_planned = (CASES_SHARE_OF_THEORY * theory_planned as f64).floor() as i64;
  let programming_planned = if inputs.plan_programming() {
    (PROGRAMMING_SHARE_OF_THEORY * theory_planned as f64).floor() as i64
  } else {
    0
  };
  let planned_minutes = theory_planned + cases_planned + programming_planned;

  let buffer_minutes = available_effective_minutes - planned_minutes;
  let buffer_ratio = if available_effective_minutes > 0 {
    buffer_minutes as f64 / available_effective_minutes as f64
  } else {
    0.0
  };

  PlanCapacity {
    today,
    exam_date: inputs.exam_date,
    days_until_exam,
    total_weeks,
    effective_planning_weeks,
    available_effective_minutes,
    units_count,
    theory_planned,
    cases_planned,
    programming_planned,
    planned_minutes,
    buffer_minutes,
    buffer_ratio,
    buffer_status: BufferStatus::from_ratio(buffer_ratio),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
