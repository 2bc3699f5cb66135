use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default number of curriculum units when the form leaves it blank.
pub const DEFAULT_UNIT_COUNT: u32 = 20;

/// Exam stage the student is preparing for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
  Infantil,
  Primaria,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentType {
  New,
  Repeat,
}

/// Everything the student tells us once, immutable for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormInputs {
  pub exam_date: NaiveDate,

  /// Weekly availability in hours, index 0 = Monday .. 6 = Sunday.
  /// Fractional hours are fine; converted to minutes once per day.
  pub availability_hours: [f64; 7],

  pub presented_before: bool,
  pub already_studying: bool,

  pub region: String,
  pub stage: Stage,

  /// 15, 20 or 25 curriculum units. Defaults to 20.
  #[serde(default)]
  pub theme_count: Option<u32>,

  /// Whether the didactic programming stream is planned at all.
  #[serde(default)]
  pub plan_programming: Option<bool>,

  #[serde(default)]
  pub student_type: Option<StudentType>,
}

impl FormInputs {
  pub fn units_count(&self) -> u32 {
    self.theme_count.unwrap_or(DEFAULT_UNIT_COUNT)
  }

  pub fn plan_programming(&self) -> bool {
    self.plan_programming.unwrap_or(true)
  }
}

/// Engine options. `today` pins the reference day for deterministic runs;
/// when absent the local calendar date is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanOptions {
  #[serde(default)]
  pub today: Option<NaiveDate>,
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
