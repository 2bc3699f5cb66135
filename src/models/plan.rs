use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::capacity::PlanCapacity;
use crate::models::activity::{Activity, BlockFormat, BlockType, Phase, Stream};
use crate::models::inputs::Stage;

/// ---------------------------------------------------------------------------
/// Blocks and days
/// ---------------------------------------------------------------------------

/// One scheduled study block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyBlock {
  /// `"{date}__{index}__{activity}__{unit|NA}"`, unique across the plan.
  pub id: String,
  pub activity: Activity,
  /// "Unidad k" for theory, "Programación" for programming, absent for cases.
  pub unit: Option<String>,
  pub duration_minutes: i64,
  pub phase: Phase,
  #[serde(rename = "type")]
  pub block_type: BlockType,
  pub format: BlockFormat,
}

impl StudyBlock {
  pub fn new(
    date: NaiveDate,
    index_in_day: usize,
    activity: Activity,
    unit: Option<String>,
    duration_minutes: i64,
  ) -> Self {
    let id = format!(
      "{}__{}__{}__{}",
      date.format("%Y-%m-%d"),
      index_in_day,
      activity.as_str(),
      unit.as_deref().unwrap_or("NA"),
    );
    Self {
      id,
      activity,
      unit,
      duration_minutes,
      phase: activity.phase(),
      block_type: activity.block_type(),
      format: activity.format(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
  pub date: NaiveDate,
  /// 0 = Sunday .. 6 = Saturday.
  pub weekday: u32,
  pub total_hours: f64,
  pub blocks: Vec<StudyBlock>,
}

impl DayPlan {
  pub fn total_minutes(&self) -> i64 {
    self.blocks.iter().map(|b| b.duration_minutes).sum()
  }
}

/// ---------------------------------------------------------------------------
/// Weekly roll-ups
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMinutes {
  pub p1_context: i64,
  pub p2_depth: i64,
  pub p3_eval_review: i64,
  pub p4_practice: i64,
}

impl PhaseMinutes {
  pub fn add(&mut self, phase: Phase, minutes: i64) {
    match phase {
      Phase::P1Context => self.p1_context += minutes,
      Phase::P2Depth => self.p2_depth += minutes,
      Phase::P3EvalReview => self.p3_eval_review += minutes,
      Phase::P4Practice => self.p4_practice += minutes,
    }
  }

  pub fn total(&self) -> i64 {
    self.p1_context + self.p2_depth + self.p3_eval_review + self.p4_practice
  }
}

/// Calendar-week roll-up, Monday-anchored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
  pub week_start: NaiveDate,
  pub total_hours: f64,
  pub minutes_per_phase: PhaseMinutes,
}

/// ---------------------------------------------------------------------------
/// Plan
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDefinition {
  pub phase: Phase,
  pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMeta {
  pub generated_at: DateTime<Utc>,
  pub today: NaiveDate,
  pub exam_date: NaiveDate,
  pub region: String,
  pub stage: Stage,
  pub total_units: u32,
}

/// Scheduling-week actuals kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyActual {
  pub week_index: i64,
  pub theory_minutes: i64,
  pub cases_minutes: i64,
  pub programming_minutes: i64,
  /// Streams under the weekly floor while work remained.
  pub missing_streams: Vec<Stream>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDebug {
  pub capacity: PlanCapacity,
  pub theory_scheduled: i64,
  pub cases_scheduled: i64,
  pub programming_scheduled: i64,
  pub total_scheduled: i64,
  pub weekly_actuals: Vec<WeeklyActual>,
  pub cases_starved_weeks: i64,
  pub programming_starved_weeks: i64,
}

/// The full generated plan. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
  pub meta: PlanMeta,
  pub phases: Vec<PhaseDefinition>,
  pub days: Vec<DayPlan>,
  pub weekly_summaries: Vec<WeekSummary>,
  /// Prose for the result views; populated by UI collaborators, not here.
  pub explanations: Vec<String>,
  pub debug: Option<PlanDebug>,
}

impl Plan {
  /// Pretty JSON for the result views.
  pub fn to_json(&self) -> String {
    serde_json::to_string_pretty(self).unwrap_or_default()
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
