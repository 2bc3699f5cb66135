//! Student state
//!
//! Minute ledgers per curriculum unit and per stream, block-duration
//! preferences, and the slack summary. Derived once from capacity and then
//! only transformed by feedback events.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::capacity::{BufferStatus, PlanCapacity};
use crate::models::activity::Activity;
use crate::models::inputs::FormInputs;

/// Required STUDY_THEME minutes per unit.
pub const STUDY_THEME_MINUTES: i64 = 240;
/// Required REVIEW minutes per unit.
pub const REVIEW_MINUTES: i64 = 60;
/// Required PODCAST minutes per unit.
pub const PODCAST_MINUTES: i64 = 60;
/// Required FLASHCARD minutes per unit.
pub const FLASHCARD_MINUTES: i64 = 60;
/// Required QUIZ minutes per unit.
pub const QUIZ_MINUTES: i64 = 90;

/// ---------------------------------------------------------------------------
/// Ledgers
/// ---------------------------------------------------------------------------

/// Minutes per theory activity for one unit. Used both as the required
/// envelope and as the done counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityMinutes {
  pub study_theme: i64,
  pub review: i64,
  pub podcast: i64,
  pub flashcard: i64,
  pub quiz: i64,
}

impl ActivityMinutes {
  pub fn zero() -> Self {
    Self { study_theme: 0, review: 0, podcast: 0, flashcard: 0, quiz: 0 }
  }

  pub fn required_defaults() -> Self {
    Self {
      study_theme: STUDY_THEME_MINUTES,
      review: REVIEW_MINUTES,
      podcast: PODCAST_MINUTES,
      flashcard: FLASHCARD_MINUTES,
      quiz: QUIZ_MINUTES,
    }
  }

  pub fn total(&self) -> i64 {
    self.study_theme + self.review + self.podcast + self.flashcard + self.quiz
  }

  /// Minutes for a theory activity. Panics on a non-theory tag; callers route
  /// cases and programming through the global ledger instead.
  pub fn get(&self, activity: Activity) -> i64 {
    match activity {
      Activity::StudyTheme => self.study_theme,
      Activity::Review => self.review,
      Activity::Podcast => self.podcast,
      Activity::Flashcard => self.flashcard,
      Activity::Quiz => self.quiz,
      other => panic!("{} is not a theory activity", other.as_str()),
    }
  }

  pub fn get_mut(&mut self, activity: Activity) -> &mut i64 {
    match activity {
      Activity::StudyTheme => &mut self.study_theme,
      Activity::Review => &mut self.review,
      Activity::Podcast => &mut self.podcast,
      Activity::Flashcard => &mut self.flashcard,
      Activity::Quiz => &mut self.quiz,
      other => panic!("{} is not a theory activity", other.as_str()),
    }
  }
}

/// Required/done ledger for one curriculum unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitLedger {
  /// "Unidad 1" .. "Unidad N".
  pub unit: String,
  pub required: ActivityMinutes,
  pub done: ActivityMinutes,
}

impl UnitLedger {
  pub fn new(index: u32) -> Self {
    Self {
      unit: unit_key(index),
      required: ActivityMinutes::required_defaults(),
      done: ActivityMinutes::zero(),
    }
  }
}

/// The canonical key for unit `index` (1-based).
pub fn unit_key(index: u32) -> String {
  format!("Unidad {}", index)
}

/// Cases and programming live outside the units: one global ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalLedger {
  pub cases_required: i64,
  pub cases_done: i64,
  pub programming_required: i64,
  pub programming_done: i64,
}

/// ---------------------------------------------------------------------------
/// Block preferences
/// ---------------------------------------------------------------------------

/// Target block duration per activity, in minutes. Session feedback nudges
/// these in 15-minute steps, clamped into per-activity bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPreferences {
  pub study_theme: i64,
  pub review: i64,
  pub podcast: i64,
  pub flashcard: i64,
  pub quiz: i64,
  pub case_practice: i64,
  pub case_mock: i64,
  pub programming_block: i64,
}

impl Default for BlockPreferences {
  fn default() -> Self {
    Self {
      study_theme: 60,
      review: 30,
      podcast: 60,
      flashcard: 30,
      quiz: 15,
      case_practice: 60,
      case_mock: 60,
      programming_block: 60,
    }
  }
}

impl BlockPreferences {
  pub fn get(&self, activity: Activity) -> i64 {
    match activity {
      Activity::StudyTheme => self.study_theme,
      Activity::Review => self.review,
      Activity::Podcast => self.podcast,
      Activity::Flashcard => self.flashcard,
      Activity::Quiz => self.quiz,
      Activity::CasePractice => self.case_practice,
      Activity::CaseMock => self.case_mock,
      Activity::ProgrammingBlock => self.programming_block,
    }
  }

  /// Allowed range for an activity's target duration.
  pub fn bounds(activity: Activity) -> (i64, i64) {
    match activity {
      Activity::StudyTheme => (30, 90),
      Activity::Review => (15, 60),
      Activity::Podcast => (30, 90),
      Activity::Flashcard => (15, 60),
      Activity::Quiz => (15, 45),
      Activity::CasePractice => (30, 90),
      Activity::CaseMock => (30, 90),
      Activity::ProgrammingBlock => (30, 90),
    }
  }

  /// Set an activity's target, clamped into its bounds.
  pub fn set_clamped(&mut self, activity: Activity, minutes: i64) {
    let (lo, hi) = Self::bounds(activity);
    let clamped = minutes.clamp(lo, hi);
    match activity {
      Activity::StudyTheme => self.study_theme = clamped,
      Activity::Review => self.review = clamped,
      Activity::Podcast => self.podcast = clamped,
      Activity::Flashcard => self.flashcard = clamped,
      Activity::Quiz => self.quiz = clamped,
      Activity::CasePractice => self.case_practice = clamped,
      Activity::CaseMock => self.case_mock = clamped,
      Activity::ProgrammingBlock => self.programming_block = clamped,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Slack
/// ---------------------------------------------------------------------------

/// Planable capacity against remaining required workload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlackInfo {
  pub effective_capacity_future: i64,
  pub required_minutes_future: i64,
  pub slack_minutes: i64,
  pub slack_ratio: f64,
  pub status: BufferStatus,
}

/// Recompute slack for the given ledgers against a fixed future capacity.
pub fn compute_slack(
  units: &[UnitLedger],
  global: &GlobalLedger,
  effective_capacity_future: i64,
) -> SlackInfo {
  let mut required = 0;
  let mut done = 0;
  for ledger in units {
    required += ledger.required.total();
    done += ledger.done.total();
  }
  required += global.cases_required + global.programming_required;
  done += global.cases_done + global.programming_done;

  let required_minutes_future = (required - done).max(0);
  let slack_minutes = effective_capacity_future - required_minutes_future;
  let slack_ratio = if effective_capacity_future > 0 {
    slack_minutes as f64 / effective_capacity_future as f64
  } else {
    0.0
  };

  SlackInfo {
    effective_capacity_future,
    required_minutes_future,
    slack_minutes,
    slack_ratio,
    status: BufferStatus::from_ratio(slack_ratio),
  }
}

/// ---------------------------------------------------------------------------
/// Student state
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMeta {
  pub version: u32,
  pub created_at: DateTime<Utc>,
  pub today: NaiveDate,
  pub exam_date: NaiveDate,
}

/// The full student ledger bundle. Treated as a value: feedback application
/// returns a new state, never mutates a shared one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentState {
  pub meta: StateMeta,
  pub units: Vec<UnitLedger>,
  pub global: GlobalLedger,
  pub slack: SlackInfo,
  pub preferences: BlockPreferences,
}

impl StudentState {
  /// Ledger position for a unit key, if the key names a known unit.
  pub fn unit_index(&self, unit: &str) -> Option<usize> {
    self.units.iter().position(|u| u.unit == unit)
  }
}

/// Build the pass-1 state: full required envelopes, nothing done yet.
pub fn derive_initial_state(
  inputs: &FormInputs,
  capacity: &PlanCapacity,
  today: NaiveDate,
) -> StudentState {
  let units: Vec<UnitLedger> = (1..=capacity.units_count).map(UnitLedger::new).collect();

  let global = GlobalLedger {
    cases_required: capacity.cases_planned,
    cases_done: 0,
    programming_required: capacity.programming_planned,
    programming_done: 0,
  };

  let slack = compute_slack(&units, &global, capacity.available_effective_minutes);

  StudentState {
    meta: StateMeta {
      version: 1,
      created_at: Utc::now(),
      today,
      exam_date: inputs.exam_date,
    },
    units,
    global,
    slack,
    preferences: BlockPreferences::default(),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::capacity::calculate_capacity_for;
  use crate::test_utils::{date, mock_inputs};

  #[test]
  fn test_unit_envelope_sums_to_theory_share() {
    let required = ActivityMinutes::required_defaults();
    assert_eq!(required.total(), 510);
  }

  #[test]
  fn test_initial_state_shape() {
    let inputs = mock_inputs();
    let capacity = calculate_capacity_for(&inputs, date("2026-01-01"));
    let state = derive_initial_state(&inputs, &capacity, date("2026-01-01"));

    assert_eq!(state.meta.version, 1);
    assert_eq!(state.units.len(), 20);
    assert_eq!(state.units[0].unit, "Unidad 1");
    assert_eq!(state.units[19].unit, "Unidad 20");
    assert_eq!(state.units[0].done, ActivityMinutes::zero());
    assert_eq!(state.global.cases_required, capacity.cases_planned);
    assert_eq!(state.global.programming_required, capacity.programming_planned);

    // Nothing done yet: remaining required equals the full planned load.
    assert_eq!(state.slack.required_minutes_future, capacity.planned_minutes);
    assert_eq!(
      state.slack.slack_minutes,
      capacity.available_effective_minutes - capacity.planned_minutes
    );
  }

  #[test]
  fn test_unit_index_lookup() {
    let inputs = mock_inputs();
    let capacity = calculate_capacity_for(&inputs, date("2026-01-01"));
    let state = derive_initial_state(&inputs, &capacity, date("2026-01-01"));

    assert_eq!(state.unit_index("Unidad 7"), Some(6));
    assert_eq!(state.unit_index("Unidad 21"), None);
    assert_eq!(state.unit_index("Tema 1"), None);
  }

  #[test]
  fn test_preference_clamping() {
    let mut prefs = BlockPreferences::default();

    prefs.set_clamped(Activity::StudyTheme, 600);
    assert_eq!(prefs.study_theme, 90);

    prefs.set_clamped(Activity::StudyTheme, 0);
    assert_eq!(prefs.study_theme, 30);

    prefs.set_clamped(Activity::Quiz, 60);
    assert_eq!(prefs.quiz, 45);
  }

  #[test]
  fn test_slack_with_zero_capacity() {
    let units = vec![UnitLedger::new(1)];
    let global = GlobalLedger {
      cases_required: 0,
      cases_done: 0,
      programming_required: 0,
      programming_done: 0,
    };
    let slack = compute_slack(&units, &global, 0);

    assert_eq!(slack.slack_minutes, -510);
    assert_eq!(slack.slack_ratio, 0.0);
    assert_eq!(slack.status, BufferStatus::Warning);
  }
}
