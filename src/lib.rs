//! Deterministic study-plan engine for teacher-certification exam prep.
//!
//! The engine maps calendar availability to planable minutes, tracks a
//! required/done ledger per curriculum unit, and walks the days up to the
//! exam emitting study blocks. Feedback events fold into the state and the
//! future plan regenerates deterministically; the engine decides, callers
//! only render.

pub mod allocator;
pub mod capacity;
pub mod dates;
pub mod feedback;
pub mod generator;
pub mod models;
pub mod state;
pub mod validate;

#[cfg(test)]
pub mod test_utils;

use chrono::NaiveDate;

pub use capacity::{calculate_capacity, BufferStatus, PlanCapacity};
pub use feedback::{apply_feedback_events, FeedbackEvent, SessionFeel};
pub use generator::{generate_plan, generate_plan_from_state};
pub use models::activity::{Activity, BlockFormat, BlockType, Phase, Stream};
pub use models::inputs::{FormInputs, PlanOptions, Stage, StudentType};
pub use models::plan::{DayPlan, Plan, StudyBlock, WeekSummary};
pub use state::{derive_initial_state, BlockPreferences, SlackInfo, StudentState};
pub use validate::{validate_events, validate_inputs, ValidationError};

/// The reference day for a run: pinned by options, otherwise the local
/// calendar date.
pub(crate) fn resolve_today(options: &models::inputs::PlanOptions) -> NaiveDate {
  options.today.unwrap_or_else(|| chrono::Local::now().date_naive())
}
