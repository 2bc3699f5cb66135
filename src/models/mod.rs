pub mod activity;
pub mod inputs;
pub mod plan;

pub use activity::{Activity, BlockFormat, BlockType, Phase, Stream};
pub use inputs::{FormInputs, PlanOptions, Stage, StudentType};
pub use plan::{DayPlan, Plan, PlanDebug, StudyBlock, WeekSummary};
