//! Plan generator
//!
//! Walks the calendar from today to the exam, drains each day's available
//! minutes through the allocator, and rolls the result up into days, weeks
//! and diagnostics. Everything here is deterministic for a fixed
//! (inputs, state, today): the only wall-clock read is the generated-at
//! stamp on the plan meta.

use chrono::{NaiveDate, Utc};

use crate::allocator::{
  select_next, DayContext, GlobalBudget, Selection, WeekContext, MAX_BLOCK_DURATION,
  MIN_BLOCK_DURATION, WEEKLY_MINIMUM_MINUTES,
};
use crate::capacity::{calculate_capacity_for, day_minutes, PlanCapacity};
use crate::dates::{add_days, monday_of_week, weekday_index_sunday};
use crate::models::activity::{Activity, Phase, Stream, PROGRAMMING_UNIT_LABEL};
use crate::models::inputs::{FormInputs, PlanOptions};
use crate::models::plan::{
  DayPlan, PhaseDefinition, PhaseMinutes, Plan, PlanDebug, PlanMeta, StudyBlock, WeekSummary,
  WeeklyActual,
};
use crate::state::{derive_initial_state, BlockPreferences, StudentState};

/// Generate a plan from scratch: capacity, initial state, then the day walk.
pub fn generate_plan(inputs: &FormInputs, options: &PlanOptions) -> Plan {
  let today = crate::resolve_today(options);
  let capacity = calculate_capacity_for(inputs, today);
  let state = derive_initial_state(inputs, &capacity, today);
  build_plan(inputs, &state, capacity)
}

/// Regenerate the future plan for an existing state. Deterministic: the same
/// state yields the same blocks, so feedback is the only source of change.
pub fn generate_plan_from_state(
  inputs: &FormInputs,
  state: &StudentState,
  options: &PlanOptions,
) -> Plan {
  let today = options.today.unwrap_or(state.meta.today);
  let capacity = calculate_capacity_for(inputs, today);
  build_plan(inputs, state, capacity)
}

/// ---------------------------------------------------------------------------
/// Day walk
/// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct StreamTotals {
  theory: i64,
  cases: i64,
  programming: i64,
}

impl StreamTotals {
  fn add(&mut self, stream: Stream, minutes: i64) {
    match stream {
      Stream::Theory => self.theory += minutes,
      Stream::Cases => self.cases += minutes,
      Stream::Programming => self.programming += minutes,
    }
  }
}

fn build_plan(inputs: &FormInputs, state: &StudentState, capacity: PlanCapacity) -> Plan {
  let today = capacity.today;
  let window_days = capacity.effective_planning_weeks * 7;

  let mut budget = GlobalBudget::new(state, &capacity);
  let mut totals = StreamTotals::default();
  let mut days: Vec<DayPlan> = Vec::new();
  let mut weekly_actuals: Vec<WeeklyActual> = Vec::new();
  let mut cases_starved_weeks = 0;
  let mut programming_starved_weeks = 0;

  let mut week = WeekContext::start(
    1,
    week_available_minutes(inputs, today, 0, window_days, capacity.days_until_exam),
  );

  for d in 0..capacity.days_until_exam {
    if d > 0 && d % 7 == 0 {
      archive_week(
        &week,
        &budget,
        window_days,
        &mut weekly_actuals,
        &mut cases_starved_weeks,
        &mut programming_starved_weeks,
      );
      let mut next = WeekContext::start(
        d / 7 + 1,
        week_available_minutes(inputs, today, d, window_days, capacity.days_until_exam),
      );
      next.last_week_cases = week.cases_minutes;
      next.last_week_programming = week.programming_minutes;
      week = next;
    }

    let date = add_days(today, d);
    let in_window = d < window_days;
    days.push(build_day(
      date,
      if in_window { day_minutes(inputs, date) } else { 0 },
      &mut budget,
      &mut week,
      &state.preferences,
      &mut totals,
    ));
  }

  if capacity.days_until_exam > 0 {
    archive_week(
      &week,
      &budget,
      window_days,
      &mut weekly_actuals,
      &mut cases_starved_weeks,
      &mut programming_starved_weeks,
    );
  }

  let weekly_summaries = summarize_weeks(&days);
  let total_scheduled = totals.theory + totals.cases + totals.programming;

  tracing::debug!(
    total_scheduled,
    theory = totals.theory,
    cases = totals.cases,
    programming = totals.programming,
    "plan generated"
  );

  Plan {
    meta: PlanMeta {
      generated_at: Utc::now(),
      today,
      exam_date: capacity.exam_date,
      region: inputs.region.clone(),
      stage: inputs.stage,
      total_units: capacity.units_count,
    },
    phases: phase_definitions(),
    days,
    weekly_summaries,
    explanations: Vec::new(),
    debug: Some(PlanDebug {
      theory_scheduled: totals.theory,
      cases_scheduled: totals.cases,
      programming_scheduled: totals.programming,
      total_scheduled,
      weekly_actuals,
      cases_starved_weeks,
      programming_starved_weeks,
      capacity,
    }),
  }
}

/// Planable minutes for the scheduling week starting at day offset
/// `week_start`. Fixed at week start; days too short to hold a block are
/// left out.
fn week_available_minutes(
  inputs: &FormInputs,
  today: NaiveDate,
  week_start: i64,
  window_days: i64,
  days_until_exam: i64,
) -> i64 {
  let end = (week_start + 7).min(window_days).min(days_until_exam);
  let mut total = 0;
  for d in week_start..end {
    let minutes = day_minutes(inputs, add_days(today, d));
    if minutes >= MIN_BLOCK_DURATION {
      total += minutes;
    }
  }
  total
}

fn archive_week(
  week: &WeekContext,
  budget: &GlobalBudget,
  window_days: i64,
  weekly_actuals: &mut Vec<WeeklyActual>,
  cases_starved_weeks: &mut i64,
  programming_starved_weeks: &mut i64,
) {
  // Reserve weeks never schedule anything; keep the diagnostics to the window.
  if (week.week_index - 1) * 7 >= window_days {
    return;
  }

  let missing_streams = [Stream::Cases, Stream::Programming, Stream::Theory]
    .into_iter()
    .filter(|s| week.minutes_for(*s) < WEEKLY_MINIMUM_MINUTES && budget.stream_remaining(*s) > 0)
    .collect();

  weekly_actuals.push(WeeklyActual {
    week_index: week.week_index,
    theory_minutes: week.theory_minutes,
    cases_minutes: week.cases_minutes,
    programming_minutes: week.programming_minutes,
    missing_streams,
  });

  // Starvation only counts once the balancing weeks have begun.
  if week.week_index > 2 {
    if week.cases_minutes == 0 && budget.cases_remaining > 0 {
      *cases_starved_weeks += 1;
    }
    if week.programming_minutes == 0 && budget.programming_remaining > 0 {
      *programming_starved_weeks += 1;
    }
  }
}

/// ---------------------------------------------------------------------------
/// Day builder
/// ---------------------------------------------------------------------------

fn build_day(
  date: NaiveDate,
  available: i64,
  budget: &mut GlobalBudget,
  week: &mut WeekContext,
  preferences: &BlockPreferences,
  totals: &mut StreamTotals,
) -> DayPlan {
  let weekday = weekday_index_sunday(date);
  let mut blocks: Vec<StudyBlock> = Vec::new();

  if available >= MIN_BLOCK_DURATION {
    let mut day = DayContext::new(available);
    let mut remaining = available;

    if available < MAX_BLOCK_DURATION {
      // Short day: one block absorbs whatever fits.
      if let Some(selection) = select_next(budget, week, &day) {
        let duration = tail_duration(&selection, remaining, &day);
        commit_block(date, selection, duration, budget, week, &mut day, totals, &mut blocks);
      }
    } else {
      while remaining >= MAX_BLOCK_DURATION {
        let Some(selection) = select_next(budget, week, &day) else {
          tracing::debug!(date = %date, remaining, "day drain stopped early");
          break;
        };
        let duration = drain_duration(&selection, remaining, &day, preferences);
        commit_block(date, selection, duration, budget, week, &mut day, totals, &mut blocks);
        remaining -= duration;
      }

      // Tail: a last sub-hour block soaks up the rest of the day.
      if (MIN_BLOCK_DURATION..MAX_BLOCK_DURATION).contains(&remaining) {
        if let Some(selection) = select_next(budget, week, &day) {
          let duration = tail_duration(&selection, remaining, &day);
          commit_block(date, selection, duration, budget, week, &mut day, totals, &mut blocks);
        }
      }
    }
  }

  let total_minutes: i64 = blocks.iter().map(|b| b.duration_minutes).sum();
  DayPlan { date, weekday, total_hours: total_minutes as f64 / 60.0, blocks }
}

/// Block size inside the main drain: the activity's preferred duration
/// clamped into the hard bounds, never past the day's remaining minutes, and
/// for STUDY_THEME never past the daily cap headroom.
fn drain_duration(
  selection: &Selection,
  remaining: i64,
  day: &DayContext,
  preferences: &BlockPreferences,
) -> i64 {
  let target = preferences
    .get(selection.activity)
    .clamp(MIN_BLOCK_DURATION, MAX_BLOCK_DURATION);
  let mut duration = target.min(remaining);
  if selection.activity == Activity::StudyTheme {
    duration = duration.min(day.study_theme_headroom());
  }
  duration
}

/// Tail and short-day blocks take the whole remainder; STUDY_THEME still
/// respects the daily cap.
fn tail_duration(selection: &Selection, remaining: i64, day: &DayContext) -> i64 {
  if selection.activity == Activity::StudyTheme {
    remaining.min(day.study_theme_headroom())
  } else {
    remaining
  }
}

#[allow(clippy::too_many_arguments)]
fn commit_block(
  date: NaiveDate,
  selection: Selection,
  duration: i64,
  budget: &mut GlobalBudget,
  week: &mut WeekContext,
  day: &mut DayContext,
  totals: &mut StreamTotals,
  blocks: &mut Vec<StudyBlock>,
) {
  debug_assert!(duration >= MIN_BLOCK_DURATION && duration <= MAX_BLOCK_DURATION);

  let unit_label = match selection.activity {
    Activity::ProgrammingBlock => Some(PROGRAMMING_UNIT_LABEL.to_string()),
    _ => selection.unit.map(|idx| budget.units[idx].unit.clone()),
  };

  blocks.push(StudyBlock::new(date, blocks.len(), selection.activity, unit_label, duration));

  budget.commit(selection.activity, selection.unit, duration);
  let stream = selection.activity.stream();
  week.add_scheduled(stream, duration);
  totals.add(stream, duration);

  if selection.activity == Activity::StudyTheme {
    day.study_theme_today += duration;
    if day.today_unit.is_none() {
      day.today_unit = selection.unit;
    }
  }
}

/// ---------------------------------------------------------------------------
/// Roll-ups
/// ---------------------------------------------------------------------------

fn summarize_weeks(days: &[DayPlan]) -> Vec<WeekSummary> {
  let mut summaries: Vec<WeekSummary> = Vec::new();

  for day in days {
    let week_start = monday_of_week(day.date);
    if summaries.last().map(|w| w.week_start) != Some(week_start) {
      summaries.push(WeekSummary {
        week_start,
        total_hours: 0.0,
        minutes_per_phase: PhaseMinutes::default(),
      });
    }
    let summary = summaries.last_mut().expect("summary pushed above");
    for block in &day.blocks {
      summary.minutes_per_phase.add(block.phase, block.duration_minutes);
    }
    summary.total_hours = summary.minutes_per_phase.total() as f64 / 60.0;
  }

  summaries
}

fn phase_definitions() -> Vec<PhaseDefinition> {
  vec![
    PhaseDefinition { phase: Phase::P1Context, label: "Contexto y organización".to_string() },
    PhaseDefinition { phase: Phase::P2Depth, label: "Estudio en profundidad".to_string() },
    PhaseDefinition { phase: Phase::P3EvalReview, label: "Evaluación y repaso".to_string() },
    PhaseDefinition { phase: Phase::P4Practice, label: "Práctica aplicada".to_string() },
  ]
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
