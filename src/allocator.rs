//! Remaining-ratio allocator
//!
//! Picks the next activity and unit for a partially-filled day. The engine
//! decides; callers only commit what it returns.
//!
//! Selection runs in stages: stream balance across theory/cases/programming
//! (weeks 3+), a weekly floor that rescues under-served streams, curriculum
//! ordering with a daily study cap for theory, and the practice/mock split
//! for cases.

use serde::{Deserialize, Serialize};

use crate::capacity::PlanCapacity;
use crate::models::activity::{Activity, Stream};
use crate::state::StudentState;

/// Hard block duration bounds, minutes.
pub const MIN_BLOCK_DURATION: i64 = 15;
pub const MAX_BLOCK_DURATION: i64 = 60;

/// The first two weeks build theory only.
pub const THEORY_ONLY_WEEKS: i64 = 2;

/// A unit may start STUDY_THEME once the previous unit has this many minutes.
pub const START_NEXT_UNIT_THRESHOLD: i64 = 120;

/// STUDY_THEME minutes at which a unit's review unlocks.
pub const STUDY_THEME_COMPLETE_THRESHOLD: i64 = 240;

/// Weekly per-stream floor, minutes.
pub const WEEKLY_MINIMUM_MINUTES: i64 = 60;

/// With fewer week minutes than this left, under-served streams get forced.
pub const WEEK_CLOSEOUT_MINUTES: i64 = 120;

/// Share of planned cases minutes that goes to practice before mocks start.
pub const CASE_PRACTICE_SHARE: f64 = 0.7;

/// ---------------------------------------------------------------------------
/// Budget
/// ---------------------------------------------------------------------------

/// Remaining workload for one unit within a single generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitBudget {
    pub unit: String,
    pub study_theme_remaining: i64,
    pub review_remaining: i64,
    pub podcast_remaining: i64,
    pub flashcard_remaining: i64,
    pub quiz_remaining: i64,
    pub total_remaining: i64,

    /// Cumulative STUDY_THEME minutes: historical done plus what this pass
    /// has scheduled so far.
    pub study_theme_done: i64,
    pub study_theme_complete: bool,
}

impl UnitBudget {
    /// A unit is active once any STUDY_THEME minutes have landed on it.
    pub fn is_active(&self) -> bool {
        self.study_theme_done > 0
    }
}

/// Scheduling budget for one generation pass. Derived from student state,
/// drained by `commit`, discarded when the pass ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalBudget {
    pub units: Vec<UnitBudget>,

    pub theory_planned: i64,
    pub theory_remaining: i64,

    pub cases_planned: i64,
    pub cases_remaining: i64,
    pub case_practice_scheduled: i64,
    pub case_mock_scheduled: i64,

    pub programming_planned: i64,
    pub programming_remaining: i64,
}

impl GlobalBudget {
    pub fn new(state: &StudentState, capacity: &PlanCapacity) -> Self {
        let units: Vec<UnitBudget> = state
            .units
            .iter()
            .map(|ledger| {
                let study_theme_remaining =
                    (ledger.required.study_theme - ledger.done.study_theme).max(0);
                let review_remaining = (ledger.required.review - ledger.done.review).max(0);
                let podcast_remaining = (ledger.required.podcast - ledger.done.podcast).max(0);
                let flashcard_remaining =
                    (ledger.required.flashcard - ledger.done.flashcard).max(0);
                let quiz_remaining = (ledger.required.quiz - ledger.done.quiz).max(0);

                UnitBudget {
                    unit: ledger.unit.clone(),
                    study_theme_remaining,
                    review_remaining,
                    podcast_remaining,
                    flashcard_remaining,
                    quiz_remaining,
                    total_remaining: study_theme_remaining
                        + review_remaining
                        + podcast_remaining
                        + flashcard_remaining
                        + quiz_remaining,
                    study_theme_done: ledger.done.study_theme,
                    study_theme_complete: ledger.done.study_theme
                        >= STUDY_THEME_COMPLETE_THRESHOLD,
                }
            })
            .collect();

        let theory_remaining = units.iter().map(|u| u.total_remaining).sum();

        Self {
            units,
            theory_planned: capacity.theory_planned,
            theory_remaining,
            cases_planned: capacity.cases_planned,
            cases_remaining: (state.global.cases_required - state.global.cases_done).max(0),
            case_practice_scheduled: 0,
            case_mock_scheduled: 0,
            programming_planned: capacity.programming_planned,
            programming_remaining: (state.global.programming_required
                - state.global.programming_done)
                .max(0),
        }
    }

    pub fn stream_remaining(&self, stream: Stream) -> i64 {
        match stream {
            Stream::Theory => self.theory_remaining,
            Stream::Cases => self.cases_remaining,
            Stream::Programming => self.programming_remaining,
        }
    }

    fn remaining_ratio(&self, stream: Stream) -> f64 {
        let (remaining, planned) = match stream {
            Stream::Theory => (self.theory_remaining, self.theory_planned),
            Stream::Cases => (self.cases_remaining, self.cases_planned),
            Stream::Programming => (self.programming_remaining, self.programming_planned),
        };
        if planned > 0 {
            remaining as f64 / planned as f64
        } else {
            0.0
        }
    }

    /// Drain the budget for a committed block. Remainders clamp at zero; a
    /// block may outsize its remainder when the day tail rounds up.
    pub fn commit(&mut self, activity: Activity, unit: Option<usize>, minutes: i64) {
        debug_assert!(minutes > 0, "committed block must have positive duration");

        match activity.stream() {
            Stream::Theory => {
                let idx = match unit {
                    Some(idx) => idx,
                    None => {
                        debug_assert!(false, "theory block committed without a unit");
                        return;
                    }
                };
                let entry = &mut self.units[idx];
                let slot = match activity {
                    Activity::StudyTheme => &mut entry.study_theme_remaining,
                    Activity::Review => &mut entry.review_remaining,
                    Activity::Podcast => &mut entry.podcast_remaining,
                    Activity::Flashcard => &mut entry.flashcard_remaining,
                    Activity::Quiz => &mut entry.quiz_remaining,
                    _ => unreachable!(),
                };
                let delta = minutes.min(*slot);
                *slot -= delta;
                entry.total_remaining = (entry.total_remaining - delta).max(0);
                self.theory_remaining = (self.theory_remaining - delta).max(0);

                if activity == Activity::StudyTheme {
                    entry.study_theme_done += minutes;
                    if entry.study_theme_done >= STUDY_THEME_COMPLETE_THRESHOLD {
                        entry.study_theme_complete = true;
                    }
                }
            }
            Stream::Cases => {
                let delta = minutes.min(self.cases_remaining);
                self.cases_remaining -= delta;
                match activity {
                    Activity::CasePractice => self.case_practice_scheduled += minutes,
                    Activity::CaseMock => self.case_mock_scheduled += minutes,
                    _ => unreachable!(),
                }
            }
            Stream::Programming => {
                let delta = minutes.min(self.programming_remaining);
                self.programming_remaining -= delta;
            }
        }
    }
}

/// ---------------------------------------------------------------------------
/// Context
/// ---------------------------------------------------------------------------

/// Rolling per-week scheduling context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekContext {
    /// 1-based, anchored on the plan start day.
    pub week_index: i64,
    pub theory_minutes: i64,
    pub cases_minutes: i64,
    pub programming_minutes: i64,

    /// Planable minutes this week, fixed at week start.
    pub available_total: i64,
    pub scheduled_total: i64,

    pub last_week_cases: i64,
    pub last_week_programming: i64,
}

impl WeekContext {
    pub fn start(week_index: i64, available_total: i64) -> Self {
        Self {
            week_index,
            theory_minutes: 0,
            cases_minutes: 0,
            programming_minutes: 0,
            available_total,
            scheduled_total: 0,
            last_week_cases: 0,
            last_week_programming: 0,
        }
    }

    pub fn minutes_for(&self, stream: Stream) -> i64 {
        match stream {
            Stream::Theory => self.theory_minutes,
            Stream::Cases => self.cases_minutes,
            Stream::Programming => self.programming_minutes,
        }
    }

    pub fn add_scheduled(&mut self, stream: Stream, minutes: i64) {
        match stream {
            Stream::Theory => self.theory_minutes += minutes,
            Stream::Cases => self.cases_minutes += minutes,
            Stream::Programming => self.programming_minutes += minutes,
        }
        self.scheduled_total += minutes;
    }

    pub fn remaining(&self) -> i64 {
        (self.available_total - self.scheduled_total).max(0)
    }
}

/// Per-day scheduling context. Reset every morning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayContext {
    pub available_minutes: i64,
    pub study_theme_today: i64,

    /// Locked by the first STUDY_THEME block of the day; all further
    /// STUDY_THEME that day stays on this unit.
    pub today_unit: Option<usize>,
}

impl DayContext {
    pub fn new(available_minutes: i64) -> Self {
        Self { available_minutes, study_theme_today: 0, today_unit: None }
    }

    /// Daily STUDY_THEME ceiling: half of a full day, at most 120 on a
    /// short one.
    pub fn study_theme_cap(&self) -> i64 {
        if self.available_minutes >= 240 {
            self.available_minutes / 2
        } else {
            self.available_minutes.min(120)
        }
    }

    pub fn study_theme_headroom(&self) -> i64 {
        (self.study_theme_cap() - self.study_theme_today).max(0)
    }
}

/// What the allocator picked: an activity, and for theory the unit it is
/// attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub activity: Activity,
    pub unit: Option<usize>,
}

/// ---------------------------------------------------------------------------
/// Stream selection (weeks 3+)
/// ---------------------------------------------------------------------------

const FORCE_ORDER: [Stream; 3] = [Stream::Cases, Stream::Programming, Stream::Theory];

fn missing_streams(budget: &GlobalBudget, week: &WeekContext) -> Vec<Stream> {
    FORCE_ORDER
        .iter()
        .copied()
        .filter(|s| week.minutes_for(*s) < WEEKLY_MINIMUM_MINUTES && budget.stream_remaining(*s) > 0)
        .collect()
}

fn least_scheduled_stream(week: &WeekContext) -> Stream {
    let mut least = FORCE_ORDER[0];
    for stream in FORCE_ORDER {
        if week.minutes_for(stream) < week.minutes_for(least) {
            least = stream;
        }
    }
    least
}

fn select_stream(budget: &GlobalBudget, week: &WeekContext) -> Stream {
    let missing = missing_streams(budget, week);

    // Closing out the week: whatever is still under the floor goes first.
    if week.remaining() < WEEK_CLOSEOUT_MINUTES {
        if let Some(stream) = missing.first() {
            return *stream;
        }
    } else if !missing.is_empty() {
        let least = least_scheduled_stream(week);
        if missing.contains(&least) {
            return least;
        }
    }

    // Starvation guardrails: a stream skipped entirely last week jumps the queue.
    if week.last_week_cases == 0 && budget.cases_remaining > 0 {
        return Stream::Cases;
    }
    if week.last_week_programming == 0 && budget.programming_remaining > 0 {
        return Stream::Programming;
    }

    // Greatest remaining ratio wins; ties resolve theory, cases, programming.
    let mut best = Stream::Theory;
    for stream in [Stream::Cases, Stream::Programming] {
        if budget.remaining_ratio(stream) > budget.remaining_ratio(best) {
            best = stream;
        }
    }
    best
}

/// ---------------------------------------------------------------------------
/// Theory selection
/// ---------------------------------------------------------------------------

fn eligible_primary_unit(budget: &GlobalBudget, today_unit: Option<usize>) -> Option<usize> {
    for (idx, unit) in budget.units.iter().enumerate() {
        if unit.study_theme_remaining <= 0 {
            continue;
        }
        if idx > 0 && budget.units[idx - 1].study_theme_done < START_NEXT_UNIT_THRESHOLD {
            continue;
        }
        if let Some(locked) = today_unit {
            if locked != idx {
                continue;
            }
        }
        return Some(idx);
    }
    None
}

/// Secondary work available on one unit, in precedence order. Review only
/// once the unit's study envelope is complete.
fn secondary_activity(unit: &UnitBudget) -> Option<Activity> {
    if unit.review_remaining > 0 && unit.study_theme_done >= STUDY_THEME_COMPLETE_THRESHOLD {
        return Some(Activity::Review);
    }
    if unit.podcast_remaining > 0 {
        return Some(Activity::Podcast);
    }
    if unit.flashcard_remaining > 0 {
        return Some(Activity::Flashcard);
    }
    if unit.quiz_remaining > 0 {
        return Some(Activity::Quiz);
    }
    None
}

fn select_secondary(budget: &GlobalBudget, day: &DayContext) -> Option<Selection> {
    let is_active =
        |idx: usize, unit: &UnitBudget| unit.is_active() || day.today_unit == Some(idx);

    let active_count = budget
        .units
        .iter()
        .enumerate()
        .filter(|(idx, unit)| is_active(*idx, unit))
        .count();

    // Interleave: with two or more active units, pull secondary work from a
    // unit other than today's so earlier units keep consolidating.
    if active_count >= 2 {
        for (idx, unit) in budget.units.iter().enumerate() {
            if day.today_unit == Some(idx) || !is_active(idx, unit) {
                continue;
            }
            if let Some(activity) = secondary_activity(unit) {
                return Some(Selection { activity, unit: Some(idx) });
            }
        }
    }

    // Fall back to today's unit, or the first active unit when no lock exists.
    let candidate = day
        .today_unit
        .or_else(|| budget.units.iter().position(|u| u.is_active()))?;
    secondary_activity(&budget.units[candidate])
        .map(|activity| Selection { activity, unit: Some(candidate) })
}

fn select_theory(budget: &GlobalBudget, day: &DayContext) -> Option<Selection> {
    // Under the daily cap with room for at least a minimum block: study.
    if day.study_theme_headroom() >= MIN_BLOCK_DURATION {
        if let Some(idx) = eligible_primary_unit(budget, day.today_unit) {
            return Some(Selection { activity: Activity::StudyTheme, unit: Some(idx) });
        }
    }
    select_secondary(budget, day)
}

/// ---------------------------------------------------------------------------
/// Cases selection
/// ---------------------------------------------------------------------------

fn select_cases(budget: &GlobalBudget) -> Option<Selection> {
    let practice_target = CASE_PRACTICE_SHARE * budget.cases_planned as f64;
    let activity = if (budget.case_practice_scheduled as f64) < practice_target {
        Activity::CasePractice
    } else {
        Activity::CaseMock
    };
    Some(Selection { activity, unit: None })
}

/// ---------------------------------------------------------------------------
/// Entry point
/// ---------------------------------------------------------------------------

/// The next activity for the day, or None when nothing can be scheduled.
pub fn select_next(
    budget: &GlobalBudget,
    week: &WeekContext,
    day: &DayContext,
) -> Option<Selection> {
    if week.week_index <= THEORY_ONLY_WEEKS {
        return select_theory(budget, day);
    }

    match select_stream(budget, week) {
        Stream::Theory => select_theory(budget, day),
        Stream::Cases => select_cases(budget),
        Stream::Programming => {
            Some(Selection { activity: Activity::ProgrammingBlock, unit: None })
        }
    }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
