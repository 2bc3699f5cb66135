//! Feedback ingestion
//!
//! Folds quiz results, completed blocks and session feedback into a new
//! student state. Required minutes only ever grow, done minutes are clamped
//! to required, preferences stay inside their bounds.

use serde::{Deserialize, Serialize};

use crate::models::activity::{Activity, Stream};
use crate::state::{compute_slack, BlockPreferences, StudentState};

/// Quiz scores below this add review work for the unit.
pub const QUIZ_FAIL_THRESHOLD: f64 = 60.0;

/// Extra review minutes added per failed quiz.
pub const REVIEW_BOOST_MINUTES: i64 = 30;

/// Preference adjustment per session feedback event.
pub const SESSION_FEEDBACK_STEP: i64 = 15;

/// ---------------------------------------------------------------------------
/// Events
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionFeel {
    TooMuch,
    Ok,
    More,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackEvent {
    QuizResult {
        unit: String,
        score: f64,
    },
    BlockCompleted {
        activity: Activity,
        #[serde(default)]
        unit: Option<String>,
        completed_minutes: f64,
    },
    SessionFeedback {
        activity: Activity,
        feel: SessionFeel,
    },
}

/// ---------------------------------------------------------------------------
/// Application
/// ---------------------------------------------------------------------------

/// Fold `events` over `state`, in order, and return the resulting state.
/// The input state is untouched. Slack is recomputed against the capacity
/// recorded at derivation time.
pub fn apply_feedback_events(state: &StudentState, events: &[FeedbackEvent]) -> StudentState {
    let mut next = state.clone();

    for event in events {
        match event {
            FeedbackEvent::QuizResult { unit, score } => {
                apply_quiz_result(&mut next, unit, *score);
            }
            FeedbackEvent::BlockCompleted { activity, unit, completed_minutes } => {
                apply_block_completed(&mut next, *activity, unit.as_deref(), *completed_minutes);
            }
            FeedbackEvent::SessionFeedback { activity, feel } => {
                apply_session_feedback(&mut next.preferences, *activity, *feel);
            }
        }
    }

    next.slack = compute_slack(&next.units, &next.global, next.slack.effective_capacity_future);
    next
}

fn apply_quiz_result(state: &mut StudentState, unit: &str, score: f64) {
    if !score.is_finite() || score >= QUIZ_FAIL_THRESHOLD {
        return;
    }
    match state.unit_index(unit) {
        Some(idx) => {
            state.units[idx].required.review += REVIEW_BOOST_MINUTES;
        }
        None => {
            tracing::warn!(unit = unit, "quiz result for unknown unit, skipping");
        }
    }
}

fn apply_block_completed(
    state: &mut StudentState,
    activity: Activity,
    unit: Option<&str>,
    completed_minutes: f64,
) {
    let minutes = if completed_minutes.is_finite() {
        completed_minutes.max(0.0).floor() as i64
    } else {
        0
    };

    match activity.stream() {
        Stream::Theory => {
            let Some(unit) = unit else {
                tracing::warn!(
                    activity = activity.as_str(),
                    "completed theory block without a unit, skipping"
                );
                return;
            };
            let Some(idx) = state.unit_index(unit) else {
                tracing::warn!(unit = unit, "completed block for unknown unit, skipping");
                return;
            };
            let ledger = &mut state.units[idx];
            let required = ledger.required.get(activity);
            let done = ledger.done.get_mut(activity);
            *done = (*done + minutes).min(required);
        }
        Stream::Cases => {
            state.global.cases_done =
                (state.global.cases_done + minutes).min(state.global.cases_required);
        }
        Stream::Programming => {
            state.global.programming_done =
                (state.global.programming_done + minutes).min(state.global.programming_required);
        }
    }
}

fn apply_session_feedback(preferences: &mut BlockPreferences, activity: Activity, feel: SessionFeel) {
    let current = preferences.get(activity);
    match feel {
        SessionFeel::Ok => {}
        SessionFeel::TooMuch => {
            preferences.set_clamped(activity, current - SESSION_FEEDBACK_STEP);
        }
        SessionFeel::More => {
            preferences.set_clamped(activity, current + SESSION_FEEDBACK_STEP);
        }
    }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_state;

    #[test]
    fn test_failing_quiz_boosts_review() {
        let state = mock_state();
        let events = vec![FeedbackEvent::QuizResult { unit: "Unidad 1".to_string(), score: 45.0 }];

        let next = apply_feedback_events(&state, &events);

        assert_eq!(next.units[0].required.review, 90);
        // Other units untouched.
        assert_eq!(next.units[1].required.review, 60);
        // Original state untouched.
        assert_eq!(state.units[0].required.review, 60);
    }

    #[test]
    fn test_passing_quiz_is_a_no_op() {
        let state = mock_state();
        let events = vec![FeedbackEvent::QuizResult { unit: "Unidad 1".to_string(), score: 75.0 }];

        let next = apply_feedback_events(&state, &events);
        assert_eq!(next, state);
    }

    #[test]
    fn test_quiz_results_accumulate_on_reapplication() {
        let state = mock_state();
        let events = vec![FeedbackEvent::QuizResult { unit: "Unidad 3".to_string(), score: 10.0 }];

        let once = apply_feedback_events(&state, &events);
        let twice = apply_feedback_events(&once, &events);

        assert_eq!(once.units[2].required.review, 90);
        assert_eq!(twice.units[2].required.review, 120);
    }

    #[test]
    fn test_unknown_unit_is_skipped() {
        let state = mock_state();
        let events = vec![
            FeedbackEvent::QuizResult { unit: "Unidad 99".to_string(), score: 10.0 },
            FeedbackEvent::BlockCompleted {
                activity: Activity::Review,
                unit: Some("Tema 4".to_string()),
                completed_minutes: 30.0,
            },
        ];

        let next = apply_feedback_events(&state, &events);
        assert_eq!(next, state);
    }

    #[test]
    fn test_completed_minutes_floor_and_clamp() {
        let state = mock_state();
        let events = vec![
            FeedbackEvent::BlockCompleted {
                activity: Activity::StudyTheme,
                unit: Some("Unidad 1".to_string()),
                completed_minutes: 90.7,
            },
            FeedbackEvent::BlockCompleted {
                activity: Activity::StudyTheme,
                unit: Some("Unidad 1".to_string()),
                completed_minutes: 500.0,
            },
            FeedbackEvent::BlockCompleted {
                activity: Activity::Quiz,
                unit: Some("Unidad 2".to_string()),
                completed_minutes: -30.0,
            },
        ];

        let next = apply_feedback_events(&state, &events);

        // 90 then clamped at the 240 requirement.
        assert_eq!(next.units[0].done.study_theme, 240);
        assert_eq!(next.units[1].done.quiz, 0);
    }

    #[test]
    fn test_completed_cases_and_programming_hit_global_ledger() {
        let state = mock_state();
        let events = vec![
            FeedbackEvent::BlockCompleted {
                activity: Activity::CaseMock,
                unit: None,
                completed_minutes: 60.0,
            },
            FeedbackEvent::BlockCompleted {
                activity: Activity::ProgrammingBlock,
                unit: None,
                completed_minutes: 45.0,
            },
        ];

        let next = apply_feedback_events(&state, &events);

        assert_eq!(next.global.cases_done, 60);
        assert_eq!(next.global.programming_done, 45);
    }

    #[test]
    fn test_missing_unit_on_theory_block_is_skipped() {
        let state = mock_state();
        let events = vec![FeedbackEvent::BlockCompleted {
            activity: Activity::Flashcard,
            unit: None,
            completed_minutes: 30.0,
        }];

        let next = apply_feedback_events(&state, &events);
        assert_eq!(next, state);
    }

    #[test]
    fn test_session_feedback_steps_and_clamps() {
        let state = mock_state();

        let shrink = vec![
            FeedbackEvent::SessionFeedback {
                activity: Activity::StudyTheme,
                feel: SessionFeel::TooMuch,
            };
            20
        ];
        let next = apply_feedback_events(&state, &shrink);
        assert_eq!(next.preferences.study_theme, 30);

        let grow = vec![
            FeedbackEvent::SessionFeedback { activity: Activity::Quiz, feel: SessionFeel::More };
            5
        ];
        let next = apply_feedback_events(&state, &grow);
        assert_eq!(next.preferences.quiz, 45);

        let ok = vec![FeedbackEvent::SessionFeedback {
            activity: Activity::Review,
            feel: SessionFeel::Ok,
        }];
        let next = apply_feedback_events(&state, &ok);
        assert_eq!(next.preferences, state.preferences);
    }

    #[test]
    fn test_slack_shrinks_by_exactly_the_required_growth() {
        let state = mock_state();
        let events = vec![
            FeedbackEvent::QuizResult { unit: "Unidad 1".to_string(), score: 20.0 },
            FeedbackEvent::QuizResult { unit: "Unidad 2".to_string(), score: 30.0 },
        ];

        let next = apply_feedback_events(&state, &events);

        assert_eq!(next.slack.slack_minutes, state.slack.slack_minutes - 60);
        assert_eq!(
            next.slack.effective_capacity_future,
            state.slack.effective_capacity_future
        );
    }

    #[test]
    fn test_event_wire_format() {
        let event = FeedbackEvent::QuizResult { unit: "Unidad 1".to_string(), score: 45.0 };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("\"kind\":\"QUIZ_RESULT\""));

        let parsed: FeedbackEvent = serde_json::from_str(
            r#"{"kind":"SESSION_FEEDBACK","activity":"STUDY_THEME","feel":"too_much"}"#,
        )
        .expect("deserialize");
        assert_eq!(
            parsed,
            FeedbackEvent::SessionFeedback {
                activity: Activity::StudyTheme,
                feel: SessionFeel::TooMuch,
            }
        );
    }
}
