//! Boundary validation
//!
//! The engine never fails on well-typed inputs; malformed shapes are rejected
//! here before it runs. Errors serialize to plain strings for UI callers.

use serde::Serialize;

use crate::feedback::FeedbackEvent;
use crate::models::inputs::FormInputs;

const ALLOWED_THEME_COUNTS: [u32; 3] = [15, 20, 25];

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
  #[error("Availability for weekday {index} is invalid: {value}")]
  Availability { index: usize, value: f64 },

  #[error("Theme count must be 15, 20 or 25, got {0}")]
  ThemeCount(u32),

  #[error("Quiz score must be within 0..=100, got {0}")]
  QuizScore(f64),

  #[error("Completed minutes must be a finite number, got {0}")]
  CompletedMinutes(f64),
}

impl Serialize for ValidationError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// Check the form inputs before handing them to the engine.
pub fn validate_inputs(inputs: &FormInputs) -> Result<(), ValidationError> {
  for (index, &value) in inputs.availability_hours.iter().enumerate() {
    if !value.is_finite() || value < 0.0 {
      return Err(ValidationError::Availability { index, value });
    }
  }

  if let Some(count) = inputs.theme_count {
    if !ALLOWED_THEME_COUNTS.contains(&count) {
      return Err(ValidationError::ThemeCount(count));
    }
  }

  Ok(())
}

/// Check a feedback batch before it is applied.
pub fn validate_events(events: &[FeedbackEvent]) -> Result<(), ValidationError> {
  for event in events {
    match event {
      FeedbackEvent::QuizResult { score, .. } => {
        if !score.is_finite() || !(0.0..=100.0).contains(score) {
          return Err(ValidationError::QuizScore(*score));
        }
      }
      FeedbackEvent::BlockCompleted { completed_minutes, .. } => {
        if !completed_minutes.is_finite() {
          return Err(ValidationError::CompletedMinutes(*completed_minutes));
        }
      }
      FeedbackEvent::SessionFeedback { .. } => {}
    }
  }
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::activity::Activity;
  use crate::test_utils::mock_inputs;

  #[test]
  fn test_valid_inputs_pass() {
    assert!(validate_inputs(&mock_inputs()).is_ok());
  }

  #[test]
  fn test_negative_availability_rejected() {
    let mut inputs = mock_inputs();
    inputs.availability_hours[3] = -1.0;
    let err = validate_inputs(&inputs).expect_err("should reject");
    assert!(err.to_string().contains("weekday 3"));
  }

  #[test]
  fn test_non_finite_availability_rejected() {
    let mut inputs = mock_inputs();
    inputs.availability_hours[0] = f64::NAN;
    assert!(validate_inputs(&inputs).is_err());

    inputs.availability_hours[0] = f64::INFINITY;
    assert!(validate_inputs(&inputs).is_err());
  }

  #[test]
  fn test_theme_count_outside_set_rejected() {
    let mut inputs = mock_inputs();
    inputs.theme_count = Some(18);
    assert!(validate_inputs(&inputs).is_err());

    inputs.theme_count = Some(25);
    assert!(validate_inputs(&inputs).is_ok());
  }

  #[test]
  fn test_event_ranges() {
    let out_of_range =
      vec![FeedbackEvent::QuizResult { unit: "Unidad 1".to_string(), score: 140.0 }];
    assert!(validate_events(&out_of_range).is_err());

    let non_finite = vec![FeedbackEvent::BlockCompleted {
      activity: Activity::StudyTheme,
      unit: Some("Unidad 1".to_string()),
      completed_minutes: f64::NAN,
    }];
    assert!(validate_events(&non_finite).is_err());

    let fine = vec![FeedbackEvent::QuizResult { unit: "Unidad 1".to_string(), score: 0.0 }];
    assert!(validate_events(&fine).is_ok());
  }

  #[test]
  fn test_error_serializes_to_string() {
    let err = ValidationError::ThemeCount(18);
    let json = serde_json::to_string(&err).expect("serialize");
    assert_eq!(json, "\"Theme count must be 15, 20 or 25, got 18\"");
  }
}
