use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Activities
/// ---------------------------------------------------------------------------

/// Everything a study block can be. Closed set: the UI matches on these tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activity {
  StudyTheme,
  Review,
  Podcast,
  Flashcard,
  Quiz,
  CasePractice,
  CaseMock,
  ProgrammingBlock,
}

impl Activity {
  pub fn as_str(&self) -> &'static str {
    match self {
      Activity::StudyTheme => "STUDY_THEME",
      Activity::Review => "REVIEW",
      Activity::Podcast => "PODCAST",
      Activity::Flashcard => "FLASHCARD",
      Activity::Quiz => "QUIZ",
      Activity::CasePractice => "CASE_PRACTICE",
      Activity::CaseMock => "CASE_MOCK",
      Activity::ProgrammingBlock => "PROGRAMMING_BLOCK",
    }
  }

  pub fn stream(&self) -> Stream {
    match self {
      Activity::StudyTheme
      | Activity::Review
      | Activity::Podcast
      | Activity::Flashcard
      | Activity::Quiz => Stream::Theory,
      Activity::CasePractice | Activity::CaseMock => Stream::Cases,
      Activity::ProgrammingBlock => Stream::Programming,
    }
  }

  pub fn is_theory(&self) -> bool {
    self.stream() == Stream::Theory
  }

  pub fn phase(&self) -> Phase {
    match self {
      Activity::StudyTheme | Activity::Podcast => Phase::P2Depth,
      Activity::Review | Activity::Flashcard | Activity::Quiz => Phase::P3EvalReview,
      Activity::CasePractice | Activity::CaseMock | Activity::ProgrammingBlock => {
        Phase::P4Practice
      }
    }
  }

  pub fn block_type(&self) -> BlockType {
    match self {
      Activity::StudyTheme | Activity::Podcast => BlockType::NewContent,
      Activity::Review => BlockType::Review,
      Activity::Flashcard => BlockType::Recap,
      Activity::Quiz => BlockType::Quiz,
      Activity::CasePractice | Activity::ProgrammingBlock => BlockType::Practice,
      Activity::CaseMock => BlockType::Evaluation,
    }
  }

  pub fn format(&self) -> BlockFormat {
    match self {
      Activity::StudyTheme | Activity::ProgrammingBlock => BlockFormat::RawContent,
      Activity::Review | Activity::Flashcard => BlockFormat::Flashcards,
      Activity::Podcast => BlockFormat::Audio,
      Activity::Quiz | Activity::CasePractice | Activity::CaseMock => BlockFormat::Quiz,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Streams
/// ---------------------------------------------------------------------------

/// Top-level allocation buckets with a 50/30/20 target split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
  Theory,
  Cases,
  Programming,
}

impl Stream {
  pub fn as_str(&self) -> &'static str {
    match self {
      Stream::Theory => "theory",
      Stream::Cases => "cases",
      Stream::Programming => "programming",
    }
  }
}

/// ---------------------------------------------------------------------------
/// Phases and presentation tags
/// ---------------------------------------------------------------------------

/// Pedagogical phase a block belongs to. Derived from the activity, fixed map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
  P1Context,
  P2Depth,
  P3EvalReview,
  P4Practice,
}

impl Phase {
  pub fn as_str(&self) -> &'static str {
    match self {
      Phase::P1Context => "P1_CONTEXT",
      Phase::P2Depth => "P2_DEPTH",
      Phase::P3EvalReview => "P3_EVAL_REVIEW",
      Phase::P4Practice => "P4_PRACTICE",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
  NewContent,
  Review,
  Recap,
  Quiz,
  Practice,
  Evaluation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockFormat {
  RawContent,
  Flashcards,
  Audio,
  Quiz,
}

/// Unit label attached to programming blocks (they belong to no curriculum unit).
pub const PROGRAMMING_UNIT_LABEL: &str = "Programación";

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_stream_mapping() {
    assert_eq!(Activity::StudyTheme.stream(), Stream::Theory);
    assert_eq!(Activity::Quiz.stream(), Stream::Theory);
    assert_eq!(Activity::CaseMock.stream(), Stream::Cases);
    assert_eq!(Activity::ProgrammingBlock.stream(), Stream::Programming);
  }

  #[test]
  fn test_phase_mapping() {
    assert_eq!(Activity::StudyTheme.phase(), Phase::P2Depth);
    assert_eq!(Activity::Podcast.phase(), Phase::P2Depth);
    assert_eq!(Activity::Review.phase(), Phase::P3EvalReview);
    assert_eq!(Activity::Flashcard.phase(), Phase::P3EvalReview);
    assert_eq!(Activity::Quiz.phase(), Phase::P3EvalReview);
    assert_eq!(Activity::CasePractice.phase(), Phase::P4Practice);
    assert_eq!(Activity::CaseMock.phase(), Phase::P4Practice);
    assert_eq!(Activity::ProgrammingBlock.phase(), Phase::P4Practice);
  }

  #[test]
  fn test_serde_tags_match_wire_format() {
    let json = serde_json::to_string(&Activity::CasePractice).expect("serialize");
    assert_eq!(json, "\"CASE_PRACTICE\"");
    let json = serde_json::to_string(&Phase::P3EvalReview).expect("serialize");
    assert_eq!(json, "\"P3_EVAL_REVIEW\"");
    let json = serde_json::to_string(&BlockType::NewContent).expect("serialize");
    assert_eq!(json, "\"new_content\"");
    let json = serde_json::to_string(&BlockFormat::RawContent).expect("serialize");
    assert_eq!(json, "\"raw_content\"");
  }

  #[test]
  fn test_as_str_round_trips_serde() {
    for activity in [
      Activity::StudyTheme,
      Activity::Review,
      Activity::Podcast,
      Activity::Flashcard,
      Activity::Quiz,
      Activity::CasePractice,
      Activity::CaseMock,
      Activity::ProgrammingBlock,
    ] {
      let json = serde_json::to_string(&activity).expect("serialize");
      assert_eq!(json, format!("\"{}\"", activity.as_str()));
    }
  }
}
