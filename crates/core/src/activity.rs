//! Drill Activities
//!
//! Per-session scratch state for the activity currently being practised,
//! together with the rules that decide when a drill is passed and what happens
//! when the learner reaches the attempt threshold without enough accuracy.

use std::fmt;

/// The drill modes within a lesson, in the order they are run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Vocabulary,
    Phrase,
    Scenario,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::Vocabulary => write!(f, "vocabulary"),
            ActivityKind::Phrase => write!(f, "phrase"),
            ActivityKind::Scenario => write!(f, "scenario"),
        }
    }
}

/// A question put to the learner: German source text and the expected gloss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub source: String,
    pub expected: String,
}

impl Prompt {
    pub fn new(source: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            expected: expected.into(),
        }
    }
}

impl From<(String, String)> for Prompt {
    fn from((source, expected): (String, String)) -> Self {
        Self { source, expected }
    }
}

/// What to do with the counters once the threshold is hit without enough accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationPolicy {
    /// Zero both counters and run the whole drill again.
    ResetCounters,
    /// Take back the last attempt so that one more answer decides.
    RetryLast,
}

/// Pass criteria for one activity kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityRules {
    pub threshold_attempts: u32,
    pub min_accuracy: f64,
    pub remediation: RemediationPolicy,
}

pub const VOCABULARY_RULES: ActivityRules = ActivityRules {
    threshold_attempts: 5,
    min_accuracy: 0.6,
    remediation: RemediationPolicy::ResetCounters,
};

pub const PHRASE_RULES: ActivityRules = ActivityRules {
    threshold_attempts: 3,
    min_accuracy: 0.6,
    remediation: RemediationPolicy::ResetCounters,
};

/// Result of checking an activity against its rules after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Threshold not reached yet.
    Continue,
    /// Threshold reached with sufficient accuracy.
    Advance,
    /// Threshold reached without sufficient accuracy; the remediation policy
    /// has been applied. Carries the score that triggered it.
    Remediate { correct: u32, attempts: u32 },
}

/// Counters and current question for the running activity.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityState {
    kind: ActivityKind,
    attempt_count: u32,
    correct_count: u32,
    current_prompt: Option<Prompt>,
}

impl ActivityState {
    pub fn new(kind: ActivityKind) -> Self {
        Self {
            kind,
            attempt_count: 0,
            correct_count: 0,
            current_prompt: None,
        }
    }

    pub fn kind(&self) -> ActivityKind {
        self.kind
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn current_prompt(&self) -> Option<&Prompt> {
        self.current_prompt.as_ref()
    }

    pub fn set_prompt(&mut self, prompt: Option<Prompt>) {
        self.current_prompt = prompt;
    }

    /// Switches to `kind`, clearing counters and prompt if the kind changes.
    pub fn switch_to(&mut self, kind: ActivityKind) {
        if self.kind != kind {
            *self = Self::new(kind);
        }
    }

    /// Counts one answer; `correct_count` can never overtake `attempt_count`.
    pub fn record_attempt(&mut self, is_correct: bool) {
        self.attempt_count += 1;
        if is_correct {
            self.correct_count += 1;
        }
    }

    /// Share of correct answers, `0.0` before the first attempt.
    pub fn accuracy(&self) -> f64 {
        if self.attempt_count == 0 {
            0.0
        } else {
            f64::from(self.correct_count) / f64::from(self.attempt_count)
        }
    }

    /// Checks the counters against `rules`, applying remediation when due.
    pub fn evaluate(&mut self, rules: &ActivityRules) -> Evaluation {
        if self.attempt_count < rules.threshold_attempts {
            return Evaluation::Continue;
        }
        if self.accuracy() >= rules.min_accuracy {
            return Evaluation::Advance;
        }

        let (correct, attempts) = (self.correct_count, self.attempt_count);
        match rules.remediation {
            RemediationPolicy::ResetCounters => {
                self.attempt_count = 0;
                self.correct_count = 0;
            }
            RemediationPolicy::RetryLast => {
                self.attempt_count = self.attempt_count.saturating_sub(1);
                self.correct_count = self.correct_count.min(self.attempt_count);
            }
        }
        Evaluation::Remediate { correct, attempts }
    }
}
