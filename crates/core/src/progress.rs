//! Learner Progress
//!
//! Tracks which lesson a learner is on and which lessons are behind them.

use crate::curriculum::LessonIndex;
use std::collections::BTreeSet;

/// Where a single learner stands in the curriculum.
///
/// Lives for one process; nothing here is persisted. The fields are private so
/// that the current lesson can only move forward and a lesson can only be
/// marked completed by advancing past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerProgress {
    current_lesson: LessonIndex,
    completed_lessons: BTreeSet<LessonIndex>,
    session_count: u32,
}

impl Default for LearnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl LearnerProgress {
    /// A fresh learner positioned at lesson 1.
    pub fn new() -> Self {
        Self {
            current_lesson: 1,
            completed_lessons: BTreeSet::new(),
            session_count: 0,
        }
    }

    pub fn current_lesson(&self) -> LessonIndex {
        self.current_lesson
    }

    pub fn completed_lessons(&self) -> &BTreeSet<LessonIndex> {
        &self.completed_lessons
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn begin_session(&mut self) {
        self.session_count += 1;
    }

    /// Completes the current lesson and moves to the next one.
    ///
    /// Returns `false` without touching anything when the current lesson is
    /// already the last of `lesson_count`.
    pub fn advance(&mut self, lesson_count: usize) -> bool {
        if self.current_lesson < lesson_count {
            self.completed_lessons.insert(self.current_lesson);
            self.current_lesson += 1;
            true
        } else {
            false
        }
    }
}
