//! Lesson Progression Engine
//!
//! This module drives a learner through the curriculum. For the current lesson
//! it runs a vocabulary drill, then a phrase drill, then a free-form scenario,
//! and decides when each drill is passed and when the learner moves on to the
//! next lesson.
//!
//! The engine itself is stateless apart from the curriculum and the drill
//! rules. Everything that changes during a session lives in [`TutorState`],
//! which the caller owns and passes into every turn.

use crate::{
    Command,
    activity::{
        ActivityKind, ActivityRules, ActivityState, Evaluation, PHRASE_RULES, Prompt,
        RemediationPolicy, VOCABULARY_RULES,
    },
    command::TutorCommand,
    curriculum::{Curriculum, LessonIndex},
    judge::{judge_phrase_answer, judge_vocabulary_answer},
    progress::LearnerProgress,
    responder::ResponseContext,
};
use rand::{
    Rng,
    seq::{IndexedRandom, IteratorRandom},
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

const CURRICULUM_COMPLETE: &str = "Congratulations! You've completed all available lessons!";
const NOTHING_TO_REPEAT: &str = "Nothing to repeat right now. Try starting a lesson!";
const TRY_START_LESSON: &str = "Try 'start lesson' to begin learning!";

const HELP_TEXT: &str = "Here are the commands you can use:

• 'start lesson' - Begin the current lesson
• 'review' - Practice previous lessons
• 'next activity' or 'weiter' - Move to next activity
• 'repeat' or 'wieder' - Repeat current question
• 'progress' or 'fortschritt' - Show your progress
• 'help' or 'hilfe' - Show this help

Just speak naturally and I'll help you learn German step by step!";

/// Where the learner is within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Waiting for the learner to pick something to do.
    Introduction,
    Vocabulary,
    Phrase,
    /// Free-form conversation practice, handled by the contextual responder.
    Scenario,
    /// Vocabulary drill over an already completed lesson.
    Review { lesson: LessonIndex },
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Introduction => write!(f, "introduction"),
            Stage::Vocabulary => write!(f, "vocabulary practice"),
            Stage::Phrase => write!(f, "phrase practice"),
            Stage::Scenario => write!(f, "scenario practice"),
            Stage::Review { lesson } => write!(f, "review of lesson {}", lesson),
        }
    }
}

/// All mutable state of one learner's session.
#[derive(Debug, Clone, PartialEq)]
pub struct TutorState {
    pub progress: LearnerProgress,
    pub stage: Stage,
    pub activity: ActivityState,
}

impl Default for TutorState {
    fn default() -> Self {
        Self::new(LearnerProgress::new())
    }
}

impl TutorState {
    pub fn new(progress: LearnerProgress) -> Self {
        Self {
            progress,
            stage: Stage::Introduction,
            activity: ActivityState::new(ActivityKind::Vocabulary),
        }
    }
}

/// Outcome of a single turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    /// The engine produced the reply itself.
    Respond(Command),
    /// Nothing to judge or command to run; the caller should hand the
    /// utterance to the contextual responder.
    Delegate,
}

impl Turn {
    fn speak(text: impl Into<String>) -> Self {
        Turn::Respond(Command::SpeakText(text.into()))
    }
}

/// Runs the vocabulary → phrase → scenario progression over a curriculum.
#[derive(Debug, Clone)]
pub struct LessonProgressionEngine {
    curriculum: Arc<Curriculum>,
    vocabulary_rules: ActivityRules,
    phrase_rules: ActivityRules,
}

impl LessonProgressionEngine {
    /// Creates an engine with the default drill rules (5 words / 3 phrases at 60%).
    pub fn new(curriculum: Arc<Curriculum>) -> Self {
        Self {
            curriculum,
            vocabulary_rules: VOCABULARY_RULES,
            phrase_rules: PHRASE_RULES,
        }
    }

    pub fn with_rules(mut self, vocabulary: ActivityRules, phrase: ActivityRules) -> Self {
        self.vocabulary_rules = vocabulary;
        self.phrase_rules = phrase;
        self
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    // --- Core operations ---

    /// Samples one vocabulary entry of `lesson`, or of the current lesson if `None`.
    pub fn select_random_vocabulary_item<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        progress: &LearnerProgress,
        lesson: Option<LessonIndex>,
    ) -> Option<Prompt> {
        let lesson = self
            .curriculum
            .lesson(lesson.unwrap_or(progress.current_lesson()))?;
        lesson
            .vocabulary
            .iter()
            .choose(rng)
            .map(|(term, gloss)| Prompt::new(term.as_str(), gloss.as_str()))
    }

    /// Samples one phrase pair of `lesson`, or of the current lesson if `None`.
    pub fn select_random_phrase<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        progress: &LearnerProgress,
        lesson: Option<LessonIndex>,
    ) -> Option<Prompt> {
        let lesson = self
            .curriculum
            .lesson(lesson.unwrap_or(progress.current_lesson()))?;
        lesson.phrases.choose(rng).cloned().map(Prompt::from)
    }

    pub fn judge_vocabulary_answer(&self, user_text: &str, expected_gloss: &str) -> bool {
        judge_vocabulary_answer(user_text, expected_gloss)
    }

    pub fn judge_phrase_answer(&self, user_text: &str, expected_gloss: &str) -> bool {
        judge_phrase_answer(user_text, expected_gloss)
    }

    pub fn record_attempt(&self, activity: &mut ActivityState, is_correct: bool) {
        activity.record_attempt(is_correct);
    }

    /// True once the drill is passed. When the threshold is reached without
    /// enough accuracy the remediation policy of `rules` is applied to
    /// `activity` and `false` is returned.
    pub fn should_advance_activity(
        &self,
        activity: &mut ActivityState,
        rules: &ActivityRules,
    ) -> bool {
        activity.evaluate(rules) == Evaluation::Advance
    }

    /// Moves the learner to the next lesson. `false` once the curriculum is exhausted.
    pub fn advance_lesson(&self, progress: &mut LearnerProgress) -> bool {
        let completed = progress.current_lesson();
        let advanced = progress.advance(self.curriculum.lesson_count());
        if advanced {
            info!(
                completed,
                current = progress.current_lesson(),
                "Learner advanced to the next lesson"
            );
        } else {
            info!(lesson = completed, "Curriculum exhausted");
        }
        advanced
    }

    /// Samples one completed lesson for review.
    pub fn pick_review_lesson<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        progress: &LearnerProgress,
    ) -> Option<LessonIndex> {
        progress.completed_lessons().iter().copied().choose(rng)
    }

    // --- Turn handling ---

    /// The greeting spoken when a session opens.
    pub fn welcome(&self, state: &TutorState) -> String {
        let current = state.progress.current_lesson();
        let title = self
            .curriculum
            .lesson(current)
            .map(|l| l.title.as_str())
            .unwrap_or("Unknown");
        format!(
            "Guten Tag! I'm HANS, your German tutor.\n\nToday we're working on Lesson {}: {}.\n\nSay 'start lesson' to begin, 'review' to practice previous lessons, or 'help' for commands.",
            current, title
        )
    }

    /// Context handed to the contextual responder for delegated turns.
    pub fn response_context(&self, state: &TutorState) -> ResponseContext {
        ResponseContext {
            lesson_title: self
                .curriculum
                .lesson(state.progress.current_lesson())
                .map(|l| l.title.clone()),
            stage: state.stage,
        }
    }

    /// Processes one learner utterance.
    pub fn handle_turn<R: Rng + ?Sized>(
        &self,
        state: &mut TutorState,
        rng: &mut R,
        utterance: &str,
    ) -> Turn {
        let utterance = utterance.trim();
        // Scenario talk is free-form German; a keyword inside a sentence is not a command.
        let command = match state.stage {
            Stage::Scenario => TutorCommand::parse_exact(utterance),
            _ => TutorCommand::parse(utterance),
        };
        if let Some(command) = command {
            debug!(?command, stage = %state.stage, "Handling command");
            return self.handle_command(state, rng, command);
        }

        match state.stage {
            Stage::Introduction | Stage::Scenario => Turn::Delegate,
            Stage::Vocabulary => self.handle_vocabulary_answer(state, rng, utterance, None),
            Stage::Review { lesson } => {
                self.handle_vocabulary_answer(state, rng, utterance, Some(lesson))
            }
            Stage::Phrase => self.handle_phrase_answer(state, rng, utterance),
        }
    }

    fn handle_command<R: Rng + ?Sized>(
        &self,
        state: &mut TutorState,
        rng: &mut R,
        command: TutorCommand,
    ) -> Turn {
        match command {
            TutorCommand::StartLesson if state.stage == Stage::Scenario => {
                self.complete_lesson(state, rng)
            }
            TutorCommand::StartLesson => self.start_lesson(state, rng),
            TutorCommand::Review => self.start_review(state, rng),
            TutorCommand::NextActivity => match state.stage {
                Stage::Vocabulary => Turn::speak(self.start_phrase_practice(state, rng)),
                Stage::Phrase => Turn::speak(self.enter_scenario(state)),
                Stage::Scenario => self.complete_lesson(state, rng),
                Stage::Introduction | Stage::Review { .. } => Turn::speak(TRY_START_LESSON),
            },
            TutorCommand::Repeat => Turn::speak(self.repeat_current(state)),
            TutorCommand::Help => Turn::speak(HELP_TEXT),
            TutorCommand::Progress => Turn::speak(self.progress_report(state)),
        }
    }

    fn start_lesson<R: Rng + ?Sized>(&self, state: &mut TutorState, rng: &mut R) -> Turn {
        let index = state.progress.current_lesson();
        let Some(lesson) = self.curriculum.lesson(index) else {
            state.stage = Stage::Introduction;
            return Turn::Respond(Command::SessionComplete(CURRICULUM_COMPLETE.to_string()));
        };
        info!(lesson = index, title = %lesson.title, "Starting lesson");

        state.stage = Stage::Vocabulary;
        state.activity = ActivityState::new(ActivityKind::Vocabulary);

        let mut response = format!("Ausgezeichnet! Let's start Lesson {}: {}.", index, lesson.title);
        match self.select_random_vocabulary_item(rng, &state.progress, None) {
            Some(prompt) => {
                response.push_str(&format!(
                    "\n\nWe'll practice vocabulary first. I'll say a German word, and you tell me what it means in English. Ready?\n\nFirst word: {}",
                    prompt.source
                ));
                state.activity.set_prompt(Some(prompt));
            }
            None => {
                response.push_str(" This lesson has no vocabulary, so we'll go straight to phrases.\n\n");
                response.push_str(&self.start_phrase_practice(state, rng));
            }
        }
        Turn::speak(response)
    }

    fn start_review<R: Rng + ?Sized>(&self, state: &mut TutorState, rng: &mut R) -> Turn {
        let Some(lesson) = self.pick_review_lesson(rng, &state.progress) else {
            let fallback = self.start_lesson(state, rng);
            return match fallback {
                Turn::Respond(Command::SpeakText(text)) => Turn::speak(format!(
                    "You haven't completed any lessons yet! Let's start with Lesson {}.\n\n{}",
                    state.progress.current_lesson(),
                    text
                )),
                other => other,
            };
        };

        match self.select_random_vocabulary_item(rng, &state.progress, Some(lesson)) {
            Some(prompt) => {
                info!(lesson, "Starting review");
                let response = format!("Let's review Lesson {}! What does {} mean?", lesson, prompt.source);
                state.stage = Stage::Review { lesson };
                state.activity = ActivityState::new(ActivityKind::Vocabulary);
                state.activity.set_prompt(Some(prompt));
                Turn::speak(response)
            }
            None => {
                state.stage = Stage::Introduction;
                Turn::speak(format!(
                    "Lesson {} has no vocabulary to review. {}",
                    lesson, TRY_START_LESSON
                ))
            }
        }
    }

    /// Switches to the phrase drill and returns its opening line.
    fn start_phrase_practice<R: Rng + ?Sized>(&self, state: &mut TutorState, rng: &mut R) -> String {
        match self.select_random_phrase(rng, &state.progress, None) {
            Some(prompt) => {
                let response = format!("Now let's practice phrases! What does this mean: {}", prompt.source);
                state.stage = Stage::Phrase;
                state.activity = ActivityState::new(ActivityKind::Phrase);
                state.activity.set_prompt(Some(prompt));
                response
            }
            None => self.enter_scenario(state),
        }
    }

    fn enter_scenario(&self, state: &mut TutorState) -> String {
        state.stage = Stage::Scenario;
        state.activity.switch_to(ActivityKind::Scenario);
        "Ready for a scenario? I'll create a real-life situation for you to practice! Say 'next activity' when you're ready to finish the lesson.".to_string()
    }

    /// Leaves the scenario: advances the curriculum and opens the next lesson.
    fn complete_lesson<R: Rng + ?Sized>(&self, state: &mut TutorState, rng: &mut R) -> Turn {
        let finished = state.progress.current_lesson();
        if !self.advance_lesson(&mut state.progress) {
            state.stage = Stage::Introduction;
            state.activity = ActivityState::new(ActivityKind::Vocabulary);
            return Turn::Respond(Command::SessionComplete(CURRICULUM_COMPLETE.to_string()));
        }
        match self.start_lesson(state, rng) {
            Turn::Respond(Command::SpeakText(text)) => Turn::speak(format!(
                "Wunderbar! Lesson {} is complete.\n\n{}",
                finished, text
            )),
            other => other,
        }
    }

    fn handle_vocabulary_answer<R: Rng + ?Sized>(
        &self,
        state: &mut TutorState,
        rng: &mut R,
        utterance: &str,
        review: Option<LessonIndex>,
    ) -> Turn {
        let Some(prompt) = state.activity.current_prompt().cloned() else {
            debug!("No vocabulary prompt pending, restarting lesson");
            return self.start_lesson(state, rng);
        };

        let is_correct = self.judge_vocabulary_answer(utterance, &prompt.expected);
        self.record_attempt(&mut state.activity, is_correct);
        debug!(
            is_correct,
            attempts = state.activity.attempt_count(),
            correct = state.activity.correct_count(),
            "Recorded vocabulary attempt"
        );

        let (term, gloss) = (&prompt.source, &prompt.expected);
        let mut response = match (is_correct, rng.random_range(0..3)) {
            (true, 0) => format!("Richtig! {} means {}.", term, gloss),
            (true, 1) => format!("Sehr gut! Yes, {} is {}.", term, gloss),
            (true, _) => format!("Perfect! {} is correct for {}.", gloss, term),
            (false, 0) => format!("Not quite! {} means {}. Try to remember that!", term, gloss),
            (false, 1) => format!("Nein, {} means {}. Let's keep practicing!", term, gloss),
            (false, _) => format!("Close, but {} actually means {}.", term, gloss),
        };

        let (correct, attempts) = (state.activity.correct_count(), state.activity.attempt_count());
        match state.activity.evaluate(&self.vocabulary_rules) {
            Evaluation::Advance => {
                match review {
                    None => {
                        response.push_str(&format!(
                            "\n\nGreat job! You got {} out of {} correct. Let's move to phrases now!\n\n",
                            correct, attempts
                        ));
                        response.push_str(&self.start_phrase_practice(state, rng));
                    }
                    Some(lesson) => {
                        info!(lesson, correct, attempts, "Review complete");
                        state.stage = Stage::Introduction;
                        state.activity = ActivityState::new(ActivityKind::Vocabulary);
                        response.push_str(&format!(
                            "\n\nReview complete! You got {} out of {} correct. Say 'start lesson' to continue with Lesson {}.",
                            correct,
                            attempts,
                            state.progress.current_lesson()
                        ));
                    }
                }
                return Turn::speak(response);
            }
            Evaluation::Remediate { correct, attempts } => {
                info!(correct, attempts, "Vocabulary accuracy too low, repeating drill");
                response.push_str(&remediation_message(
                    self.vocabulary_rules.remediation,
                    correct,
                    attempts,
                    "words",
                ));
            }
            Evaluation::Continue => {}
        }

        let next = self.select_random_vocabulary_item(rng, &state.progress, review);
        if let Some(next) = &next {
            response.push_str(&format!("\n\nNext word: {}", next.source));
        }
        state.activity.set_prompt(next);
        Turn::speak(response)
    }

    fn handle_phrase_answer<R: Rng + ?Sized>(
        &self,
        state: &mut TutorState,
        rng: &mut R,
        utterance: &str,
    ) -> Turn {
        let Some(prompt) = state.activity.current_prompt().cloned() else {
            debug!("No phrase prompt pending, restarting phrase practice");
            return Turn::speak(self.start_phrase_practice(state, rng));
        };

        let is_correct = self.judge_phrase_answer(utterance, &prompt.expected);
        self.record_attempt(&mut state.activity, is_correct);
        debug!(
            is_correct,
            attempts = state.activity.attempt_count(),
            correct = state.activity.correct_count(),
            "Recorded phrase attempt"
        );

        let mut response = if is_correct {
            format!("Excellent! '{}' means '{}'", prompt.source, prompt.expected)
        } else {
            format!(
                "Not quite. '{}' means '{}'. The key words to remember are the main concepts!",
                prompt.source, prompt.expected
            )
        };

        let (correct, attempts) = (state.activity.correct_count(), state.activity.attempt_count());
        match state.activity.evaluate(&self.phrase_rules) {
            Evaluation::Advance => {
                response.push_str(&format!(
                    "\n\nWunderbar! You got {} out of {} correct.\n\n",
                    correct, attempts
                ));
                response.push_str(&self.enter_scenario(state));
                return Turn::speak(response);
            }
            Evaluation::Remediate { correct, attempts } => {
                info!(correct, attempts, "Phrase accuracy too low, repeating drill");
                response.push_str(&remediation_message(
                    self.phrase_rules.remediation,
                    correct,
                    attempts,
                    "phrases",
                ));
            }
            Evaluation::Continue => {}
        }

        let next = self.select_random_phrase(rng, &state.progress, None);
        if let Some(next) = &next {
            response.push_str(&format!("\n\nNext phrase: {}", next.source));
        }
        state.activity.set_prompt(next);
        Turn::speak(response)
    }

    fn repeat_current(&self, state: &TutorState) -> String {
        match (state.stage, state.activity.current_prompt()) {
            (Stage::Vocabulary | Stage::Review { .. }, Some(prompt)) => {
                format!("The word is: {}", prompt.source)
            }
            (Stage::Phrase, Some(prompt)) => format!("The phrase is: {}", prompt.source),
            _ => NOTHING_TO_REPEAT.to_string(),
        }
    }

    fn progress_report(&self, state: &TutorState) -> String {
        let progress = &state.progress;
        let title = self
            .curriculum
            .lesson(progress.current_lesson())
            .map(|l| l.title.as_str())
            .unwrap_or("Completed!");
        format!(
            "Your German Learning Progress:\n\nCurrent Lesson: {} - {}\nCompleted Lessons: {}\nTotal Lessons Available: {}\nSessions: {}\n\nKeep up the great work! Weiter so!",
            progress.current_lesson(),
            title,
            progress.completed_lessons().len(),
            self.curriculum.lesson_count(),
            progress.session_count()
        )
    }
}

fn remediation_message(policy: RemediationPolicy, correct: u32, attempts: u32, noun: &str) -> String {
    match policy {
        RemediationPolicy::ResetCounters => format!(
            "\n\nYou got {} out of {}. Let's practice a few more {}!",
            correct, attempts, noun
        ),
        RemediationPolicy::RetryLast => {
            "\n\nLet's practice one more to solidify this!".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::Lesson;
    use rand::{SeedableRng, rngs::StdRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn two_lesson_engine() -> LessonProgressionEngine {
        let curriculum = Curriculum::new(vec![
            Lesson::new("Greetings")
                .with_vocabulary([("Hallo", "Hello")])
                .with_phrases([("Mir geht es gut", "I am doing well")]),
            Lesson::new("Colors")
                .with_vocabulary([("rot", "red")])
                .with_phrases([("Das ist rot", "This is red")]),
        ])
        .unwrap();
        LessonProgressionEngine::new(Arc::new(curriculum))
    }

    fn text(turn: &Turn) -> &str {
        match turn {
            Turn::Respond(Command::SpeakText(text)) | Turn::Respond(Command::SessionComplete(text)) => {
                text.as_str()
            }
            Turn::Delegate => panic!("Expected a response, got Delegate"),
        }
    }

    #[test]
    fn test_select_vocabulary_returns_known_terms() {
        let engine = LessonProgressionEngine::new(Arc::new(Curriculum::german_basics()));
        let progress = LearnerProgress::new();
        let mut rng = rng();
        for index in 1..=engine.curriculum().lesson_count() {
            let lesson = engine.curriculum().lesson(index).unwrap();
            for _ in 0..25 {
                let prompt = engine
                    .select_random_vocabulary_item(&mut rng, &progress, Some(index))
                    .unwrap();
                assert_eq!(lesson.vocabulary.get(&prompt.source), Some(&prompt.expected));
            }
        }
    }

    #[test]
    fn test_select_defaults_to_current_lesson() {
        let engine = two_lesson_engine();
        let mut progress = LearnerProgress::new();
        progress.advance(2);
        let prompt = engine
            .select_random_vocabulary_item(&mut rng(), &progress, None)
            .unwrap();
        assert_eq!(prompt, Prompt::new("rot", "red"));
        let phrase = engine.select_random_phrase(&mut rng(), &progress, None).unwrap();
        assert_eq!(phrase, Prompt::new("Das ist rot", "This is red"));
    }

    #[test]
    fn test_select_missing_data_is_none() {
        let curriculum = Curriculum::new(vec![Lesson::new("Empty")]).unwrap();
        let engine = LessonProgressionEngine::new(Arc::new(curriculum));
        let progress = LearnerProgress::new();
        let mut rng = rng();
        assert!(engine.select_random_vocabulary_item(&mut rng, &progress, None).is_none());
        assert!(engine.select_random_phrase(&mut rng, &progress, None).is_none());
        assert!(engine.select_random_vocabulary_item(&mut rng, &progress, Some(9)).is_none());
    }

    #[test]
    fn test_should_advance_activity_thresholds() {
        let engine = two_lesson_engine();

        let mut passing = ActivityState::new(ActivityKind::Vocabulary);
        for correct in [true, true, true, false, false] {
            engine.record_attempt(&mut passing, correct);
        }
        assert!(engine.should_advance_activity(&mut passing, &VOCABULARY_RULES));

        let mut failing = ActivityState::new(ActivityKind::Vocabulary);
        for correct in [true, true, false, false, false] {
            engine.record_attempt(&mut failing, correct);
        }
        assert!(!engine.should_advance_activity(&mut failing, &VOCABULARY_RULES));
        assert_eq!(failing.attempt_count(), 0);
        assert_eq!(failing.correct_count(), 0);
    }

    #[test]
    fn test_advance_lesson_stops_at_end() {
        let engine = LessonProgressionEngine::new(Arc::new(Curriculum::german_basics()));
        let mut progress = LearnerProgress::new();
        for _ in 0..4 {
            assert!(engine.advance_lesson(&mut progress));
        }
        assert_eq!(progress.current_lesson(), 5);
        assert!(!engine.advance_lesson(&mut progress));
        assert!(!engine.advance_lesson(&mut progress));
        assert_eq!(progress.current_lesson(), 5);
        assert_eq!(progress.completed_lessons().len(), 4);
    }

    #[test]
    fn test_pick_review_lesson_from_completed() {
        let engine = LessonProgressionEngine::new(Arc::new(Curriculum::german_basics()));
        let mut progress = LearnerProgress::new();
        let mut rng = rng();
        assert!(engine.pick_review_lesson(&mut rng, &progress).is_none());

        engine.advance_lesson(&mut progress);
        engine.advance_lesson(&mut progress);
        for _ in 0..20 {
            let lesson = engine.pick_review_lesson(&mut rng, &progress).unwrap();
            assert!(lesson == 1 || lesson == 2);
        }
    }

    #[test]
    fn test_vocabulary_drill_passes_to_phrases() {
        let engine = two_lesson_engine();
        let mut state = TutorState::default();
        let mut rng = rng();

        let turn = engine.handle_turn(&mut state, &mut rng, "start lesson");
        assert!(text(&turn).contains("First word: Hallo"));
        assert_eq!(state.stage, Stage::Vocabulary);

        for _ in 0..4 {
            engine.handle_turn(&mut state, &mut rng, "hello");
            assert_eq!(state.stage, Stage::Vocabulary);
        }
        let turn = engine.handle_turn(&mut state, &mut rng, "hello");
        assert!(text(&turn).contains("You got 5 out of 5 correct"));
        assert_eq!(state.stage, Stage::Phrase);
        assert_eq!(state.activity.kind(), ActivityKind::Phrase);
        assert_eq!(state.activity.attempt_count(), 0);
        assert_eq!(
            state.activity.current_prompt(),
            Some(&Prompt::new("Mir geht es gut", "I am doing well"))
        );
    }

    #[test]
    fn test_vocabulary_remediation_resets_and_stays() {
        let engine = two_lesson_engine();
        let mut state = TutorState::default();
        let mut rng = rng();
        engine.handle_turn(&mut state, &mut rng, "begin");

        let mut last = Turn::Delegate;
        for _ in 0..5 {
            last = engine.handle_turn(&mut state, &mut rng, "no idea");
        }
        assert!(text(&last).contains("You got 0 out of 5"));
        assert!(text(&last).contains("Next word: Hallo"));
        assert_eq!(state.stage, Stage::Vocabulary);
        assert_eq!(state.activity.attempt_count(), 0);
        assert_eq!(state.activity.correct_count(), 0);
    }

    #[test]
    fn test_phrase_drill_passes_to_scenario() {
        let engine = two_lesson_engine();
        let mut state = TutorState::default();
        let mut rng = rng();
        engine.handle_turn(&mut state, &mut rng, "start lesson");
        engine.handle_turn(&mut state, &mut rng, "weiter");
        assert_eq!(state.stage, Stage::Phrase);

        engine.handle_turn(&mut state, &mut rng, "i am fine");
        engine.handle_turn(&mut state, &mut rng, "xyz");
        let turn = engine.handle_turn(&mut state, &mut rng, "am good");
        assert!(text(&turn).contains("You got 2 out of 3 correct"));
        assert_eq!(state.stage, Stage::Scenario);
        assert_eq!(state.activity.kind(), ActivityKind::Scenario);
    }

    #[test]
    fn test_phrase_retry_last_policy() {
        let retry = ActivityRules {
            remediation: RemediationPolicy::RetryLast,
            ..PHRASE_RULES
        };
        let engine = two_lesson_engine().with_rules(VOCABULARY_RULES, retry);
        let mut state = TutorState::default();
        let mut rng = rng();
        engine.handle_turn(&mut state, &mut rng, "start lesson");
        engine.handle_turn(&mut state, &mut rng, "next activity");

        for _ in 0..3 {
            engine.handle_turn(&mut state, &mut rng, "xyz");
        }
        assert_eq!(state.stage, Stage::Phrase);
        assert_eq!(state.activity.attempt_count(), 2);
        assert_eq!(state.activity.correct_count(), 0);
    }

    #[test]
    fn test_next_activity_walks_through_lesson() {
        let engine = two_lesson_engine();
        let mut state = TutorState::default();
        let mut rng = rng();

        let turn = engine.handle_turn(&mut state, &mut rng, "next activity");
        assert_eq!(text(&turn), TRY_START_LESSON);

        engine.handle_turn(&mut state, &mut rng, "start lesson");
        engine.handle_turn(&mut state, &mut rng, "next activity");
        assert_eq!(state.stage, Stage::Phrase);
        engine.handle_turn(&mut state, &mut rng, "next activity");
        assert_eq!(state.stage, Stage::Scenario);

        let turn = engine.handle_turn(&mut state, &mut rng, "next activity");
        assert!(text(&turn).contains("Lesson 1 is complete"));
        assert!(text(&turn).contains("Lesson 2: Colors"));
        assert_eq!(state.stage, Stage::Vocabulary);
        assert_eq!(state.progress.current_lesson(), 2);
        assert!(state.progress.completed_lessons().contains(&1));
    }

    #[test]
    fn test_scenario_of_last_lesson_completes_curriculum() {
        let engine = two_lesson_engine();
        let mut state = TutorState::default();
        state.progress.advance(2);
        let mut rng = rng();

        engine.handle_turn(&mut state, &mut rng, "start lesson");
        engine.handle_turn(&mut state, &mut rng, "weiter");
        engine.handle_turn(&mut state, &mut rng, "weiter");
        assert_eq!(state.stage, Stage::Scenario);

        let before = state.progress.clone();
        let turn = engine.handle_turn(&mut state, &mut rng, "start lesson");
        assert_eq!(
            turn,
            Turn::Respond(Command::SessionComplete(CURRICULUM_COMPLETE.to_string()))
        );
        assert_eq!(state.progress, before);
        assert_eq!(state.stage, Stage::Introduction);
    }

    #[test]
    fn test_phrase_remediation_resets_counters() {
        let engine = two_lesson_engine();
        let mut state = TutorState::default();
        let mut rng = rng();
        engine.handle_turn(&mut state, &mut rng, "start lesson");
        engine.handle_turn(&mut state, &mut rng, "weiter");

        let mut last = Turn::Delegate;
        for _ in 0..3 {
            last = engine.handle_turn(&mut state, &mut rng, "xyz");
        }
        assert!(text(&last).contains("You got 0 out of 3. Let's practice a few more phrases!"));
        assert!(text(&last).contains("Next phrase: Mir geht es gut"));
        assert_eq!(state.stage, Stage::Phrase);
        assert_eq!(state.activity.attempt_count(), 0);
        assert_eq!(state.activity.correct_count(), 0);
    }

    #[test]
    fn test_scenario_keeps_german_containing_keywords() {
        let engine = two_lesson_engine();
        let mut state = TutorState::default();
        let mut rng = rng();
        engine.handle_turn(&mut state, &mut rng, "start lesson");
        engine.handle_turn(&mut state, &mut rng, "weiter");
        engine.handle_turn(&mut state, &mut rng, "weiter");
        assert_eq!(state.stage, Stage::Scenario);

        for utterance in [
            "Wir beginnen jetzt",
            "Auf Wiedersehen!",
            "Können wir weitermachen?",
            "Hilfe, ich verstehe das nicht",
        ] {
            assert_eq!(engine.handle_turn(&mut state, &mut rng, utterance), Turn::Delegate);
            assert_eq!(state.stage, Stage::Scenario);
            assert_eq!(state.progress.current_lesson(), 1);
            assert!(state.progress.completed_lessons().is_empty());
        }

        let turn = engine.handle_turn(&mut state, &mut rng, "Weiter!");
        assert!(text(&turn).contains("Lesson 1 is complete"));
        assert_eq!(state.progress.current_lesson(), 2);
    }

    #[test]
    fn test_unmatched_input_is_delegated_outside_drills() {
        let engine = two_lesson_engine();
        let mut state = TutorState::default();
        let mut rng = rng();
        assert_eq!(engine.handle_turn(&mut state, &mut rng, "wie geht's?"), Turn::Delegate);

        state.stage = Stage::Scenario;
        assert_eq!(
            engine.handle_turn(&mut state, &mut rng, "Ich hätte gern einen Kaffee"),
            Turn::Delegate
        );
    }

    #[test]
    fn test_review_without_completed_lessons_starts_lesson() {
        let engine = two_lesson_engine();
        let mut state = TutorState::default();
        let turn = engine.handle_turn(&mut state, &mut rng(), "review");
        assert!(text(&turn).starts_with("You haven't completed any lessons yet!"));
        assert_eq!(state.stage, Stage::Vocabulary);
        assert_eq!(state.progress.current_lesson(), 1);
    }

    #[test]
    fn test_review_drill_returns_to_introduction() {
        let engine = two_lesson_engine();
        let mut state = TutorState::default();
        state.progress.advance(2);
        let mut rng = rng();

        let turn = engine.handle_turn(&mut state, &mut rng, "review");
        assert_eq!(text(&turn), "Let's review Lesson 1! What does Hallo mean?");
        assert_eq!(state.stage, Stage::Review { lesson: 1 });

        let turn = engine.handle_turn(&mut state, &mut rng, "repeat please");
        assert_eq!(text(&turn), "The word is: Hallo");

        let mut last = Turn::Delegate;
        for _ in 0..5 {
            last = engine.handle_turn(&mut state, &mut rng, "hello");
        }
        assert!(text(&last).contains("Review complete!"));
        assert_eq!(state.stage, Stage::Introduction);
        assert_eq!(state.progress.current_lesson(), 2);
    }

    #[test]
    fn test_review_remediation_stays_in_review() {
        let engine = two_lesson_engine();
        let mut state = TutorState::default();
        state.progress.advance(2);
        let mut rng = rng();
        engine.handle_turn(&mut state, &mut rng, "review");

        let mut last = Turn::Delegate;
        for _ in 0..5 {
            last = engine.handle_turn(&mut state, &mut rng, "keine Ahnung");
        }
        assert!(text(&last).contains("You got 0 out of 5. Let's practice a few more words!"));
        assert!(text(&last).contains("Next word: Hallo"));
        assert_eq!(state.stage, Stage::Review { lesson: 1 });
        assert_eq!(state.activity.attempt_count(), 0);
        assert_eq!(state.progress.current_lesson(), 2);
    }

    #[test]
    fn test_answer_without_prompt_restarts_lesson() {
        let engine = two_lesson_engine();
        let mut state = TutorState::default();
        state.stage = Stage::Vocabulary;

        let turn = engine.handle_turn(&mut state, &mut rng(), "hello");
        assert!(text(&turn).contains("Let's start Lesson 1"));
        assert_eq!(state.activity.attempt_count(), 0);
        assert!(state.activity.current_prompt().is_some());
    }

    #[test]
    fn test_lesson_without_content_skips_ahead() {
        let curriculum = Curriculum::new(vec![
            Lesson::new("Phrases only").with_phrases([("Guten Appetit", "Enjoy your meal")]),
            Lesson::new("Nothing"),
        ])
        .unwrap();
        let engine = LessonProgressionEngine::new(Arc::new(curriculum));
        let mut state = TutorState::default();
        let mut rng = rng();

        engine.handle_turn(&mut state, &mut rng, "start lesson");
        assert_eq!(state.stage, Stage::Phrase);

        state.progress.advance(2);
        engine.handle_turn(&mut state, &mut rng, "start lesson");
        assert_eq!(state.stage, Stage::Scenario);
    }

    #[test]
    fn test_repeat_and_progress() {
        let engine = two_lesson_engine();
        let mut state = TutorState::default();
        let mut rng = rng();

        let turn = engine.handle_turn(&mut state, &mut rng, "repeat");
        assert_eq!(text(&turn), NOTHING_TO_REPEAT);

        engine.handle_turn(&mut state, &mut rng, "start lesson");
        engine.handle_turn(&mut state, &mut rng, "weiter");
        let turn = engine.handle_turn(&mut state, &mut rng, "repeat");
        assert_eq!(text(&turn), "The phrase is: Mir geht es gut");

        let turn = engine.handle_turn(&mut state, &mut rng, "fortschritt");
        assert!(text(&turn).contains("Current Lesson: 1 - Greetings"));
        assert!(text(&turn).contains("Total Lessons Available: 2"));
    }

    #[test]
    fn test_welcome_names_current_lesson() {
        let engine = LessonProgressionEngine::new(Arc::new(Curriculum::german_basics()));
        let welcome = engine.welcome(&TutorState::default());
        assert!(welcome.contains("Lesson 1: Basic Greetings"));
    }
}
