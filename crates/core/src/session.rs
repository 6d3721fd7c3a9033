//! Tutor Session
//!
//! Owns everything one learner's conversation needs (the engine, the session
//! state, the random source and the contextual responder) and turns each
//! utterance into a [`Command`] for the front end.

use crate::{
    Command,
    engine::{LessonProgressionEngine, TutorState, Turn},
    progress::LearnerProgress,
    responder::{ContextualResponder, FALLBACK_REPLY},
};
use rand::rngs::StdRng;
use std::sync::Arc;
use tracing::{info, warn};

pub struct TutorSession {
    engine: LessonProgressionEngine,
    state: TutorState,
    rng: StdRng,
    responder: Arc<dyn ContextualResponder>,
}

impl TutorSession {
    /// Starts a session for a new learner.
    pub fn new(
        engine: LessonProgressionEngine,
        responder: Arc<dyn ContextualResponder>,
        rng: StdRng,
    ) -> Self {
        Self::resume(engine, responder, rng, LearnerProgress::new())
    }

    /// Starts a session for a learner with existing progress.
    pub fn resume(
        engine: LessonProgressionEngine,
        responder: Arc<dyn ContextualResponder>,
        rng: StdRng,
        mut progress: LearnerProgress,
    ) -> Self {
        progress.begin_session();
        info!(
            lesson = progress.current_lesson(),
            session_count = progress.session_count(),
            "Tutor session started"
        );
        Self {
            engine,
            state: TutorState::new(progress),
            rng,
            responder,
        }
    }

    pub fn greeting(&self) -> String {
        self.engine.welcome(&self.state)
    }

    pub fn state(&self) -> &TutorState {
        &self.state
    }

    /// Handles one transcribed utterance.
    ///
    /// Responder failures never reach the caller; they are logged and answered
    /// with [`FALLBACK_REPLY`].
    pub async fn handle_utterance(&mut self, utterance: &str) -> Command {
        match self.engine.handle_turn(&mut self.state, &mut self.rng, utterance) {
            Turn::Respond(command) => command,
            Turn::Delegate => {
                let context = self.engine.response_context(&self.state);
                match self.responder.respond(&context, utterance.trim()).await {
                    Ok(reply) => Command::SpeakText(reply),
                    Err(e) => {
                        warn!(error = ?e, stage = %context.stage, "Contextual responder failed");
                        Command::SpeakText(FALLBACK_REPLY.to_string())
                    }
                }
            }
        }
    }
}
