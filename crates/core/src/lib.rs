pub mod activity;
pub mod command;
pub mod curriculum;
pub mod engine;
pub mod judge;
pub mod progress;
pub mod responder;
pub mod session;

/// Represents what the tutor asks the front end to do after a turn.
///
/// This enum decouples the tutoring logic from how the reply is delivered
/// (speech synthesis, a terminal, a chat window).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Speak or display the given text to the learner.
    SpeakText(String),
    /// The curriculum is finished; deliver the final message.
    SessionComplete(String),
}
