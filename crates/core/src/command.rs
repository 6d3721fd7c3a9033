//! Learner Commands
//!
//! Control words the learner can say instead of an answer. Outside the
//! free-form scenario a keyword anywhere in the utterance counts; inside it
//! only an utterance that is a keyword on its own does, so ordinary German
//! such as "Wir beginnen" or "Auf Wiedersehen" stays part of the conversation.

/// Control commands the learner can say at any point of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorCommand {
    StartLesson,
    Review,
    NextActivity,
    Repeat,
    Help,
    Progress,
}

// Checked in order; the first keyword contained in the utterance wins.
const KEYWORDS: &[(&str, TutorCommand)] = &[
    ("start lesson", TutorCommand::StartLesson),
    ("begin", TutorCommand::StartLesson),
    ("review", TutorCommand::Review),
    ("next activity", TutorCommand::NextActivity),
    ("weiter", TutorCommand::NextActivity),
    ("repeat", TutorCommand::Repeat),
    ("wieder", TutorCommand::Repeat),
    ("help", TutorCommand::Help),
    ("hilfe", TutorCommand::Help),
    ("progress", TutorCommand::Progress),
    ("fortschritt", TutorCommand::Progress),
];

impl TutorCommand {
    /// Recognizes a command by case-insensitive substring match.
    ///
    /// Returns `None` for anything else, which the caller treats as an answer
    /// or hands to the contextual responder.
    pub fn parse(utterance: &str) -> Option<Self> {
        let text = utterance.trim().to_lowercase();
        KEYWORDS
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
            .map(|&(_, command)| command)
    }

    /// Recognizes a command only when the whole utterance is a keyword,
    /// ignoring case and trailing punctuation.
    pub fn parse_exact(utterance: &str) -> Option<Self> {
        let text = utterance
            .trim()
            .trim_end_matches(['.', '!', '?'])
            .trim_end()
            .to_lowercase();
        KEYWORDS
            .iter()
            .find(|(keyword, _)| text == *keyword)
            .map(|&(_, command)| command)
    }
}
