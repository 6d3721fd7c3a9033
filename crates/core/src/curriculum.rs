//! Curriculum Model and Loading
//!
//! This module defines the ordered set of lessons a learner works through and
//! the sources it can be loaded from. A curriculum is built once at startup and
//! is never mutated afterwards; lessons are addressed by their 1-based position.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// 1-based position of a lesson within a [`Curriculum`].
pub type LessonIndex = usize;

/// Errors raised while building or loading a curriculum.
#[derive(Debug, thiserror::Error)]
pub enum CurriculumError {
    #[error("Curriculum must contain at least one lesson")]
    Empty,
    #[error("Failed to read curriculum file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse curriculum: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A unit of content: vocabulary terms and example phrases.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Lesson {
    pub title: String,
    /// German term to English gloss.
    #[serde(default)]
    pub vocabulary: BTreeMap<String, String>,
    /// Ordered (German phrase, English gloss) pairs.
    #[serde(default)]
    pub phrases: Vec<(String, String)>,
}

impl Lesson {
    /// Creates a lesson with no vocabulary and no phrases.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            vocabulary: BTreeMap::new(),
            phrases: Vec::new(),
        }
    }

    pub fn with_vocabulary<'a>(
        mut self,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        self.vocabulary.extend(
            entries
                .into_iter()
                .map(|(term, gloss)| (term.to_string(), gloss.to_string())),
        );
        self
    }

    pub fn with_phrases<'a>(
        mut self,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        self.phrases.extend(
            entries
                .into_iter()
                .map(|(phrase, gloss)| (phrase.to_string(), gloss.to_string())),
        );
        self
    }
}

/// On-disk shape of a curriculum file.
#[derive(Deserialize)]
struct CurriculumFile {
    lessons: Vec<Lesson>,
}

/// The ordered, immutable list of lessons available to a learner.
#[derive(Debug, Clone, PartialEq)]
pub struct Curriculum {
    lessons: Vec<Lesson>,
}

impl Curriculum {
    /// Builds a curriculum, rejecting an empty lesson list.
    pub fn new(lessons: Vec<Lesson>) -> Result<Self, CurriculumError> {
        if lessons.is_empty() {
            return Err(CurriculumError::Empty);
        }
        Ok(Self { lessons })
    }

    /// Parses a curriculum from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, CurriculumError> {
        let file: CurriculumFile = serde_json::from_str(json)?;
        Self::new(file.lessons)
    }

    /// Number of lessons; always at least one.
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    /// Looks up a lesson by its 1-based index.
    pub fn lesson(&self, index: LessonIndex) -> Option<&Lesson> {
        index.checked_sub(1).and_then(|i| self.lessons.get(i))
    }

    /// The built-in five-lesson German curriculum.
    pub fn german_basics() -> Self {
        let lessons = vec![
            Lesson::new("Basic Greetings")
                .with_vocabulary([
                    ("Hallo", "Hello"),
                    ("Guten Morgen", "Good morning"),
                    ("Guten Tag", "Good day"),
                    ("Guten Abend", "Good evening"),
                    ("Auf Wiedersehen", "Goodbye"),
                    ("Tschüss", "Bye"),
                    ("Danke", "Thank you"),
                    ("Bitte", "Please/You're welcome"),
                ])
                .with_phrases([
                    ("Wie heißt du?", "What is your name?"),
                    ("Ich heiße...", "My name is..."),
                    ("Wie geht es dir?", "How are you?"),
                    ("Mir geht es gut", "I am doing well"),
                ]),
            Lesson::new("Numbers and Colors")
                .with_vocabulary([
                    ("eins", "one"),
                    ("zwei", "two"),
                    ("drei", "three"),
                    ("vier", "four"),
                    ("fünf", "five"),
                    ("rot", "red"),
                    ("blau", "blue"),
                    ("grün", "green"),
                    ("gelb", "yellow"),
                    ("schwarz", "black"),
                    ("weiß", "white"),
                ])
                .with_phrases([
                    ("Welche Farbe ist das?", "What color is this?"),
                    ("Das ist rot", "This is red"),
                    ("Wie viele sind das?", "How many are these?"),
                ]),
            Lesson::new("Family and People")
                .with_vocabulary([
                    ("Familie", "family"),
                    ("Mutter", "mother"),
                    ("Vater", "father"),
                    ("Bruder", "brother"),
                    ("Schwester", "sister"),
                    ("Kind", "child"),
                    ("Mann", "man"),
                    ("Frau", "woman"),
                    ("Freund", "friend"),
                ])
                .with_phrases([
                    ("Das ist meine Familie", "This is my family"),
                    ("Ich habe einen Bruder", "I have a brother"),
                    ("Meine Mutter ist nett", "My mother is nice"),
                ]),
            Lesson::new("Food and Drinks")
                .with_vocabulary([
                    ("Essen", "food"),
                    ("Trinken", "drink"),
                    ("Wasser", "water"),
                    ("Brot", "bread"),
                    ("Käse", "cheese"),
                    ("Fleisch", "meat"),
                    ("Obst", "fruit"),
                    ("Gemüse", "vegetables"),
                    ("Kaffee", "coffee"),
                    ("Tee", "tea"),
                ])
                .with_phrases([
                    ("Ich hätte gern...", "I would like..."),
                    ("Was möchten Sie trinken?", "What would you like to drink?"),
                    ("Das schmeckt gut", "That tastes good"),
                ]),
            Lesson::new("Shopping and Daily Life")
                .with_vocabulary([
                    ("kaufen", "to buy"),
                    ("Geschäft", "shop"),
                    ("Geld", "money"),
                    ("teuer", "expensive"),
                    ("billig", "cheap"),
                    ("Uhr", "clock/watch"),
                    ("Zeit", "time"),
                    ("heute", "today"),
                    ("morgen", "tomorrow"),
                    ("gestern", "yesterday"),
                ])
                .with_phrases([
                    ("Wie viel kostet das?", "How much does this cost?"),
                    ("Wo ist das Geschäft?", "Where is the shop?"),
                    ("Wie spät ist es?", "What time is it?"),
                ]),
        ];
        Self { lessons }
    }
}

/// Defines the contract for anything that can supply a curriculum at startup.
///
/// This lets the front end swap between the built-in lessons and a curriculum
/// file without the engine knowing where its content came from.
#[async_trait]
pub trait CurriculumSource: Send + Sync {
    async fn load(&self) -> Result<Curriculum, CurriculumError>;
}

/// Supplies [`Curriculum::german_basics`].
pub struct BuiltinCurriculumSource;

#[async_trait]
impl CurriculumSource for BuiltinCurriculumSource {
    async fn load(&self) -> Result<Curriculum, CurriculumError> {
        Ok(Curriculum::german_basics())
    }
}

/// Reads a curriculum from a JSON file of the form `{"lessons": [...]}`.
pub struct JsonFileCurriculumSource {
    path: PathBuf,
}

impl JsonFileCurriculumSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CurriculumSource for JsonFileCurriculumSource {
    async fn load(&self) -> Result<Curriculum, CurriculumError> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CurriculumError::Read {
                path: self.path.clone(),
                source,
            })?;
        let curriculum = Curriculum::from_json_str(&json)?;
        info!(
            path = %self.path.display(),
            lessons = curriculum.lesson_count(),
            "Loaded curriculum file"
        );
        Ok(curriculum)
    }
}
