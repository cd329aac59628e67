//! Intent corpus schema and loading.

use std::path::Path;

use serde::Deserialize;

use crate::bot::EngineError;

/// The whole corpus file: a list of intents.
#[derive(Debug, Clone, Deserialize)]
pub struct Corpus {
    /// Intents, in file order.
    #[serde(default)]
    pub intents: Vec<Intent>,
}

/// One intent: example phrasings and the responses they map to.
#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    /// Stable intent name.
    pub tag: String,
    /// Example phrasings matched against visitor messages.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Candidate responses; one is chosen at random.
    #[serde(default)]
    pub responses: Vec<String>,
    /// When set, matching this intent arms a date follow-up for the
    /// conversation's next message.
    #[serde(default)]
    pub follow_up: Option<FollowUp>,
}

/// Follow-up kinds an intent can arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUp {
    /// Next message is an expected delivery date (pregnancy calendar).
    DueDate,
    /// Next message is a child's birth date (vaccination calendar).
    BirthDate,
}

impl Corpus {
    /// Parse a corpus from JSON text, dropping unusable intents.
    ///
    /// An intent is unusable when its tag is blank, it has no responses, or
    /// none of its patterns contains text.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let mut corpus: Self = serde_json::from_str(text)?;
        corpus.intents.retain(|intent| {
            !intent.tag.trim().is_empty()
                && !intent.responses.is_empty()
                && intent.patterns.iter().any(|p| !p.trim().is_empty())
        });
        for intent in &mut corpus.intents {
            intent.patterns.retain(|p| !p.trim().is_empty());
        }
        if corpus.intents.is_empty() {
            return Err(EngineError::Empty);
        }
        Ok(corpus)
    }

    /// Load a corpus from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_unusable_intents() {
        let corpus = Corpus::from_json(
            r#"{"intents": [
                {"tag": "ok", "patterns": ["bonjour"], "responses": ["Bonjour !"]},
                {"tag": "", "patterns": ["x"], "responses": ["y"]},
                {"tag": "no_responses", "patterns": ["x"], "responses": []},
                {"tag": "blank_patterns", "patterns": ["", "  "], "responses": ["y"]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(corpus.intents.len(), 1);
        assert_eq!(corpus.intents[0].tag, "ok");
    }

    #[test]
    fn empty_corpus_is_an_error() {
        assert!(matches!(
            Corpus::from_json(r#"{"intents": []}"#),
            Err(EngineError::Empty)
        ));
    }

    #[test]
    fn follow_up_parses_from_snake_case() {
        let corpus = Corpus::from_json(
            r#"{"intents": [
                {"tag": "cal", "patterns": ["calendrier"], "responses": ["Quelle date ?"],
                 "follow_up": "due_date"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(corpus.intents[0].follow_up, Some(FollowUp::DueDate));
    }
}
