//! Intent matching engine.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use chrono::Local;
use rand::seq::IndexedRandom;

use crate::bot::calendar::{pregnancy_calendar, vaccination_calendar};
use crate::bot::{Corpus, EngineError, FollowUp, Intent};
use crate::chat::{BotReply, ChatError, ChatResponder};

/// Reply when no intent scores above the threshold.
pub const GUIDANCE_REPLY: &str = "Je peux vous aider sur la grossesse, le bébé, les visites \
     prénatales, l'alimentation ou la vaccination. Que souhaitez-vous savoir ?";

/// Minimum cosine similarity for an intent match.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.2;

/// TF-IDF intent matcher with per-conversation dialog state.
///
/// Patterns are vectorized once at construction; each incoming message is
/// vectorized with the same vocabulary and scored against every pattern by
/// cosine similarity. Matching an intent that carries a follow-up arms the
/// conversation so its next message is read as a date.
pub struct IntentEngine {
    intents: Vec<Intent>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    /// Sparse L2-normalized vector per pattern, term indices ascending.
    pattern_vectors: Vec<Vec<(usize, f64)>>,
    /// Index into `intents` for each pattern.
    pattern_intents: Vec<usize>,
    threshold: f64,
    /// Armed follow-ups keyed by conversation id.
    dialog: RwLock<HashMap<String, FollowUp>>,
}

impl std::fmt::Debug for IntentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentEngine")
            .field("intents", &self.intents.len())
            .field("patterns", &self.pattern_vectors.len())
            .field("vocabulary", &self.vocabulary.len())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl IntentEngine {
    /// Build an engine from a parsed corpus.
    pub fn from_corpus(corpus: Corpus, threshold: f64) -> Result<Self, EngineError> {
        if corpus.intents.is_empty() {
            return Err(EngineError::Empty);
        }
        let intents = corpus.intents;

        let mut pattern_tokens: Vec<Vec<String>> = Vec::new();
        let mut pattern_intents = Vec::new();
        for (intent_idx, intent) in intents.iter().enumerate() {
            for pattern in &intent.patterns {
                pattern_tokens.push(tokenize(pattern));
                pattern_intents.push(intent_idx);
            }
        }

        // Vocabulary and document frequencies over the patterns.
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();
        for tokens in &pattern_tokens {
            let mut seen: Vec<usize> = Vec::new();
            for token in tokens {
                let next_id = vocabulary.len();
                let id = *vocabulary.entry(token.clone()).or_insert(next_id);
                if id == document_frequency.len() {
                    document_frequency.push(0);
                }
                if !seen.contains(&id) {
                    seen.push(id);
                    document_frequency[id] += 1;
                }
            }
        }

        // Smoothed inverse document frequency.
        let n = pattern_tokens.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let pattern_vectors = pattern_tokens
            .iter()
            .map(|tokens| weigh(tokens, &vocabulary, &idf))
            .collect();

        Ok(Self {
            intents,
            vocabulary,
            idf,
            pattern_vectors,
            pattern_intents,
            threshold,
            dialog: RwLock::new(HashMap::new()),
        })
    }

    /// Build an engine from a corpus file.
    pub fn load_from_file(path: impl AsRef<Path>, threshold: f64) -> Result<Self, EngineError> {
        Self::from_corpus(Corpus::load(path)?, threshold)
    }

    /// Number of usable intents.
    #[must_use]
    pub fn intent_count(&self) -> usize {
        self.intents.len()
    }

    /// Best-matching intent for `message` with its cosine score.
    #[must_use]
    pub fn best_match(&self, message: &str) -> Option<(&Intent, f64)> {
        let query = weigh(&tokenize(message), &self.vocabulary, &self.idf);
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        for (pattern_idx, pattern) in self.pattern_vectors.iter().enumerate() {
            let score = dot(&query, pattern);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((pattern_idx, score));
            }
        }
        best.map(|(pattern_idx, score)| (&self.intents[self.pattern_intents[pattern_idx]], score))
    }

    /// Answer one message within a conversation.
    pub fn reply(&self, conversation_id: &str, message: &str) -> String {
        let armed = self.dialog.write().unwrap().remove(conversation_id);
        if let Some(follow_up) = armed {
            return match follow_up {
                FollowUp::DueDate => pregnancy_calendar(message, Local::now().date_naive()),
                FollowUp::BirthDate => vaccination_calendar(message),
            };
        }

        match self.best_match(message) {
            Some((intent, score)) if score > self.threshold => {
                tracing::debug!(tag = %intent.tag, score, "intent matched");
                if let Some(follow_up) = intent.follow_up {
                    self.dialog
                        .write()
                        .unwrap()
                        .insert(conversation_id.to_string(), follow_up);
                }
                intent
                    .responses
                    .choose(&mut rand::rng())
                    .cloned()
                    .unwrap_or_else(|| GUIDANCE_REPLY.to_string())
            }
            _ => GUIDANCE_REPLY.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ChatResponder for IntentEngine {
    async fn respond(&self, conversation_id: &str, message: &str) -> Result<BotReply, ChatError> {
        Ok(BotReply::text(self.reply(conversation_id, message)))
    }
}

/// Lowercase alphanumeric tokens.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sparse L2-normalized TF-IDF vector; tokens outside the vocabulary are
/// ignored. Indices ascend so [`dot`] can merge.
fn weigh(tokens: &[String], vocabulary: &HashMap<String, usize>, idf: &[f64]) -> Vec<(usize, f64)> {
    let mut counts: HashMap<usize, f64> = HashMap::new();
    for token in tokens {
        if let Some(&id) = vocabulary.get(token) {
            *counts.entry(id).or_insert(0.0) += 1.0;
        }
    }

    let mut vector: Vec<(usize, f64)> = counts
        .into_iter()
        .map(|(id, count)| (id, count * idf[id]))
        .collect();
    vector.sort_unstable_by_key(|&(id, _)| id);

    let norm = vector.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in &mut vector {
            *w /= norm;
        }
    }
    vector
}

/// Dot product of two index-sorted sparse vectors.
fn dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let mut sum = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::calendar::DATE_FORMAT_ERROR;

    fn engine() -> IntentEngine {
        let corpus = Corpus::from_json(
            r#"{"intents": [
                {"tag": "salutations",
                 "patterns": ["bonjour", "salut", "bonsoir"],
                 "responses": ["Bonjour ! Comment puis-je vous aider ?"]},
                {"tag": "visites_prenatales",
                 "patterns": ["quand faire les visites prénatales", "consultation prénatale"],
                 "responses": ["Quatre visites prénatales au minimum sont recommandées."]},
                {"tag": "calendrier_grossesse",
                 "patterns": ["calendrier de grossesse", "date accouchement"],
                 "responses": ["Quelle est la date prévue de votre accouchement ? (JJ/MM/AAAA)"],
                 "follow_up": "due_date"},
                {"tag": "calendrier_vaccination",
                 "patterns": ["calendrier de vaccination de mon enfant"],
                 "responses": ["Quelle est la date de naissance de votre enfant ? (JJ/MM/AAAA)"],
                 "follow_up": "birth_date"}
            ]}"#,
        )
        .unwrap();
        IntentEngine::from_corpus(corpus, DEFAULT_SCORE_THRESHOLD).unwrap()
    }

    #[test]
    fn exact_pattern_scores_high() {
        let engine = engine();
        let (intent, score) = engine.best_match("Bonjour").unwrap();
        assert_eq!(intent.tag, "salutations");
        assert!(score > 0.9, "score was {score}");
    }

    #[test]
    fn partial_overlap_still_matches() {
        let engine = engine();
        assert_eq!(
            engine.reply("c1", "les visites prénatales"),
            "Quatre visites prénatales au minimum sont recommandées."
        );
    }

    #[test]
    fn unknown_input_gets_guidance() {
        let engine = engine();
        assert_eq!(engine.reply("c1", "xyzzy plugh"), GUIDANCE_REPLY);
        assert_eq!(engine.reply("c1", "!!!"), GUIDANCE_REPLY);
    }

    #[test]
    fn due_date_follow_up_produces_pregnancy_calendar() {
        let engine = engine();
        let first = engine.reply("c1", "calendrier de grossesse");
        assert!(first.contains("date prévue"));

        let second = engine.reply("c1", "15/09/2026");
        assert!(second.contains("Date prévue d'accouchement : 15/09/2026"));

        // State is disarmed after one follow-up.
        assert_eq!(engine.reply("c1", "xyzzy plugh"), GUIDANCE_REPLY);
    }

    #[test]
    fn invalid_follow_up_date_is_reported_and_disarms() {
        let engine = engine();
        let _ = engine.reply("c1", "calendrier de grossesse");
        assert_eq!(engine.reply("c1", "pas une date"), DATE_FORMAT_ERROR);
        assert_eq!(engine.reply("c1", "xyzzy plugh"), GUIDANCE_REPLY);
    }

    #[test]
    fn follow_up_state_is_per_conversation() {
        let engine = engine();
        let _ = engine.reply("armed", "calendrier de vaccination de mon enfant");

        // The other conversation is unaffected by the armed follow-up.
        assert_eq!(engine.reply("other", "xyzzy plugh"), GUIDANCE_REPLY);

        let reply = engine.reply("armed", "01/01/2026");
        assert!(reply.contains("Calendrier de vaccination"));
    }
}
