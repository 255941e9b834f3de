//! Conversation analysis.
//!
//! Folds stored turns into one text corpus and asks the language model for
//! a five-section critique. Only prompt text is analyzed: the point is
//! feedback on what the *user* said, not on generated answers.

use crate::chat::ChatClient;
use crate::error::AgentError;
use parlance_types::Conversation;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Sentinel for rubric sections the model did not return.
pub const NO_DATA: &str = "No data available.";

/// Fixed instruction for the five-section critique. Sections come back
/// numbered so the reply can be split positionally.
const ANALYSIS_RUBRIC: &str = "Analyze the following text for: \
1. Vocabulary richness: identify unique words, repetitive patterns, and the overall variation in word choice. \
2. Grammar mistakes: identify sentences with grammatical errors and suggest corrections. \
3. Improvements: suggest improvements to sentence structure and word choice for clarity and precision. \
4. Filler words: identify and list filler words or expressions (e.g. 'uh', 'um', 'like', 'you know'), including how often each occurs. \
5. Summary: give a brief summary of the overall analysis. \
Start each part of your answer with its section number followed by a period, and nothing else before the number.";

/// Structured result of one analysis pass. Field names follow the wire
/// contract the frontend already consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextAnalysis {
    #[serde(rename = "vocabularyRichness")]
    pub vocabulary_richness: String,
    #[serde(rename = "grammarMistakes")]
    pub grammar_mistakes: String,
    pub improvements: String,
    #[serde(rename = "fillerWords")]
    pub filler_words: String,
    pub summary: String,
    #[serde(rename = "wordCount")]
    pub word_count: usize,
}

impl TextAnalysis {
    fn empty(word_count: usize) -> Self {
        Self {
            vocabulary_richness: NO_DATA.to_string(),
            grammar_mistakes: NO_DATA.to_string(),
            improvements: NO_DATA.to_string(),
            filler_words: NO_DATA.to_string(),
            summary: NO_DATA.to_string(),
            word_count,
        }
    }
}

/// Joins every non-empty prompt text across the given conversations into a
/// single whitespace-separated corpus. Answers are excluded.
pub fn combine_conversations(conversations: &[Conversation]) -> String {
    let mut corpus = String::new();
    for conversation in conversations {
        for turn in &conversation.turns {
            let prompt = turn.prompt_text.trim();
            if prompt.is_empty() {
                continue;
            }
            if !corpus.is_empty() {
                corpus.push(' ');
            }
            corpus.push_str(prompt);
        }
    }
    corpus
}

/// Requests the five-section critique for `corpus` and parses the reply.
/// An empty corpus short-circuits to an all-sentinel result without calling
/// the model. Missing sections become [`NO_DATA`], never an error.
pub async fn analyze(chat: &ChatClient, corpus: &str) -> Result<TextAnalysis, AgentError> {
    let word_count = corpus.split_whitespace().count();
    if corpus.trim().is_empty() {
        return Ok(TextAnalysis::empty(0));
    }

    let reply = chat
        .complete_with_instructions(ANALYSIS_RUBRIC, corpus)
        .await?;

    let sections = split_sections(&reply);
    if sections.len() < 5 {
        tracing::warn!(
            sections = sections.len(),
            "analysis reply had fewer than five sections"
        );
    }
    let mut sections = sections.into_iter();
    let mut next = || sections.next().unwrap_or_else(|| NO_DATA.to_string());

    Ok(TextAnalysis {
        vocabulary_richness: next(),
        grammar_mistakes: next(),
        improvements: next(),
        filler_words: next(),
        summary: next(),
        word_count,
    })
}

/// Splits a model reply on leading section numbers (`1.`, `2)`, `**3.`),
/// stripping the numbering and surrounding markup from each section.
fn split_sections(reply: &str) -> Vec<String> {
    static SECTION_START: OnceLock<Regex> = OnceLock::new();
    let pattern = SECTION_START
        .get_or_init(|| Regex::new(r"(?m)^\s*(?:\*\*)?\d+\s*[.):]").expect("valid pattern"));

    let starts: Vec<usize> = pattern.find_iter(reply).map(|m| m.start()).collect();
    let mut sections = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(reply.len());
        sections.push(clean_section(&reply[start..end], pattern));
    }
    sections
}

fn clean_section(raw: &str, pattern: &Regex) -> String {
    let without_number = pattern.replace(raw, "");
    without_number
        .trim()
        .trim_start_matches("**")
        .trim_end_matches("**")
        .trim()
        .to_string()
}
