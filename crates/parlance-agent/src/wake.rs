//! Wake-phrase segmentation.
//!
//! A transcription is split around the trigger phrase "hi speech AI": text
//! before the phrase is logged silently, text after it is answered by the
//! language model. Transcription engines mangle the phrase in predictable
//! ways ("hai", "h i", "speach", "a.i."), so the match is deliberately
//! tolerant.

use regex::Regex;

/// The spoken command that terminates the current conversation. Matched
/// case-insensitively against the whole trimmed transcription, before any
/// segmentation happens.
pub const END_COMMAND: &str = "end conversation";

/// Outcome of splitting one transcription around the wake phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    /// Text before the wake phrase (or the whole input if absent), trimmed.
    pub logged: String,
    /// Text after the wake phrase, trimmed. Empty when the phrase is absent
    /// or nothing follows it.
    pub answer: String,
    /// Whether the language model should be invoked for this snippet.
    pub should_answer: bool,
}

#[derive(Debug, Clone)]
pub struct WakePhraseSegmenter {
    pattern: Regex,
}

impl Default for WakePhraseSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl WakePhraseSegmenter {
    pub fn new() -> Self {
        // Tolerated variants: "hi"/"hai"/"h i", "speech"/"speach",
        // "ai"/"a i"/"a.i.".
        let pattern = Regex::new(r"(?i)\b(?:hi|hai|h\s+i)[\s,]+spe+a?ch[\s,]+a\.?\s*i\b\.?")
            .expect("wake-phrase pattern is valid");
        Self { pattern }
    }

    /// True when the transcription is the conversation-termination command.
    pub fn is_end_command(text: &str) -> bool {
        text.trim().eq_ignore_ascii_case(END_COMMAND)
    }

    /// Splits `transcript` around the first wake-phrase occurrence. Without
    /// a match the whole trimmed text is logged and nothing is answered.
    pub fn segment(&self, transcript: &str) -> Segmentation {
        match self.pattern.find(transcript) {
            Some(found) => {
                let logged = transcript[..found.start()].trim().to_string();
                let answer = transcript[found.end()..].trim().to_string();
                let should_answer = !answer.is_empty();
                Segmentation {
                    logged,
                    answer,
                    should_answer,
                }
            }
            None => Segmentation {
                logged: transcript.trim().to_string(),
                answer: String::new(),
                should_answer: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter() -> WakePhraseSegmenter {
        WakePhraseSegmenter::new()
    }

    #[test]
    fn splits_around_wake_phrase() {
        let s = segmenter().segment("hello there hi speech ai please translate this");
        assert_eq!(s.logged, "hello there");
        assert_eq!(s.answer, "please translate this");
        assert!(s.should_answer);
    }

    #[test]
    fn no_wake_phrase_logs_everything() {
        let s = segmenter().segment("  just talking to myself  ");
        assert_eq!(s.logged, "just talking to myself");
        assert_eq!(s.answer, "");
        assert!(!s.should_answer);
    }

    #[test]
    fn wake_phrase_with_nothing_after_does_not_answer() {
        let s = segmenter().segment("some preamble hi speech ai");
        assert_eq!(s.logged, "some preamble");
        assert_eq!(s.answer, "");
        assert!(!s.should_answer);
    }

    #[test]
    fn wake_phrase_at_start_has_empty_logged_segment() {
        let s = segmenter().segment("hi speech ai what is the weather");
        assert_eq!(s.logged, "");
        assert_eq!(s.answer, "what is the weather");
        assert!(s.should_answer);
    }

    #[test]
    fn tolerates_transcription_variants() {
        for phrase in [
            "Hi Speech AI",
            "HAI SPEECH AI",
            "hi speach ai",
            "h i speech a i",
            "hi, speech, ai",
            "hi speech A.I.",
        ] {
            let input = format!("before {phrase} after");
            let s = segmenter().segment(&input);
            assert_eq!(s.logged, "before", "phrase: {phrase}");
            assert_eq!(s.answer, "after", "phrase: {phrase}");
        }
    }

    #[test]
    fn does_not_match_unrelated_words() {
        let s = segmenter().segment("hit speech maids are great");
        assert!(!s.should_answer);
        assert_eq!(s.logged, "hit speech maids are great");
    }

    #[test]
    fn end_command_matches_case_insensitively() {
        assert!(WakePhraseSegmenter::is_end_command("end conversation"));
        assert!(WakePhraseSegmenter::is_end_command("  End Conversation "));
        assert!(!WakePhraseSegmenter::is_end_command(
            "please end conversation now"
        ));
    }
}
