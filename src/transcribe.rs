//! Rewriting English words into katakana readings.

use crate::segment::remove_script_boundary_spaces;
use crate::yomi::PronunciationTable;

/// Replaces English words in a sentence with their katakana readings.
///
/// A word is a maximal run of ASCII letters and apostrophes. Words without an
/// entry in the table are left exactly as written.
pub struct EnglishWordTranscriber<'a> {
    table: &'a PronunciationTable,
}

impl<'a> EnglishWordTranscriber<'a> {
    pub fn new(table: &'a PronunciationTable) -> Self {
        Self { table }
    }

    /// Transcribe the English words in `text`.
    ///
    /// A space left between a new katakana reading and a non-Japanese
    /// neighbour is removed, the same way segmentation treats such spaces.
    pub fn transcribe(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut replaced = false;

        for token in tokenize(text) {
            match token {
                Token::Word(word) => match self.table.lookup(word) {
                    Some(reading) => {
                        out.push_str(reading);
                        replaced = true;
                    }
                    None => out.push_str(word),
                },
                Token::Other(other) => out.push_str(other),
            }
        }

        if replaced {
            remove_script_boundary_spaces(&out)
        } else {
            out
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'t> {
    Word(&'t str),
    Other(&'t str),
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '\''
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_word = false;

    for (idx, ch) in text.char_indices() {
        let word_char = is_word_char(ch);
        if idx > start && word_char != in_word {
            tokens.push(make_token(&text[start..idx], in_word));
            start = idx;
        }
        in_word = word_char;
    }

    if start < text.len() {
        tokens.push(make_token(&text[start..], in_word));
    }
    tokens
}

fn make_token(text: &str, word: bool) -> Token<'_> {
    if word {
        Token::Word(text)
    } else {
        Token::Other(text)
    }
}
