//! Splitting input text into speakable sentences.
//!
//! Text is cut at runs of `。` and line breaks. A `。` found in a run is
//! reattached to the sentence before it, so a sentence never loses its
//! terminator and punctuation never becomes a unit of its own.

/// Ideographic full stop, the sentence terminator.
pub const FULL_STOP: char = '。';

/// Whether `ch` is a kanji, hiragana or katakana character.
///
/// Matches exactly the characters whose Unicode 15.1 name contains
/// `CJK UNIFIED IDEOGRAPH`, `HIRAGANA` or `KATAKANA`. Hentaigana and the
/// CJK compatibility ideographs are not included.
pub fn is_japanese(ch: char) -> bool {
    matches!(ch as u32,
        // CJK Unified Ideographs, Extension A, and Extensions B through I
        0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2B739
        | 0x2B740..=0x2B81D
        | 0x2B820..=0x2CEA1
        | 0x2CEB0..=0x2EBE0
        | 0x2EBF0..=0x2EE5D
        | 0x30000..=0x3134A
        | 0x31350..=0x323AF
        // Hiragana, Katakana, Katakana Phonetic Extensions
        | 0x3041..=0x3096
        | 0x3099..=0x30FF
        | 0x31F0..=0x31FF
        // Circled Katakana
        | 0x32D0..=0x32FE
        // Halfwidth Katakana
        | 0xFF65..=0xFF9F
        // Kana Extended-B
        | 0x1AFF0..=0x1AFF3
        | 0x1AFF5..=0x1AFFB
        | 0x1AFFD..=0x1AFFE
        // Archaic and small kana
        | 0x1B000..=0x1B001
        | 0x1B11F..=0x1B122
        | 0x1B132
        | 0x1B150..=0x1B152
        | 0x1B155
        | 0x1B164..=0x1B167
        // Squared and bracketed kana and ideographs
        | 0x1F200..=0x1F202
        | 0x1F210..=0x1F23B
        | 0x1F240..=0x1F248
    )
}

/// Whether `text` contains at least one Japanese character.
pub fn includes_japanese(text: &str) -> bool {
    text.chars().any(is_japanese)
}

/// Split `text` into speakable sentences.
///
/// With `merge_soft_breaks`, single line breaks are treated as wrapping inside
/// a sentence and blank lines as sentence ends; otherwise every line break ends
/// a sentence.
pub fn parse_lines(text: &str, merge_soft_breaks: bool) -> Vec<String> {
    let text = if merge_soft_breaks {
        merge_line_breaks(text)
    } else {
        text.to_string()
    };
    let text = remove_script_boundary_spaces(&collapse_spaces(&text));
    split_units(&text)
}

/// Join wrapped lines back into flowing sentences.
///
/// A line break plus any indentation after it becomes a space when it follows
/// an ASCII letter, and disappears otherwise. A blank line becomes `。`.
pub fn merge_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\n' {
            out.push(ch);
            continue;
        }

        let mut blank_line = false;
        while let Some(&next) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            blank_line |= next == '\n';
            chars.next();
        }

        if blank_line {
            out.push(FULL_STOP);
        } else if out.chars().next_back().is_some_and(|c| c.is_ascii_alphabetic()) {
            out.push(' ');
        }
    }

    out
}

/// Collapse every run of whitespace other than `\n` into one ASCII space.
pub fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;

    for ch in text.chars() {
        if ch.is_whitespace() && ch != '\n' {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }

    out
}

/// Drop spaces sitting between a Japanese and a non-Japanese character.
///
/// Spaces at the very start or end of the text are kept.
pub fn remove_script_boundary_spaces(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &ch) in chars.iter().enumerate() {
        if ch == ' ' && i > 0 && i + 1 < chars.len() {
            let prev_japanese = is_japanese(chars[i - 1]);
            let next_japanese = is_japanese(chars[i + 1]);
            if prev_japanese != next_japanese {
                continue;
            }
        }
        out.push(ch);
    }

    out
}

fn is_marker(ch: char) -> bool {
    ch == FULL_STOP || ch == '\n'
}

fn split_units(text: &str) -> Vec<String> {
    let mut units: Vec<String> = Vec::new();
    let mut rest = text;

    while let Some(first) = rest.chars().next() {
        let marker_run = is_marker(first);
        let end = rest
            .char_indices()
            .find(|&(_, c)| is_marker(c) != marker_run)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (segment, tail) = rest.split_at(end);

        if !marker_run {
            units.push(segment.to_string());
        } else if segment.contains(FULL_STOP) {
            if let Some(last) = units.last_mut() {
                last.push(FULL_STOP);
            }
        }

        rest = tail;
    }

    units
}
