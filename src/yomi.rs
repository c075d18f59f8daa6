use std::collections::HashMap;
use std::path::Path;

use crate::JtalkError;

/// File name of the English → katakana pronunciation asset.
pub const YOMI_DATA_FILE: &str = "jtalkpy_eng_yomi_data.tsv";

/// Katakana readings of English words.
///
/// Keys are English surface forms as they appear in the asset (mostly
/// lowercase); values are their katakana pronunciations.
#[derive(Debug, Clone, Default)]
pub struct PronunciationTable {
    entries: HashMap<String, String>,
}

impl PronunciationTable {
    /// Load a table from a tab-separated `word<TAB>reading` file.
    ///
    /// Lines that do not have exactly two fields are skipped.
    pub fn load(path: &Path) -> Result<Self, JtalkError> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::parse(&content);
        log::info!(
            "Loaded {} pronunciations from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Load a table, falling back to an empty one when the asset is missing.
    ///
    /// An empty table turns English word transcription into a no-op.
    pub fn load_or_empty(path: &Path) -> Result<Self, JtalkError> {
        if !path.is_file() {
            log::warn!(
                "Pronunciation data not found at {}, English words will be read as-is",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse the contents of a pronunciation asset.
    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(word), Some(reading), None) => {
                    entries.insert(word.to_string(), reading.to_string());
                }
                _ => log::debug!("Skipping malformed pronunciation line {}", line_no + 1),
            }
        }
        Self { entries }
    }

    /// Reading of `token`, trying it verbatim and then lowercased.
    pub fn lookup(&self, token: &str) -> Option<&str> {
        if let Some(reading) = self.entries.get(token) {
            return Some(reading.as_str());
        }
        let lower = token.to_lowercase();
        if lower == token {
            return None;
        }
        self.entries.get(&lower).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PronunciationTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn lookup_prefers_exact_case_then_lowercase() {
        let table: PronunciationTable =
            [("hello", "ハロー"), ("Java", "ジャバ"), ("java", "じゃば")]
                .into_iter()
                .collect();
        assert_eq!(table.lookup("hello"), Some("ハロー"));
        assert_eq!(table.lookup("Hello"), Some("ハロー"));
        assert_eq!(table.lookup("Java"), Some("ジャバ"));
        assert_eq!(table.lookup("JAVA"), Some("じゃば"));
        assert_eq!(table.lookup("world"), None);
    }

    #[test]
    fn parse_skips_malformed_lines() {
        let table = PronunciationTable::parse("apple\tアップル\nbroken\n\nthree\tfields\there\nzoo\tズー\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("apple"), Some("アップル"));
        assert_eq!(table.lookup("zoo"), Some("ズー"));
        assert_eq!(table.lookup("broken"), None);
    }

    #[test]
    fn loads_table_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cat\tキャット").unwrap();
        writeln!(file, "dog\tドッグ").unwrap();

        let table = PronunciationTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("Dog"), Some("ドッグ"));
    }

    #[test]
    fn missing_asset_gives_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = PronunciationTable::load_or_empty(&dir.path().join(YOMI_DATA_FILE)).unwrap();
        assert!(table.is_empty());
    }
}
