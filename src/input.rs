//! Where the text to read comes from.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Weekday};

use crate::JtalkError;

/// Path that selects standard input.
pub const STDIN_PATH: &str = "-";

/// Read the text to speak.
///
/// `None` produces the current time as a Japanese phrase, `-` reads standard
/// input, anything else is read as a UTF-8 file.
pub fn read_text(source: Option<&Path>) -> Result<String, JtalkError> {
    match source {
        None => Ok(now_text()),
        Some(path) if path == Path::new(STDIN_PATH) => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

/// Whether `source` names a Markdown file.
pub fn is_markdown_path(source: Option<&Path>) -> bool {
    source
        .and_then(|path| path.extension())
        .is_some_and(|ext| ext == "md")
}

/// The current local time, e.g. `4月1日火曜日、9時5分30秒`.
pub fn now_text() -> String {
    time_text(&Local::now())
}

/// A point in time as a Japanese phrase.
pub fn time_text<Tz: TimeZone>(time: &DateTime<Tz>) -> String {
    format!(
        "{}月{}日{}、{}時{}分{}秒",
        time.month(),
        time.day(),
        weekday_name(time.weekday()),
        time.hour(),
        time.minute(),
        time.second()
    )
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "月曜日",
        Weekday::Tue => "火曜日",
        Weekday::Wed => "水曜日",
        Weekday::Thu => "木曜日",
        Weekday::Fri => "金曜日",
        Weekday::Sat => "土曜日",
        Weekday::Sun => "日曜日",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn formats_time_in_japanese() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let time = jst.with_ymd_and_hms(2024, 4, 2, 9, 5, 30).unwrap();
        assert_eq!(time_text(&time), "4月2日火曜日、9時5分30秒");
    }

    #[test]
    fn reads_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        std::fs::write(&path, "吾輩は猫である。").unwrap();
        assert_eq!(read_text(Some(&path)).unwrap(), "吾輩は猫である。");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_text(Some(&dir.path().join("missing.txt"))),
            Err(JtalkError::Io(_))
        ));
    }

    #[test]
    fn default_text_mentions_the_time() {
        let text = read_text(None).unwrap();
        assert!(text.contains('月') && text.contains('秒'));
    }

    #[test]
    fn recognizes_markdown_extension() {
        assert!(is_markdown_path(Some(Path::new("README.md"))));
        assert!(!is_markdown_path(Some(Path::new("notes.txt"))));
        assert!(!is_markdown_path(Some(Path::new(STDIN_PATH))));
        assert!(!is_markdown_path(None));
    }
}
