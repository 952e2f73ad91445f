use std::fs;
use std::path::Path;

use thiserror::Error;

const WORDS_EN: &str = include_str!("../../assets/words-en.json");

/// Upload rejected before reaching the word pool. The active vocabulary is
/// untouched when these fire.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported file format {0:?} (expected txt, csv, tsv, or json)")]
    UnsupportedFormat(String),
    #[error("failed to read word file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON word file (expected an array of strings): {0}")]
    Json(#[from] serde_json::Error),
}

/// The embedded default word list.
pub fn default_vocabulary() -> Vec<String> {
    let words: Vec<String> = serde_json::from_str(WORDS_EN).unwrap_or_default();
    dedup_preserving_order(words.into_iter().filter(|w| is_valid_word(w)).collect())
}

/// Parse an uploaded word file into a filtered, deduplicated candidate set.
///
/// Format is chosen by extension: `txt` splits on whitespace, `csv`/`tsv`
/// take the first column of each line, `json` expects a plain string array.
/// Fully-quoted words are unquoted; the validity filter then applies.
pub fn parse_upload(path: &Path) -> Result<Vec<String>, UploadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let content = fs::read_to_string(path)?;

    let raw: Vec<String> = match extension.as_str() {
        "txt" => content.split_whitespace().map(unquote).collect(),
        "csv" => first_column(&content, ','),
        "tsv" => first_column(&content, '\t'),
        "json" => serde_json::from_str(&content)?,
        other => return Err(UploadError::UnsupportedFormat(other.to_string())),
    };

    Ok(dedup_preserving_order(
        raw.into_iter()
            .filter(|w| !w.is_empty())
            .filter(|w| is_valid_word(w))
            .collect(),
    ))
}

fn first_column(content: &str, separator: char) -> Vec<String> {
    content
        .trim()
        .lines()
        .map(|line| unquote(line.split(separator).next().unwrap_or("").trim()))
        .collect()
}

/// Strip one pair of quotes only when they wrap the whole word.
fn unquote(word: &str) -> String {
    let stripped = word
        .strip_prefix('"')
        .and_then(|w| w.strip_suffix('"'))
        .or_else(|| word.strip_prefix('\'').and_then(|w| w.strip_suffix('\'')));
    stripped.unwrap_or(word).to_string()
}

/// Validity rules for practice words: 1..=15 chars, ASCII letters and
/// apostrophes only, no all-uppercase abbreviations, no runs of repeated
/// capitals, no "DEL" marker words.
pub fn is_valid_word(word: &str) -> bool {
    if word.is_empty() || word.chars().count() > 15 {
        return false;
    }
    if !word.chars().all(|c| c.is_ascii_alphabetic() || c == '\'') {
        return false;
    }
    if word.contains("DEL") {
        return false;
    }
    if word.chars().count() > 1 && word.chars().all(|c| !c.is_ascii_lowercase()) {
        return false;
    }
    let mut prev: Option<char> = None;
    for c in word.chars() {
        if c.is_ascii_uppercase() && prev == Some(c) {
            return false;
        }
        prev = Some(c);
    }
    true
}

fn dedup_preserving_order(words: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    words.into_iter().filter(|w| seen.insert(w.clone())).collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_vocabulary_is_nonempty_and_valid() {
        let words = default_vocabulary();
        assert!(words.len() > 100);
        assert!(words.iter().all(|w| is_valid_word(w)));
    }

    #[test]
    fn validity_rules() {
        assert!(is_valid_word("hello"));
        assert!(is_valid_word("don't"));
        assert!(is_valid_word("Paris"));
        assert!(!is_valid_word(""));
        assert!(!is_valid_word("star*"));
        assert!(!is_valid_word("NASA")); // all uppercase
        assert!(!is_valid_word("DELete")); // DEL marker
        assert!(!is_valid_word("AAron")); // repeated capital run
        assert!(!is_valid_word("twothousandcharacterslong"));
        assert!(!is_valid_word("semi-colon"));
        assert!(is_valid_word("I")); // single capital allowed
    }

    #[test]
    fn txt_upload_splits_on_whitespace_and_unquotes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "alpha \"beta\" 'gamma'\ndelta alpha").unwrap();

        let words = parse_upload(&path).unwrap();
        assert_eq!(words, vec!["alpha", "beta", "gamma", "delta"]);
    }

    #[test]
    fn csv_upload_takes_first_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.csv");
        fs::write(&path, "alpha,120\n\"beta\",95\nnot a word!,3\n").unwrap();

        let words = parse_upload(&path).unwrap();
        assert_eq!(words, vec!["alpha", "beta"]);
    }

    #[test]
    fn json_upload_expects_string_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        fs::write(&path, "[\"one\", \"two\", \"two\", \"3rd\"]").unwrap();

        let words = parse_upload(&path).unwrap();
        assert_eq!(words, vec!["one", "two"]);

        fs::write(&path, "{\"not\": \"an array\"}").unwrap();
        assert!(matches!(parse_upload(&path), Err(UploadError::Json(_))));
    }

    #[test]
    fn unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.docx");
        fs::write(&path, "whatever").unwrap();
        assert!(matches!(
            parse_upload(&path),
            Err(UploadError::UnsupportedFormat(_))
        ));
    }
}
