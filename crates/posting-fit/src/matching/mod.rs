//! Whole-word keyword matching shared by the scorer, classifier and filters.
//!
//! Every keyword is compiled once into a case-insensitive pattern anchored on word
//! boundaries, so "vp" never fires inside "supervisor" and "chief" never fires inside
//! "mischief". A trailing `*` turns the last word into a prefix ("financ*" matches
//! "finance" and "financial"). Runs of whitespace inside a keyword match any whitespace.

use regex::Regex;

/// Raised when a keyword cannot be turned into a matcher.
#[derive(Debug, thiserror::Error)]
#[error("keyword '{keyword}' could not be compiled: {source}")]
pub struct KeywordError {
    pub keyword: String,
    #[source]
    pub source: regex::Error,
}

#[derive(Debug, Clone)]
struct Keyword {
    text: String,
    pattern: Regex,
}

/// Immutable, precompiled list of keywords.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    entries: Vec<Keyword>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Result<Self, KeywordError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<Keyword> = Vec::new();

        for raw in keywords {
            let text = normalize_keyword(raw.as_ref());
            if text.is_empty() || entries.iter().any(|entry| entry.text == text) {
                continue;
            }

            let pattern = Regex::new(&pattern_for(&text)).map_err(|source| KeywordError {
                keyword: text.clone(),
                source,
            })?;
            entries.push(Keyword { text, pattern });
        }

        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.text.as_str())
    }

    /// True when at least one keyword occurs in `text` as a whole word.
    pub fn matches(&self, text: &str) -> bool {
        !text.is_empty() && self.entries.iter().any(|entry| entry.pattern.is_match(text))
    }

    /// Distinct keywords found in `text`, in configuration order.
    pub fn matched<'a>(&'a self, text: &str) -> Vec<&'a str> {
        if text.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|entry| entry.pattern.is_match(text))
            .map(|entry| entry.text.as_str())
            .collect()
    }

    pub fn count(&self, text: &str) -> usize {
        self.matched(text).len()
    }

    /// Keywords of this set that contain `needle` as a substring.
    pub fn subset_containing(&self, needle: &str) -> KeywordSet {
        let needle = needle.to_lowercase();
        KeywordSet {
            entries: self
                .entries
                .iter()
                .filter(|entry| entry.text.contains(&needle))
                .cloned()
                .collect(),
        }
    }
}

fn normalize_keyword(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn pattern_for(keyword: &str) -> String {
    let (stem, wildcard) = match keyword.strip_suffix('*') {
        Some(stem) => (stem.trim_end(), true),
        None => (keyword, false),
    };

    let body = stem
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");

    let starts_with_word = stem.chars().next().map(is_word_char).unwrap_or(false);
    let ends_with_word = stem.chars().last().map(is_word_char).unwrap_or(false);

    let prefix = if starts_with_word { r"\b" } else { "" };
    let suffix = match (wildcard, ends_with_word) {
        (true, _) => r"\w*",
        (false, true) => r"\b",
        (false, false) => "",
    };

    format!("(?i){prefix}{body}{suffix}")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
