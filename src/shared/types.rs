use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap()
});

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9]?[0-9]{7,15}$").unwrap());

static WHITESPACE_RUN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Tokens that mark content as a code snippet
const CODE_TOKENS: [&str; 14] = [
    "{", "}", "(", ")", "[", "]", "func ", "def ", "class ", "import ", "#include", "var ",
    "let ", "const ",
];

/// Semantic type of a captured clipboard value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardItemType {
    Text,
    Url,
    Email,
    Phone,
    Code,
}

impl ClipboardItemType {
    /// Classify raw text into a type tag.
    ///
    /// Pure and deterministic; rules are checked in fixed priority order and
    /// the first match wins. Empty or whitespace-only input is `Text`.
    pub fn detect(content: &str) -> Self {
        let trimmed = content.trim();

        if trimmed.starts_with("http://")
            || trimmed.starts_with("https://")
            || trimmed.starts_with("www.")
        {
            return ClipboardItemType::Url;
        }

        if trimmed.contains('@')
            && trimmed.contains('.')
            && !trimmed.contains(char::is_whitespace)
            && EMAIL_REGEX.is_match(trimmed)
        {
            return ClipboardItemType::Email;
        }

        // Keep digits and a leading '+', drop every other character
        // (separators, parentheses) before matching.
        let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
        let candidate = if trimmed.starts_with('+') {
            format!("+{}", digits)
        } else {
            digits
        };
        if !candidate.is_empty() && PHONE_REGEX.is_match(&candidate) {
            return ClipboardItemType::Phone;
        }

        if CODE_TOKENS.iter().any(|token| trimmed.contains(token)) {
            return ClipboardItemType::Code;
        }

        ClipboardItemType::Text
    }
}

/// A single captured clipboard value
///
/// Identity and content are immutable after construction; only membership in
/// a store changes over an item's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardItem {
    pub id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub item_type: ClipboardItemType,
}

impl ClipboardItem {
    /// Create a new item, classifying the content.
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let item_type = ClipboardItemType::detect(&content);
        Self::with_type(content, item_type)
    }

    /// Create a new item with a precomputed type tag.
    ///
    /// Used when pinning: the copy gets a fresh identity and timestamp but
    /// reuses the source item's tag, which is never recomputed.
    pub fn with_type(content: impl Into<String>, item_type: ClipboardItemType) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            timestamp: Utc::now(),
            item_type,
        }
    }

    /// Single-line preview of the content, capped at 100 characters.
    pub fn display_content(&self) -> String {
        let cleaned = WHITESPACE_RUN_REGEX.replace_all(self.content.trim(), " ");
        if cleaned.is_empty() {
            return "(Empty)".to_string();
        }
        if cleaned.chars().count() > 100 {
            let head: String = cleaned.chars().take(100).collect();
            format!("{}...", head)
        } else {
            cleaned.into_owned()
        }
    }
}
