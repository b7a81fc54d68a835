/// Reserved words recognized by the parser, in declaration order.
pub const DEFAULT_KEYWORDS: [&str; 15] = [
    "adventure",
    "room",
    "item",
    "verb",
    "argument",
    "descriptions",
    "exit",
    "look",
    "if",
    "say",
    "endfail",
    "endsuccess",
    "deleteitem",
    "createitem",
    "teleport",
];

/// An ordered list of reserved keywords.
///
/// The parser only asks whether a word is reserved; the order is kept for
/// listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    words: Vec<String>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}

impl KeywordTable {
    /// A table holding `words` in the given order.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `word` is reserved. Matching is exact.
    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// The reserved words in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_statement_keywords() {
        let table = KeywordTable::default();
        for kw in ["look", "say", "if", "teleport", "room"] {
            assert!(table.contains(kw), "{kw}");
        }
        assert!(!table.contains("Look"));
        assert!(!table.contains("title"));
        assert_eq!(table.iter().count(), 15);
    }

    #[test]
    fn custom_table() {
        let table = KeywordTable::new(["jump"]);
        assert!(table.contains("jump"));
        assert!(!table.contains("look"));
    }
}
