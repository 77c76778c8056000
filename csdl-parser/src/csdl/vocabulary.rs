//! Grammar vocabulary
//!
//!     CSDL has no fixed keyword list: which words are targets, operators and so on depends on
//!     the data source the editor is configured for. [`VocabularySpec`] is the raw, serde
//!     friendly list form; [`GrammarVocabulary`] is the case-normalized lookup form built once
//!     from it and shared read-only (usually behind an `Arc`) by every lexer and predictor.
//!
//! Classification Order
//!
//!     operator, logical (including unary), keyword, namespaced tag (`tag.` / `tags.`),
//!     punctuation control, target. The categories should not overlap; when a configuration
//!     makes them overlap anyway the first match wins and a warning is logged at build time.

use crate::csdl::token::TokenKind;
use serde::Deserialize;
use std::collections::HashSet;

/// Word lists as they appear in configuration.
///
/// Every list may be missing or empty, which leaves that category empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VocabularySpec {
    pub targets: Vec<String>,
    pub operators: Vec<String>,
    pub logical: Vec<String>,
    pub unary: Vec<String>,
    pub keywords: Vec<String>,
    #[serde(alias = "punctuationControl", alias = "punctuationcontrol")]
    pub punctuation_control: Vec<String>,
}

/// The vocabulary categories a word can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordCategory {
    Target,
    Operator,
    Logical,
    Unary,
    Keyword,
    PunctuationControl,
}

impl WordCategory {
    pub const ALL: [WordCategory; 6] = [
        WordCategory::Target,
        WordCategory::Operator,
        WordCategory::Logical,
        WordCategory::Unary,
        WordCategory::Keyword,
        WordCategory::PunctuationControl,
    ];

    /// Token kind produced for words of this category.
    pub fn token_kind(self) -> TokenKind {
        match self {
            WordCategory::Target => TokenKind::Target,
            WordCategory::Operator => TokenKind::Operator,
            WordCategory::Logical | WordCategory::Unary => TokenKind::Logical,
            WordCategory::Keyword => TokenKind::Keyword,
            WordCategory::PunctuationControl => TokenKind::Punctuation,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WordCategory::Target => "target",
            WordCategory::Operator => "operator",
            WordCategory::Logical => "logical",
            WordCategory::Unary => "unary",
            WordCategory::Keyword => "keyword",
            WordCategory::PunctuationControl => "punctuation control",
        }
    }
}

/// One category: the words as configured (for offering) plus a lower-cased set (for lookup).
#[derive(Debug, Clone, Default)]
pub struct WordSet {
    words: Vec<String>,
    lookup: HashSet<String>,
}

impl WordSet {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = WordSet::default();
        for word in words {
            let word = word.as_ref();
            if word.is_empty() {
                continue;
            }
            if set.lookup.insert(word.to_lowercase()) {
                set.words.push(word.to_string());
            }
        }
        set
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, word: &str) -> bool {
        self.lookup.contains(&word.to_lowercase())
    }

    /// Words in configuration order, original case preserved.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Case-insensitive lookup tables for every vocabulary category.
#[derive(Debug, Clone, Default)]
pub struct GrammarVocabulary {
    targets: WordSet,
    operators: WordSet,
    logical: WordSet,
    unary: WordSet,
    keywords: WordSet,
    punctuation_control: WordSet,
}

impl GrammarVocabulary {
    pub fn from_spec(spec: &VocabularySpec) -> Self {
        let vocabulary = Self {
            targets: WordSet::new(&spec.targets),
            operators: WordSet::new(&spec.operators),
            logical: WordSet::new(&spec.logical),
            unary: WordSet::new(&spec.unary),
            keywords: WordSet::new(&spec.keywords),
            punctuation_control: WordSet::new(&spec.punctuation_control),
        };
        vocabulary.warn_on_overlap();
        tracing::debug!(
            targets = vocabulary.targets.len(),
            operators = vocabulary.operators.len(),
            logical = vocabulary.logical.len(),
            unary = vocabulary.unary.len(),
            keywords = vocabulary.keywords.len(),
            punctuation_control = vocabulary.punctuation_control.len(),
            "built grammar vocabulary"
        );
        vocabulary
    }

    pub fn set(&self, category: WordCategory) -> &WordSet {
        match category {
            WordCategory::Target => &self.targets,
            WordCategory::Operator => &self.operators,
            WordCategory::Logical => &self.logical,
            WordCategory::Unary => &self.unary,
            WordCategory::Keyword => &self.keywords,
            WordCategory::PunctuationControl => &self.punctuation_control,
        }
    }

    pub fn words(&self, category: WordCategory) -> &[String] {
        self.set(category).words()
    }

    pub fn is_target(&self, word: &str) -> bool {
        self.targets.contains(word)
    }

    pub fn is_operator(&self, word: &str) -> bool {
        self.operators.contains(word)
    }

    /// Binary connectives and unary words alike.
    pub fn is_logical(&self, word: &str) -> bool {
        self.logical.contains(word) || self.unary.contains(word)
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    pub fn is_punctuation_control(&self, word: &str) -> bool {
        self.punctuation_control.contains(word)
    }

    /// Classify a complete word. First match wins, see the module docs for the order.
    pub fn classify(&self, word: &str) -> Option<TokenKind> {
        let word = word.to_lowercase();
        if self.operators.lookup.contains(&word) {
            return Some(TokenKind::Operator);
        }
        if self.logical.lookup.contains(&word) || self.unary.lookup.contains(&word) {
            return Some(TokenKind::Logical);
        }
        if self.keywords.lookup.contains(&word) || is_namespaced_tag(&word) {
            return Some(TokenKind::Keyword);
        }
        if self.punctuation_control.lookup.contains(&word) {
            return Some(TokenKind::Punctuation);
        }
        if self.targets.lookup.contains(&word) {
            return Some(TokenKind::Target);
        }
        None
    }

    fn warn_on_overlap(&self) {
        for (i, first) in WordCategory::ALL.iter().enumerate() {
            for second in &WordCategory::ALL[i + 1..] {
                let shared = self.set(*first).lookup.intersection(&self.set(*second).lookup);
                for word in shared {
                    tracing::warn!(
                        word = %word,
                        first = first.as_str(),
                        second = second.as_str(),
                        "vocabulary word listed in two categories, first match wins"
                    );
                }
            }
        }
    }
}

impl From<&VocabularySpec> for GrammarVocabulary {
    fn from(spec: &VocabularySpec) -> Self {
        Self::from_spec(spec)
    }
}

/// `tag.<name>` and `tags.<name>` declare namespaced tags and read as keywords.
pub(crate) fn is_namespaced_tag(word: &str) -> bool {
    word.starts_with("tag.") || word.starts_with("tags.")
}
