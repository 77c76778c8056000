//! Completion prediction
//!
//!     Which vocabulary categories make sense at the cursor depends only on the previous
//!     meaningful token (comments and whitespace skipped, across lines). The categories
//!     accumulate, so one position may offer several of them:
//!
//!         operators      after a target, or after the `cs` operator
//!         logicals       after an operator, string, number, closing bracket or keyword
//!         targets        at the start, after an opening bracket, keyword or logical
//!         keywords       at the start, after an opening or closing bracket
//!         punctuation    after `contains`, `contains_any` or `contains_near`
//!
//!     Unary connectives go wherever targets go.
//!
//! Filtering
//!
//!     A candidate survives when its lower-cased prefix equals the lower-cased token text and
//!     it is not exactly as long as that text, so a fully typed word is never offered again.

use csdl_parser::csdl::{
    find_previous_token, GrammarVocabulary, Token, TokenKind, TokenSource, WordCategory,
};
use lsp_types::CompletionItemKind;
use once_cell::sync::Lazy;
use regex::Regex;

static COMPLETABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-zA-Z_<>=!.()\[\]]+$").expect("valid completable pattern"));

const PUNCTUATION_OPERATORS: [&str; 3] = ["contains", "contains_any", "contains_near"];

/// Sentinel appended to single-candidate lists so hosts do not auto-insert the only entry.
pub const SINGLE_CANDIDATE_SENTINEL: &str = " ";

/// A completion candidate that can be translated into protocol specific items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub label: String,
    pub detail: Option<String>,
    pub kind: CompletionItemKind,
}

impl CompletionCandidate {
    fn new(label: impl Into<String>, kind: CompletionItemKind) -> Self {
        Self {
            label: label.into(),
            detail: None,
            kind,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn for_category(word: &str, category: WordCategory) -> Self {
        let kind = match category {
            WordCategory::Target => CompletionItemKind::FIELD,
            WordCategory::Operator => CompletionItemKind::OPERATOR,
            WordCategory::Logical | WordCategory::Unary | WordCategory::Keyword => {
                CompletionItemKind::KEYWORD
            }
            WordCategory::PunctuationControl => CompletionItemKind::ENUM_MEMBER,
        };
        Self::new(word, kind).with_detail(category.as_str())
    }
}

/// Categories valid after `previous`, in no particular order.
pub fn candidate_categories(previous: Option<&Token>) -> Vec<WordCategory> {
    let kind = previous.and_then(|token| token.kind);
    let mut categories = Vec::new();

    let after_cs = previous
        .map(|token| token.is(TokenKind::Operator) && token.text == "cs")
        .unwrap_or(false);
    if kind == Some(TokenKind::Target) || after_cs {
        categories.push(WordCategory::Operator);
    }

    if matches!(
        kind,
        Some(
            TokenKind::Operator
                | TokenKind::String
                | TokenKind::Number
                | TokenKind::CloseBracket
                | TokenKind::Keyword
        )
    ) {
        categories.push(WordCategory::Logical);
    }

    if matches!(
        kind,
        None | Some(TokenKind::OpenBracket | TokenKind::Keyword | TokenKind::Logical)
    ) {
        categories.push(WordCategory::Target);
        categories.push(WordCategory::Unary);
    }

    if matches!(
        kind,
        None | Some(TokenKind::OpenBracket | TokenKind::CloseBracket)
    ) {
        categories.push(WordCategory::Keyword);
    }

    let after_contains = previous
        .filter(|token| token.is(TokenKind::Operator))
        .map(|token| {
            let text = token.text.to_lowercase();
            PUNCTUATION_OPERATORS.contains(&text.as_str())
        })
        .unwrap_or(false);
    if after_contains {
        categories.push(WordCategory::PunctuationControl);
    }

    categories
}

fn extends_prefix(word: &str, prefix: &str, prefix_len: usize) -> bool {
    word.chars().count() != prefix_len && word.to_lowercase().starts_with(prefix)
}

/// Candidates for `token`, sorted case-insensitively and without duplicate labels.
pub fn completion_candidates(
    token: &Token,
    previous: Option<&Token>,
    vocabulary: &GrammarVocabulary,
) -> Vec<CompletionCandidate> {
    let prefix = token.text.to_lowercase();
    let prefix_len = token.text.chars().count();

    let mut candidates: Vec<CompletionCandidate> = candidate_categories(previous)
        .into_iter()
        .flat_map(|category| {
            vocabulary
                .words(category)
                .iter()
                .filter(|word| extends_prefix(word, &prefix, prefix_len))
                .map(move |word| CompletionCandidate::for_category(word, category))
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.label
            .to_lowercase()
            .cmp(&b.label.to_lowercase())
            .then_with(|| a.label.cmp(&b.label))
    });
    candidates.dedup_by(|a, b| a.label == b.label);
    candidates
}

/// Labels only, see [`completion_candidates`].
pub fn compute_completions(
    token: &Token,
    previous: Option<&Token>,
    vocabulary: &GrammarVocabulary,
) -> Vec<String> {
    completion_candidates(token, previous, vocabulary)
        .into_iter()
        .map(|candidate| candidate.label)
        .collect()
}

/// Candidates together with the range they replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionList {
    pub items: Vec<CompletionCandidate>,
    pub line: usize,
    pub from: usize,
    pub to: usize,
}

impl CompletionList {
    pub fn empty(line: usize, from: usize, to: usize) -> Self {
        Self {
            items: Vec::new(),
            line,
            from,
            to,
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.label.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append the sentinel entry when exactly one candidate is left.
    pub fn with_single_candidate_guard(mut self) -> Self {
        if self.items.len() == 1 {
            self.items.push(CompletionCandidate::new(
                SINGLE_CANDIDATE_SENTINEL,
                CompletionItemKind::TEXT,
            ));
        }
        self
    }
}

/// The token being completed and the meaningful token before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionContext {
    pub line: usize,
    pub current: Token,
    pub previous: Option<Token>,
}

impl CompletionContext {
    /// Resolve the context for a cursor, `None` when the position takes no completion
    /// (inside strings and comments, or on text outside the completable alphabet).
    pub fn at<S>(source: &S, line: usize, column: usize) -> Option<Self>
    where
        S: TokenSource + ?Sized,
    {
        let token = source.token_at(line, column)?;
        if token.is(TokenKind::String) || token.is(TokenKind::Comment) {
            return None;
        }

        let current = if token.is_whitespace() {
            let text_len = source.line_text(line)?.chars().count();
            Token::empty(column.min(text_len))
        } else if COMPLETABLE.is_match(&token.text) {
            token
        } else {
            return None;
        };

        let previous = find_previous_token(source, line, current.start);
        Some(Self {
            line,
            current,
            previous,
        })
    }

    pub fn complete(&self, vocabulary: &GrammarVocabulary) -> CompletionList {
        CompletionList {
            items: completion_candidates(&self.current, self.previous.as_ref(), vocabulary),
            line: self.line,
            from: self.current.start,
            to: self.current.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SeenToken {
    line: usize,
    start: usize,
    text: String,
}

/// Completion requests from one editor, with repeated requests for an unchanged token
/// suppressed.
#[derive(Debug, Default)]
pub struct CompletionSession {
    last_seen: Option<SeenToken>,
}

impl CompletionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completions at the cursor.
    ///
    /// Returns `None` when there is nothing to show a popup for: the line does not exist, or
    /// the token under the cursor is the same one the previous request saw. Positions that
    /// take no completion produce an empty list.
    pub fn request<S>(
        &mut self,
        source: &S,
        vocabulary: &GrammarVocabulary,
        line: usize,
        column: usize,
    ) -> Option<CompletionList>
    where
        S: TokenSource + ?Sized,
    {
        let token = source.token_at(line, column)?;
        let seen = SeenToken {
            line,
            start: token.start,
            text: token.text.clone(),
        };
        if self.last_seen.as_ref() == Some(&seen) {
            tracing::trace!(line, column, text = %token.text, "completion request debounced");
            return None;
        }
        self.last_seen = Some(seen);

        let list = match CompletionContext::at(source, line, column) {
            Some(context) => context.complete(vocabulary),
            None => CompletionList::empty(line, token.start, token.end),
        };
        tracing::debug!(line, column, candidates = list.items.len(), "completion request");
        Some(list)
    }

    /// Forget the last seen token, e.g. after the host closed its popup.
    pub fn reset(&mut self) {
        self.last_seen = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csdl_parser::csdl::testing::{mk_token, sample_buffer, sample_vocabulary};
    use rstest::rstest;

    fn labels(list: &CompletionList) -> Vec<String> {
        list.items.iter().map(|item| item.label.clone()).collect()
    }

    #[test]
    fn start_of_document_offers_targets_keywords_and_unary() {
        let vocabulary = sample_vocabulary();
        let completions = compute_completions(&Token::empty(0), None, &vocabulary);

        assert!(completions.contains(&"fb.language".to_string()));
        assert!(completions.contains(&"stream".to_string()));
        assert!(completions.contains(&"not".to_string()));
        assert!(!completions.contains(&"and".to_string()));
        assert!(!completions.contains(&"==".to_string()));
    }

    #[test]
    fn after_logical_every_target_is_offered() {
        let vocabulary = sample_vocabulary();
        let buffer = sample_buffer("fb.language == \"en\" and ");
        let context = CompletionContext::at(&buffer, 0, 24).expect("context");

        assert_eq!(context.current, Token::empty(24));
        assert_eq!(context.previous.as_ref().map(|t| t.text.as_str()), Some("and"));

        let list = context.complete(&vocabulary);
        for target in vocabulary.words(WordCategory::Target) {
            assert!(list.labels().contains(&target.as_str()), "missing {target}");
        }
        assert!(list.labels().contains(&"not"));
        assert!(!list.labels().contains(&"stream"));
        assert_eq!((list.from, list.to), (24, 24));
    }

    #[test]
    fn fully_typed_operator_is_not_offered_again() {
        let vocabulary = sample_vocabulary();
        let buffer = sample_buffer("interaction.tags cs \"test\"");
        let context = CompletionContext::at(&buffer, 0, 18).expect("context");

        assert_eq!(context.current.text, "cs");
        assert!(context.previous.as_ref().is_some_and(|t| t.is(TokenKind::Target)));
        assert!(context.complete(&vocabulary).is_empty());
    }

    #[test]
    fn operator_prefix_after_target() {
        let vocabulary = sample_vocabulary();
        let previous = mk_token(Some(TokenKind::Target), "interaction.tags", 0);
        let current = mk_token(None, "c", 17);

        assert_eq!(
            compute_completions(&current, Some(&previous), &vocabulary),
            vec![
                "contains",
                "contains_all",
                "contains_any",
                "contains_near",
                "contains_phrase",
                "cs",
            ]
        );
    }

    #[rstest]
    #[case(Some(TokenKind::Target), "fb.link", false)]
    #[case(Some(TokenKind::String), "\"en\"", true)]
    #[case(Some(TokenKind::Number), "25", true)]
    #[case(Some(TokenKind::CloseBracket), ")", true)]
    #[case(Some(TokenKind::Keyword), "tag", true)]
    #[case(Some(TokenKind::Operator), "==", true)]
    #[case(Some(TokenKind::OpenBracket), "(", false)]
    #[case(Some(TokenKind::Logical), "and", false)]
    fn logicals_follow_values(
        #[case] kind: Option<TokenKind>,
        #[case] text: &str,
        #[case] offered: bool,
    ) {
        let previous = mk_token(kind, text, 0);
        assert_eq!(
            candidate_categories(Some(&previous)).contains(&WordCategory::Logical),
            offered
        );
    }

    #[rstest]
    #[case("cs", true)]
    #[case("CS", false)]
    #[case("contains", false)]
    fn operators_follow_the_cs_operator(#[case] text: &str, #[case] offered: bool) {
        let previous = mk_token(Some(TokenKind::Operator), text, 0);
        assert_eq!(
            candidate_categories(Some(&previous)).contains(&WordCategory::Operator),
            offered
        );
    }

    #[rstest]
    #[case("contains")]
    #[case("CONTAINS_ANY")]
    #[case("contains_near")]
    fn punctuation_controls_follow_contains_operators(#[case] operator: &str) {
        let vocabulary = sample_vocabulary();
        let previous = mk_token(Some(TokenKind::Operator), operator, 0);
        let current = mk_token(None, "[k", operator.len() + 1);

        assert_eq!(
            compute_completions(&current, Some(&previous), &vocabulary),
            vec!["[keep(classic)]", "[keep(default)]", "[keep(extended)]"]
        );
    }

    #[test]
    fn keywords_follow_closing_bracket_but_targets_do_not() {
        let previous = mk_token(Some(TokenKind::CloseBracket), ")", 0);
        let categories = candidate_categories(Some(&previous));
        assert!(categories.contains(&WordCategory::Keyword));
        assert!(!categories.contains(&WordCategory::Target));
    }

    #[test]
    fn strings_and_comments_take_no_completion() {
        let buffer = sample_buffer("fb.language == \"en\" // note");
        assert_eq!(CompletionContext::at(&buffer, 0, 17), None);
        assert_eq!(CompletionContext::at(&buffer, 0, 24), None);
    }

    #[test]
    fn text_outside_the_completable_alphabet_takes_no_completion() {
        let buffer = sample_buffer("fb.language == caf\u{e9}");
        assert_eq!(CompletionContext::at(&buffer, 0, 19), None);
    }

    #[test]
    fn session_debounces_unchanged_token() {
        let vocabulary = sample_vocabulary();
        let mut buffer = sample_buffer("fb.lang");
        let mut session = CompletionSession::new();

        let first = session.request(&buffer, &vocabulary, 0, 7).expect("first request");
        assert_eq!(labels(&first), vec!["fb.language"]);
        assert_eq!(session.request(&buffer, &vocabulary, 0, 7), None);

        buffer.set_line(0, "fb.langu");
        assert!(session.request(&buffer, &vocabulary, 0, 8).is_some());

        session.reset();
        assert!(session.request(&buffer, &vocabulary, 0, 8).is_some());
    }

    #[test]
    fn session_returns_empty_list_inside_strings() {
        let vocabulary = sample_vocabulary();
        let buffer = sample_buffer("fb.language == \"en\"");
        let mut session = CompletionSession::new();

        let list = session.request(&buffer, &vocabulary, 0, 17).expect("list");
        assert!(list.is_empty());
        assert_eq!(session.request(&buffer, &vocabulary, 9, 0), None);
    }

    #[test]
    fn single_candidate_guard_adds_sentinel() {
        let vocabulary = sample_vocabulary();
        let buffer = sample_buffer("fb.lang");
        let list = CompletionContext::at(&buffer, 0, 7)
            .expect("context")
            .complete(&vocabulary)
            .with_single_candidate_guard();

        assert_eq!(labels(&list), vec!["fb.language", SINGLE_CANDIDATE_SENTINEL]);
        assert_eq!((list.from, list.to), (0, 7));
    }

    #[test]
    fn candidates_carry_category_kind() {
        let vocabulary = sample_vocabulary();
        let previous = mk_token(Some(TokenKind::Target), "fb.link", 0);
        let current = mk_token(None, "ex", 8);
        let candidates = completion_candidates(&current, Some(&previous), &vocabulary);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].label, "exists");
        assert_eq!(candidates[0].kind, CompletionItemKind::OPERATOR);
        assert_eq!(candidates[0].detail.as_deref(), Some("operator"));
    }
}
