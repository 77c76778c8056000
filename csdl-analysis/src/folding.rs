//! Folding of long string literals
//!
//!     Long quoted values (lists of keywords, URLs) make filters hard to read, so string tokens
//!     longer than `foldable_length` characters can be collapsed into a short placeholder. The
//!     registry only keeps the bookkeeping; drawing happens in the host through
//!     [`FoldSurface`].
//!
//! Lifecycle
//!
//!     Every string token is either not foldable (too short) or toggles between unfolded and
//!     folded. Folding a folded token or unfolding an unfolded one does nothing. Edits call
//!     [`FoldRegistry::on_change`], which drops folds whose text disappeared, shifts the ones
//!     below the edit and refreshes the gutter of the touched lines plus the line after them.

use csdl_parser::csdl::{Token, TokenKind, TokenSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FoldOptions {
    /// Strings longer than this many characters can be folded.
    pub foldable_length: usize,
    /// Characters of the token kept visible in the placeholder.
    pub folded_length: usize,
    pub fold_on_load: bool,
}

impl Default for FoldOptions {
    fn default() -> Self {
        Self {
            foldable_length: 20,
            folded_length: 5,
            fold_on_load: false,
        }
    }
}

/// Gutter marker shown next to a line holding a foldable string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GutterMarker {
    /// The line's first foldable string is unfolded; clicking folds.
    Fold,
    /// The line's first foldable string is folded; clicking unfolds.
    Unfold,
}

/// Handle of a folded range, shared with the host so placeholder clicks can be routed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MarkerId(u64);

/// What the host editor has to offer for folds to be visible.
pub trait FoldSurface {
    /// Replace `from..to` on `line` with a non-editable placeholder.
    fn mark_range(&mut self, id: MarkerId, line: usize, from: usize, to: usize, placeholder: &str);

    fn clear_mark(&mut self, id: MarkerId);

    fn set_gutter(&mut self, line: usize, marker: GutterMarker);

    fn clear_gutter(&mut self, line: usize);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Fold {
    line: usize,
    from: usize,
    to: usize,
    text: String,
}

#[derive(Debug, Default)]
pub struct FoldRegistry {
    options: FoldOptions,
    folds: BTreeMap<MarkerId, Fold>,
    next_id: u64,
}

impl FoldRegistry {
    pub fn new(options: FoldOptions) -> Self {
        Self {
            options,
            folds: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn options(&self) -> &FoldOptions {
        &self.options
    }

    pub fn is_foldable(&self, token: &Token) -> bool {
        token.is(TokenKind::String) && token.text.chars().count() > self.options.foldable_length
    }

    /// Placeholder drawn instead of a folded token.
    pub fn placeholder(&self, token: &Token) -> String {
        let quote = token
            .text
            .chars()
            .next()
            .filter(|c| *c == '"' || *c == '\'')
            .unwrap_or('"');
        let head: String = token.text.chars().take(self.options.folded_length).collect();
        format!("{head}...{quote}")
    }

    pub fn is_folded(&self, line: usize, token: &Token) -> Option<MarkerId> {
        self.folds
            .iter()
            .find(|(_, fold)| fold.line == line && fold.from == token.start)
            .map(|(id, _)| *id)
    }

    /// Currently folded ranges as `(id, line, from, to)`, in folding order.
    pub fn folded(&self) -> impl Iterator<Item = (MarkerId, usize, usize, usize)> + '_ {
        self.folds
            .iter()
            .map(|(id, fold)| (*id, fold.line, fold.from, fold.to))
    }

    /// Fold `token` on `line`. Returns the marker of the fold, also when it already existed,
    /// and `None` for tokens that cannot be folded.
    pub fn fold<F>(&mut self, line: usize, token: &Token, surface: &mut F) -> Option<MarkerId>
    where
        F: FoldSurface + ?Sized,
    {
        if !self.is_foldable(token) {
            return None;
        }
        if let Some(id) = self.is_folded(line, token) {
            return Some(id);
        }

        let id = MarkerId(self.next_id);
        self.next_id += 1;
        let placeholder = self.placeholder(token);
        surface.mark_range(id, line, token.start, token.end, &placeholder);
        self.folds.insert(
            id,
            Fold {
                line,
                from: token.start,
                to: token.end,
                text: token.text.clone(),
            },
        );
        tracing::debug!(line, from = token.start, to = token.end, "folded string");
        Some(id)
    }

    /// Unfold `token` on `line`, returning whether anything changed.
    pub fn unfold<F>(&mut self, line: usize, token: &Token, surface: &mut F) -> bool
    where
        F: FoldSurface + ?Sized,
    {
        match self.is_folded(line, token) {
            Some(id) => self.remove(id, surface).is_some(),
            None => false,
        }
    }

    /// Fold an unfolded token or unfold a folded one. Returns the new folded state.
    pub fn toggle<F>(&mut self, line: usize, token: &Token, surface: &mut F) -> bool
    where
        F: FoldSurface + ?Sized,
    {
        if self.unfold(line, token, surface) {
            false
        } else {
            self.fold(line, token, surface).is_some()
        }
    }

    /// Set the gutter of `line` from its first foldable token, or clear it.
    pub fn refresh_line<S, F>(&self, source: &S, line: usize, surface: &mut F)
    where
        S: TokenSource + ?Sized,
        F: FoldSurface + ?Sized,
    {
        let first = source
            .line_tokens(line)
            .iter()
            .find(|token| self.is_foldable(token));
        match first {
            Some(token) if self.is_folded(line, token).is_some() => {
                surface.set_gutter(line, GutterMarker::Unfold)
            }
            Some(_) => surface.set_gutter(line, GutterMarker::Fold),
            None => surface.clear_gutter(line),
        }
    }

    /// Bring folds up to date after lines `from..=to` (positions after the edit) changed and
    /// the document grew by `line_delta` lines.
    pub fn on_change<S, F>(
        &mut self,
        source: &S,
        from: usize,
        to: usize,
        line_delta: isize,
        surface: &mut F,
    ) where
        S: TokenSource + ?Sized,
        F: FoldSurface + ?Sized,
    {
        let old_to = to as isize - line_delta;
        let mut stale = Vec::new();

        for (id, fold) in self.folds.iter_mut() {
            if fold.line < from {
                continue;
            }
            if fold.line as isize > old_to {
                fold.line = (fold.line as isize + line_delta).max(0) as usize;
                continue;
            }
            let survivor = (fold.line <= to)
                .then(|| {
                    source
                        .line_tokens(fold.line)
                        .iter()
                        .find(|token| token.is(TokenKind::String) && token.text == fold.text)
                })
                .flatten();
            match survivor {
                Some(token) => {
                    fold.from = token.start;
                    fold.to = token.end;
                }
                None => stale.push(*id),
            }
        }
        for id in stale {
            self.remove(id, surface);
        }

        let last = (to + 1).min(source.line_count().saturating_sub(1));
        for line in from..=last {
            self.refresh_line(source, line, surface);
        }
    }

    /// Toggle every foldable string on `line`.
    pub fn gutter_click<S, F>(&mut self, source: &S, line: usize, surface: &mut F)
    where
        S: TokenSource + ?Sized,
        F: FoldSurface + ?Sized,
    {
        let foldable: Vec<Token> = source
            .line_tokens(line)
            .iter()
            .filter(|token| self.is_foldable(token))
            .cloned()
            .collect();
        for token in &foldable {
            self.toggle(line, token, surface);
        }
        self.refresh_line(source, line, surface);
    }

    /// Unfold after a click on a placeholder; returns where the cursor goes, just inside the
    /// opening quote.
    pub fn placeholder_clicked<S, F>(
        &mut self,
        source: &S,
        id: MarkerId,
        surface: &mut F,
    ) -> Option<(usize, usize)>
    where
        S: TokenSource + ?Sized,
        F: FoldSurface + ?Sized,
    {
        let fold = self.remove(id, surface)?;
        self.refresh_line(source, fold.line, surface);
        Some((fold.line, fold.from + 1))
    }

    /// Refresh every gutter and, with `fold_on_load`, fold every foldable string.
    pub fn initialize<S, F>(&mut self, source: &S, surface: &mut F)
    where
        S: TokenSource + ?Sized,
        F: FoldSurface + ?Sized,
    {
        for line in 0..source.line_count() {
            if self.options.fold_on_load {
                let tokens = source.line_tokens(line).to_vec();
                for token in &tokens {
                    self.fold(line, token, surface);
                }
            }
            self.refresh_line(source, line, surface);
        }
        tracing::debug!(folds = self.folds.len(), "fold registry initialized");
    }

    /// Drop every fold and gutter marker, e.g. before the document is replaced.
    pub fn clear<S, F>(&mut self, source: &S, surface: &mut F)
    where
        S: TokenSource + ?Sized,
        F: FoldSurface + ?Sized,
    {
        for id in std::mem::take(&mut self.folds).into_keys() {
            surface.clear_mark(id);
        }
        for line in 0..source.line_count() {
            surface.clear_gutter(line);
        }
    }

    fn remove<F>(&mut self, id: MarkerId, surface: &mut F) -> Option<Fold>
    where
        F: FoldSurface + ?Sized,
    {
        let fold = self.folds.remove(&id)?;
        surface.clear_mark(id);
        tracing::debug!(line = fold.line, from = fold.from, "unfolded string");
        Some(fold)
    }
}
