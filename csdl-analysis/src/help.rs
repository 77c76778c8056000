//! Per-target help text, fetched once by the host and kept for the lifetime of the editor.

use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_URL_TEMPLATE: &str =
    "http://dev.datasift.com/tooltip-endpoint/tooltip/retrieve?id={target}";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HelpOptions {
    /// Endpoint for target help; `{target}` is replaced by the dashed target name.
    pub url_template: String,
}

impl Default for HelpOptions {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct TargetHelp {
    options: HelpOptions,
    cache: HashMap<String, String>,
}

impl TargetHelp {
    pub fn new(options: HelpOptions) -> Self {
        Self {
            options,
            cache: HashMap::new(),
        }
    }

    /// Help URL for `target`, e.g. `fb.author.age` becomes `fb-author-age`.
    pub fn url_for(&self, target: &str) -> String {
        self.options
            .url_template
            .replace("{target}", &target.replace('.', "-"))
    }

    pub fn cached(&self, target: &str) -> Option<&str> {
        self.cache.get(target).map(String::as_str)
    }

    /// Cached help for `target`, or whatever `fetch` returns for its URL.
    ///
    /// Only non-blank results are cached, so a failed or empty fetch is retried next time.
    pub fn get_or_fetch<F>(&mut self, target: &str, fetch: F) -> Option<String>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        if let Some(help) = self.cache.get(target) {
            return Some(help.clone());
        }

        let url = self.url_for(target);
        tracing::debug!(target_name = target, %url, "fetching target help");
        let help = fetch(&url)?.trim().to_string();
        if help.is_empty() {
            return None;
        }
        self.cache.insert(target.to_string(), help.clone());
        Some(help)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn url_uses_dashed_target_name() {
        let help = TargetHelp::new(HelpOptions::default());
        assert_eq!(
            help.url_for("fb.author.age"),
            "http://dev.datasift.com/tooltip-endpoint/tooltip/retrieve?id=fb-author-age"
        );
    }

    #[test]
    fn fetches_once_and_caches_trimmed_help() {
        let mut help = TargetHelp::new(HelpOptions {
            url_template: "https://help.example/{target}.html".to_string(),
        });
        let calls = Cell::new(0);
        let fetch = |url: &str| {
            calls.set(calls.get() + 1);
            assert_eq!(url, "https://help.example/links-domain.html");
            Some("  <p>Domain of a link</p>\n".to_string())
        };

        assert_eq!(
            help.get_or_fetch("links.domain", fetch).as_deref(),
            Some("<p>Domain of a link</p>")
        );
        assert_eq!(
            help.get_or_fetch("links.domain", fetch).as_deref(),
            Some("<p>Domain of a link</p>")
        );
        assert_eq!(calls.get(), 1);
        assert_eq!(help.cached("links.domain"), Some("<p>Domain of a link</p>"));
    }

    #[test]
    fn blank_help_is_not_cached() {
        let mut help = TargetHelp::new(HelpOptions::default());
        assert_eq!(help.get_or_fetch("fb.link", |_| Some("   ".to_string())), None);
        assert_eq!(help.get_or_fetch("fb.link", |_| None), None);
        assert_eq!(help.cached("fb.link"), None);
        assert_eq!(
            help.get_or_fetch("fb.link", |_| Some("Link".to_string())).as_deref(),
            Some("Link")
        );
    }
}
