//! Text normalizer applied to scraped page text before extraction.
//!
//! The transform is a fixed sequence of substitutions. Order matters: each step
//! runs on the output of the previous one. The result only ever contains ASCII
//! letters, digits and single spaces, so non-ASCII text is dropped.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*?>").expect("tag regex"));

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\\(\\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+")
        .expect("url regex")
});

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9 ]").expect("alnum regex"));

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("space regex"));

/// Cleans raw page text. Pure and infallible; may return an empty string.
pub fn normalize(raw: &str) -> String {
    let text = TAG.replace_all(raw, "");
    let text = URL.replace_all(&text, "");
    let text = NON_ALNUM.replace_all(&text, "");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
