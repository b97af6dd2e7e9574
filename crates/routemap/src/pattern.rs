// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Path pattern compilation and decoding.
//!
//! A [`PathPattern`] is the compiled form of a registration path: the
//! matcher source text plus the capture-group names in declaration order.
//! [`decode`] recovers a simplified template from the source; when the
//! source is too complex to simplify, the whole decode fails and callers
//! fall back to rendering the raw source text.

use serde::{Deserialize, Serialize};

/// Canonical source of the matcher for the root-only path.
const ROOT_ONLY: &str = "/^\\/?$/i";

/// Canonical source of the match-everything matcher.
const MATCH_ALL: &str = "/^(.*)\\/?$/i";

/// Escaped path separator; the source text splits on this token.
const SEPARATOR: &str = "\\/";

/// Boilerplate tokens stripped before simplification.
const ANCHOR_PREFIX: &str = "/^";
const TERMINAL_SUFFIX: &str = "?$/i";

/// Adjacent token pair that collapses to one parameter placeholder.
const PARAM_OPEN: &str = "(?:([^";
const PARAM_CLOSE: &str = "]+?))";

/// Adjacent token pair (non-capturing optional suffix) that collapses to
/// nothing.
const OPTIONAL_OPEN: &str = "?(?=";
const OPTIONAL_CLOSE: &str = "|$)/i";

/// A compiled path matcher: source text plus ordered capture-group names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPattern {
    /// Matcher source text, in the framework's stringified form.
    pub source: String,

    /// Capture-group names, in declaration order.
    #[serde(default)]
    pub keys: Vec<String>,
}

/// One fragment of a simplified path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    /// A literal path segment.
    Literal(String),

    /// A named-parameter placeholder; consumes one capture name when the
    /// template is materialized.
    Param,
}

impl PathPattern {
    /// Wrap a framework-supplied matcher as-is.
    ///
    /// Raw patterns usually fail [`decode`], in which case the source text
    /// is carried forward unsimplified.
    pub fn raw(source: impl Into<String>, keys: Vec<String>) -> Self {
        Self {
            source: source.into(),
            keys,
        }
    }

    /// Compile a registration path into matcher form.
    ///
    /// `end` selects a terminal matcher (route paths) over a prefix matcher
    /// (mount and middleware paths). Named segments (`:name`) become capture
    /// groups; the whole-path wildcard `*` compiles to the canonical
    /// match-everything form.
    pub fn compile(path: &str, end: bool) -> Self {
        if path == "*" {
            return Self {
                source: MATCH_ALL.to_string(),
                keys: vec!["0".to_string()],
            };
        }

        let mut source = String::from(ANCHOR_PREFIX);
        let mut keys = Vec::new();

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if let Some(name) = segment.strip_prefix(':') {
                source.push_str("\\/(?:([^\\/]+?))");
                keys.push(name.to_string());
            } else {
                source.push_str(SEPARATOR);
                source.push_str(segment);
            }
        }

        if end {
            source.push_str("\\/?$/i");
        } else {
            source.push_str("\\/?(?=\\/|$)/i");
        }

        Self { source, keys }
    }
}

/// Try to simplify a pattern into template tokens.
///
/// The two canonical matchers decode unconditionally to `/` and `*`.
/// Otherwise the source is split on the escaped separator, boilerplate
/// tokens are stripped, and adjacent token pairs collapse: a capture pair
/// becomes one [`PathToken::Param`], an optional-suffix pair becomes
/// nothing. If any remaining literal token still contains a separator the
/// whole decode fails and `None` is returned; the caller renders the raw
/// source instead.
///
/// Pure function: the same pattern always decodes identically.
pub fn decode(pattern: &PathPattern) -> Option<Vec<PathToken>> {
    if pattern.source == ROOT_ONLY {
        return Some(vec![PathToken::Literal("/".to_string())]);
    }
    if pattern.source == MATCH_ALL {
        return Some(vec![PathToken::Literal("*".to_string())]);
    }

    let pieces: Vec<&str> = pattern
        .source
        .split(SEPARATOR)
        .filter(|piece| *piece != ANCHOR_PREFIX && *piece != TERMINAL_SUFFIX)
        .collect();

    let mut tokens = Vec::with_capacity(pieces.len());
    let mut i = 0;
    while i < pieces.len() {
        let paired = i + 1 < pieces.len();
        if paired && pieces[i] == PARAM_OPEN && pieces[i + 1] == PARAM_CLOSE {
            tokens.push(PathToken::Param);
            i += 2;
        } else if paired && pieces[i] == OPTIONAL_OPEN && pieces[i + 1] == OPTIONAL_CLOSE {
            i += 2;
        } else {
            tokens.push(PathToken::Literal(pieces[i].to_string()));
            i += 1;
        }
    }

    let undecodable = tokens
        .iter()
        .any(|token| matches!(token, PathToken::Literal(text) if text.contains('/')));
    if undecodable {
        return None;
    }

    Some(tokens)
}
