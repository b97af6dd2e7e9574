// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Collation: path chain reduction and report assembly.
//!
//! Each doc item's path chain is folded left-to-right through the pattern
//! decoder into a simplified template, then items are grouped into buckets
//! keyed by a canonical sort key. Bucket order is first-seen; in-bucket
//! order is the walker's emission order.

use crate::pattern::{decode, PathToken};
use crate::topology::PathChainElement;
use crate::walker::{DocItem, WalkReport};
use serde::Serialize;
use std::collections::HashMap;

/// A simplified path template plus its collation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimplifiedPath {
    /// Template tokens: literal segments and `:name` placeholders.
    pub tokens: Vec<String>,

    /// Canonical `|`-delimited grouping key.
    pub sort_key: String,
}

/// Reduce a path chain to a simplified template.
///
/// Capture names accumulate from every element's pattern in traversal
/// order; placeholders consume them positionally. Degenerate tokens (empty
/// or a bare separator) are dropped. A pattern the decoder cannot simplify
/// contributes its raw source as one opaque token.
pub fn simplify_chain(chain: &[PathChainElement]) -> SimplifiedPath {
    let mut names: Vec<String> = Vec::new();
    let mut raw: Vec<PathToken> = Vec::new();

    for element in chain {
        if let Some(pattern) = &element.pattern {
            names.extend(pattern.keys.iter().cloned());
        }

        if let Some(literal) = &element.literal {
            push_token(&mut raw, PathToken::Literal(literal.clone()));
        } else if let Some(pattern) = &element.pattern {
            match decode(pattern) {
                Some(tokens) => {
                    for token in tokens {
                        push_token(&mut raw, token);
                    }
                }
                None => {
                    tracing::warn!(source = %pattern.source, "pattern too complex to simplify");
                    push_token(&mut raw, PathToken::Literal(pattern.source.clone()));
                }
            }
        } else if let Some(mount) = &element.mount {
            push_token(&mut raw, PathToken::Literal(mount.clone()));
        }
    }

    let mut unconsumed = names.into_iter();
    let tokens: Vec<String> = raw
        .into_iter()
        .map(|token| match token {
            PathToken::Literal(text) => text,
            PathToken::Param => match unconsumed.next() {
                Some(name) => format!(":{name}"),
                None => ":_".to_string(),
            },
        })
        .collect();

    let mut sort_key = String::from("|");
    for token in &tokens {
        sort_key.push_str(token);
        sort_key.push('|');
    }

    SimplifiedPath { tokens, sort_key }
}

fn push_token(out: &mut Vec<PathToken>, token: PathToken) {
    if let PathToken::Literal(text) = &token {
        if text.is_empty() || text == "/" {
            return;
        }
    }
    out.push(token);
}

/// A doc item paired with its simplified path.
#[derive(Debug, Serialize)]
pub struct CollatedItem {
    /// Simplified template tokens for this item's chain.
    pub simple_path: Vec<String>,

    /// The item as the walker emitted it.
    pub item: DocItem,
}

/// One collation bucket: items sharing a simplified path.
#[derive(Debug, Serialize)]
pub struct PathBucket {
    pub sort_key: String,
    pub items: Vec<CollatedItem>,
}

/// Collated output for the application container.
#[derive(Debug, Serialize)]
pub struct CollatedContainer {
    pub name: String,
    pub buckets: Vec<PathBucket>,
}

/// Collated output for one sub-router container.
#[derive(Debug, Serialize)]
pub struct CollatedRouter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub buckets: Vec<PathBucket>,
}

/// Complete collated report; same shape as the walk report with each item
/// list replaced by ordered buckets.
#[derive(Debug, Serialize)]
pub struct CollatedReport {
    pub app: CollatedContainer,
    pub routers: Vec<CollatedRouter>,
}

/// Group a walk report's items into first-seen-order path buckets.
pub fn collate(report: WalkReport) -> CollatedReport {
    CollatedReport {
        app: CollatedContainer {
            name: report.app.name,
            buckets: collate_items(report.app.items),
        },
        routers: report
            .routers
            .into_iter()
            .map(|router| CollatedRouter {
                name: router.name,
                index: router.index,
                buckets: collate_items(router.items),
            })
            .collect(),
    }
}

fn collate_items(items: Vec<DocItem>) -> Vec<PathBucket> {
    let mut buckets: Vec<PathBucket> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for item in items {
        let simplified = simplify_chain(&item.path_chain);
        let entry = CollatedItem {
            simple_path: simplified.tokens,
            item,
        };
        match positions.get(&simplified.sort_key) {
            Some(&at) => buckets[at].items.push(entry),
            None => {
                positions.insert(simplified.sort_key.clone(), buckets.len());
                buckets.push(PathBucket {
                    sort_key: simplified.sort_key,
                    items: vec![entry],
                });
            }
        }
    }

    buckets
}
