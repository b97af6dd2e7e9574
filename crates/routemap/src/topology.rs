// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Routing topology data model.
//!
//! Containers live in an arena addressed by stable serial index, so a
//! sub-router can be mounted at multiple paths or even reference itself
//! without the graph owning cycles. A node's kind is fixed at construction;
//! traversal dispatches on the discriminant alone.

use crate::pattern::PathPattern;
use serde::Serialize;

/// Stable identity of a container in the topology arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ContainerId(pub(crate) usize);

impl ContainerId {
    /// Arena serial index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stable identity of a registered node, used for annotation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub(crate) u64);

/// Handle to a grouped route created by `Registry::route`.
#[derive(Debug, Clone, Copy)]
pub struct RouteId {
    pub(crate) container: ContainerId,
    pub(crate) position: usize,
}

/// What a routing node is. Fixed at construction; never inferred from
/// which optional fields happen to be present.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Terminal verb handler.
    Method { verb: String, handler: String },

    /// A shared path holding one or more method children.
    RouteGroup { methods: Vec<RoutingNode> },

    /// Inline sub-application mount; its children are traversed in place.
    Container { target: ContainerId },

    /// Leaf reference to another container (a router mount). The referent
    /// is traversed independently, in its own path context.
    ContainerRef { target: ContainerId },

    /// Opaque handler with an optional name.
    Middleware { name: Option<String> },
}

/// One node in a container's child sequence.
#[derive(Debug, Clone)]
pub struct RoutingNode {
    /// Node identity.
    pub id: NodeId,

    /// Literal path segment, when the registration carried one.
    pub literal: Option<String>,

    /// Compiled path matcher, when the registration compiled one.
    pub pattern: Option<PathPattern>,

    /// Mount-point fragment, for inline sub-application mounts.
    pub mount: Option<String>,

    /// Kind discriminant.
    pub kind: NodeKind,
}

impl RoutingNode {
    /// The path contribution this node adds to its chain.
    ///
    /// A compiled pattern or mount fragment supersedes the literal; a node
    /// with none of the three contributes the bare separator.
    pub fn chain_element(&self) -> PathChainElement {
        let literal = if self.pattern.is_some() || self.mount.is_some() {
            self.literal.clone()
        } else {
            Some(self.literal.clone().unwrap_or_else(|| "/".to_string()))
        };

        PathChainElement {
            literal,
            pattern: self.pattern.clone(),
            mount: self.mount.clone(),
        }
    }
}

/// One node's contribution to the path from the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathChainElement {
    /// Literal path segment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,

    /// Compiled matcher; carries the capture names consumed downstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<PathPattern>,

    /// Mount-point fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
}

impl PathChainElement {
    /// Element contributing a literal segment.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            literal: Some(text.into()),
            pattern: None,
            mount: None,
        }
    }

    /// Element contributing a compiled pattern.
    pub fn pattern(pattern: PathPattern) -> Self {
        Self {
            literal: None,
            pattern: Some(pattern),
            mount: None,
        }
    }

    /// Element contributing a mount-point fragment.
    pub fn mount(text: impl Into<String>) -> Self {
        Self {
            literal: None,
            pattern: None,
            mount: Some(text.into()),
        }
    }
}

/// A routing container: the application root or a mountable sub-router.
#[derive(Debug, Clone, Default)]
pub struct Container {
    /// Ordered child nodes.
    pub children: Vec<RoutingNode>,

    /// Whether this container is an application root.
    pub is_app: bool,
}

/// Arena of containers addressed by stable serial index.
#[derive(Debug, Default)]
pub struct Topology {
    containers: Vec<Container>,
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a container, returning its stable identity.
    pub fn insert(&mut self, container: Container) -> ContainerId {
        let id = ContainerId(self.containers.len());
        self.containers.push(container);
        id
    }

    /// Look up a container by identity.
    pub fn get(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.0)
    }

    /// Look up a container mutably.
    pub fn get_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.containers.get_mut(id.0)
    }

    /// Number of containers in the arena.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Whether the arena holds no containers.
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}
