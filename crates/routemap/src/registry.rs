// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Annotation store and registration API.
//!
//! The [`Registry`] builds the container arena and records every
//! documentation annotation at registration time. There is no pending-doc
//! slot: each registration call takes its annotation as an explicit
//! argument, so two back-to-back registrations can never steal each
//! other's documentation.
//!
//! The walker consumes the registry only through the read-only
//! [`AnnotationStore`] trait.

use crate::pattern::PathPattern;
use crate::topology::{
    Container, ContainerId, NodeId, NodeKind, RouteId, RoutingNode, Topology,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Registration errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown container {0:?}")]
    UnknownContainer(ContainerId),

    #[error("Route handle does not refer to a route group")]
    UnknownRoute,
}

/// An opaque documentation blob attached to a node or container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocAnnotation(String);

impl DocAnnotation {
    /// Wrap a finished annotation string.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Reassemble a declaration from literal fragments and interpolated
    /// values, interleaved in order. With no values, fragments join on
    /// newlines.
    pub fn from_fragments(literals: &[&str], values: &[&str]) -> Self {
        if values.is_empty() {
            return Self(literals.join("\n"));
        }

        let mut text = String::new();
        for (i, value) in values.iter().enumerate() {
            text.push_str(literals.get(i).copied().unwrap_or(""));
            text.push_str(value);
        }
        text.push_str(literals.get(values.len()).copied().unwrap_or(""));
        Self(text)
    }

    /// The annotation text.
    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only documentation lookups performed during a walk.
pub trait AnnotationStore {
    /// Documentation attached to a node, if any.
    fn node_doc(&self, node: NodeId) -> Option<&DocAnnotation>;

    /// Documentation attached to a container itself, if any.
    fn container_doc(&self, container: ContainerId) -> Option<&DocAnnotation>;

    /// Human-readable container name, if one was registered.
    fn container_name(&self, container: ContainerId) -> Option<&str>;

    /// Stable registration index; absent for containers never registered
    /// as routers (the application root has no index).
    fn container_index(&self, container: ContainerId) -> Option<usize>;
}

/// Concrete annotation store plus the registration API that builds the
/// container arena.
#[derive(Debug, Default)]
pub struct Registry {
    topology: Topology,
    next_node: u64,
    node_docs: HashMap<NodeId, DocAnnotation>,
    container_docs: HashMap<ContainerId, DocAnnotation>,
    names: HashMap<ContainerId, String>,
    router_order: Vec<ContainerId>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The container arena built so far.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    fn container_mut(&mut self, id: ContainerId) -> Result<&mut Container, RegistryError> {
        self.topology
            .get_mut(id)
            .ok_or(RegistryError::UnknownContainer(id))
    }

    fn attach_node_doc(&mut self, id: NodeId, doc: Option<DocAnnotation>) {
        if let Some(doc) = doc {
            self.node_docs.insert(id, doc);
        }
    }

    /// Create the application root container.
    pub fn application(&mut self, doc: Option<DocAnnotation>) -> ContainerId {
        let id = self.topology.insert(Container {
            children: Vec::new(),
            is_app: true,
        });
        if let Some(doc) = doc {
            self.container_docs.insert(id, doc);
        }
        id
    }

    /// Create a sub-router container, optionally named. The registration
    /// index is assigned here, once, and is stable for the container's
    /// lifetime.
    pub fn router(&mut self, name: Option<&str>, doc: Option<DocAnnotation>) -> ContainerId {
        let id = self.topology.insert(Container::default());
        self.router_order.push(id);
        if let Some(name) = name {
            self.names.insert(id, name.to_string());
        }
        if let Some(doc) = doc {
            self.container_docs.insert(id, doc);
        }
        id
    }

    /// Simple verb registration: creates an implicit route group holding
    /// one method. The doc attaches to the method, never to the implicit
    /// group.
    pub fn register_method(
        &mut self,
        owner: ContainerId,
        verb: &str,
        path: &str,
        handler: &str,
        doc: Option<DocAnnotation>,
    ) -> Result<NodeId, RegistryError> {
        self.push_group(owner, PathPattern::compile(path, true), verb, handler, doc)
    }

    /// As [`Registry::register_method`], but with a framework-supplied raw
    /// pattern instead of a compiled path.
    pub fn register_pattern_method(
        &mut self,
        owner: ContainerId,
        verb: &str,
        pattern: PathPattern,
        handler: &str,
        doc: Option<DocAnnotation>,
    ) -> Result<NodeId, RegistryError> {
        self.push_group(owner, pattern, verb, handler, doc)
    }

    fn push_group(
        &mut self,
        owner: ContainerId,
        pattern: PathPattern,
        verb: &str,
        handler: &str,
        doc: Option<DocAnnotation>,
    ) -> Result<NodeId, RegistryError> {
        let method_id = self.next_node_id();
        let group_id = self.next_node_id();

        let method = RoutingNode {
            id: method_id,
            literal: None,
            pattern: None,
            mount: None,
            kind: NodeKind::Method {
                verb: verb.to_string(),
                handler: handler.to_string(),
            },
        };
        let group = RoutingNode {
            id: group_id,
            literal: None,
            pattern: Some(pattern),
            mount: None,
            kind: NodeKind::RouteGroup {
                methods: vec![method],
            },
        };

        self.container_mut(owner)?.children.push(group);
        self.attach_node_doc(method_id, doc);
        Ok(method_id)
    }

    /// Grouped route registration. The doc attaches to the group; methods
    /// attach through [`Registry::route_method`].
    pub fn route(
        &mut self,
        owner: ContainerId,
        path: &str,
        doc: Option<DocAnnotation>,
    ) -> Result<RouteId, RegistryError> {
        let group_id = self.next_node_id();
        let group = RoutingNode {
            id: group_id,
            literal: None,
            pattern: Some(PathPattern::compile(path, true)),
            mount: None,
            kind: NodeKind::RouteGroup {
                methods: Vec::new(),
            },
        };

        let container = self.container_mut(owner)?;
        let position = container.children.len();
        container.children.push(group);
        self.attach_node_doc(group_id, doc);
        Ok(RouteId {
            container: owner,
            position,
        })
    }

    /// Attach a verb handler to a grouped route.
    pub fn route_method(
        &mut self,
        route: RouteId,
        verb: &str,
        handler: &str,
        doc: Option<DocAnnotation>,
    ) -> Result<NodeId, RegistryError> {
        let method_id = self.next_node_id();
        let method = RoutingNode {
            id: method_id,
            literal: None,
            pattern: None,
            mount: None,
            kind: NodeKind::Method {
                verb: verb.to_string(),
                handler: handler.to_string(),
            },
        };

        let container = self.container_mut(route.container)?;
        let node = container
            .children
            .get_mut(route.position)
            .ok_or(RegistryError::UnknownRoute)?;
        match &mut node.kind {
            NodeKind::RouteGroup { methods } => methods.push(method),
            _ => return Err(RegistryError::UnknownRoute),
        }

        self.attach_node_doc(method_id, doc);
        Ok(method_id)
    }

    /// Register an opaque middleware handler under a path prefix.
    pub fn middleware(
        &mut self,
        owner: ContainerId,
        path: &str,
        name: Option<&str>,
        doc: Option<DocAnnotation>,
    ) -> Result<NodeId, RegistryError> {
        let id = self.next_node_id();
        let node = RoutingNode {
            id,
            literal: None,
            pattern: Some(PathPattern::compile(path, false)),
            mount: None,
            kind: NodeKind::Middleware {
                name: name.map(str::to_string),
            },
        };

        self.container_mut(owner)?.children.push(node);
        self.attach_node_doc(id, doc);
        Ok(id)
    }

    /// Mount a container under a path prefix. The doc belongs to the mount
    /// call, not to the mounted container itself.
    pub fn mount(
        &mut self,
        owner: ContainerId,
        path: &str,
        target: ContainerId,
        doc: Option<DocAnnotation>,
    ) -> Result<NodeId, RegistryError> {
        if self.topology.get(target).is_none() {
            return Err(RegistryError::UnknownContainer(target));
        }

        let id = self.next_node_id();
        let node = RoutingNode {
            id,
            literal: None,
            pattern: Some(PathPattern::compile(path, false)),
            mount: None,
            kind: NodeKind::ContainerRef { target },
        };

        self.container_mut(owner)?.children.push(node);
        self.attach_node_doc(id, doc);
        Ok(id)
    }

    /// Mount a sub-application in place, under a raw mount-point fragment.
    /// Its children are traversed inline rather than in a fresh context.
    pub fn mount_application(
        &mut self,
        owner: ContainerId,
        mount_path: &str,
        target: ContainerId,
        doc: Option<DocAnnotation>,
    ) -> Result<NodeId, RegistryError> {
        if self.topology.get(target).is_none() {
            return Err(RegistryError::UnknownContainer(target));
        }

        let id = self.next_node_id();
        let node = RoutingNode {
            id,
            literal: None,
            pattern: None,
            mount: Some(mount_path.to_string()),
            kind: NodeKind::Container { target },
        };

        self.container_mut(owner)?.children.push(node);
        self.attach_node_doc(id, doc);
        Ok(id)
    }
}

impl AnnotationStore for Registry {
    fn node_doc(&self, node: NodeId) -> Option<&DocAnnotation> {
        self.node_docs.get(&node)
    }

    fn container_doc(&self, container: ContainerId) -> Option<&DocAnnotation> {
        self.container_docs.get(&container)
    }

    fn container_name(&self, container: ContainerId) -> Option<&str> {
        self.names.get(&container).map(String::as_str)
    }

    fn container_index(&self, container: ContainerId) -> Option<usize> {
        self.router_order.iter().position(|id| *id == container)
    }
}
