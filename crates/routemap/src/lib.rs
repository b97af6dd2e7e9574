// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! routemap
//!
//! Documents the routing topology of a request-dispatch tree: walks a
//! potentially cyclic graph of routers exactly once per distinct
//! container, decodes compiled path patterns back into readable templates
//! with named parameters, and collates everything into a stable,
//! deterministically ordered report.
//!
//! # Features
//!
//! - **Cycle-safe traversal**: routers mounted at multiple paths, or even
//!   mounted inside themselves, are each processed once
//! - **Pattern decoding**: compiled matchers decode back to templates like
//!   `/parameterized/:fizz/:buzz`, with graceful fallback for matchers too
//!   complex to simplify
//! - **Explicit documentation**: annotations are passed at registration
//!   time, never parked in shared mutable state
//! - **Collated reporting**: items grouped by simplified path in stable
//!   first-seen order, renderable as text or JSON
//!
//! # Quick Start
//!
//! ```
//! use routemap::{collate, walk, DocAnnotation, Registry};
//!
//! let mut registry = Registry::new();
//! let app = registry.application(None);
//! registry
//!     .register_method(app, "get", "/", "hello", Some(DocAnnotation::new("Says hello")))
//!     .unwrap();
//!
//! let report = walk(registry.topology(), app, &registry).unwrap();
//! let collated = collate(report);
//! assert_eq!(collated.app.buckets.len(), 1);
//! ```
//!
//! # Topology Files
//!
//! ```toml
//! [application]
//! doc = "what a superb app"
//!
//! [[routers]]
//! name = "basic"
//!
//! [[routes]]
//! owner = "basic"
//! path = "/parameterized/:fizz/:buzz/const/:quux"
//! verb = "get"
//!
//! [[mounts]]
//! path = "/basic/"
//! router = "basic"
//! ```

pub mod collate;
pub mod config;
pub mod pattern;
pub mod registry;
pub mod render;
pub mod topology;
pub mod walker;

pub use collate::{
    collate, simplify_chain, CollatedContainer, CollatedItem, CollatedReport, CollatedRouter,
    PathBucket, SimplifiedPath,
};
pub use config::{ConfigError, TopologyConfig};
pub use pattern::{decode, PathPattern, PathToken};
pub use registry::{AnnotationStore, DocAnnotation, Registry, RegistryError};
pub use topology::{
    Container, ContainerId, NodeId, NodeKind, PathChainElement, RouteId, RoutingNode, Topology,
};
pub use walker::{
    walk, ContainerReport, DocItem, DocItemKind, RouterReport, WalkError, WalkReport,
};
