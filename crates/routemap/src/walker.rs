// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tree walker.
//!
//! Traverses the container graph with a FIFO worklist: a container is
//! enqueued at most once, checked at the moment of discovery, so the walk
//! terminates on any finite graph regardless of mount cycles. Within one
//! container the walk is depth-first, threading an append-only path chain;
//! each child receives its parent's chain plus its own element, so siblings
//! never see each other's extensions. Inline sub-application mounts are
//! traversed in place; a container repeating on the active inline chain is
//! rejected as a cycle rather than recursed into.

use crate::registry::{AnnotationStore, DocAnnotation};
use crate::topology::{Container, ContainerId, NodeKind, PathChainElement, RoutingNode, Topology};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

/// Structural invariant violations. Fatal: the walk aborts rather than
/// silently skipping, since any of these indicates a broken registration.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("No application container reachable from the walk root")]
    NoApplication,

    #[error("Multiple application containers encountered in one walk")]
    MultipleApplications,

    #[error("Unknown container {0:?}")]
    UnknownContainer(ContainerId),

    #[error("Inline mount cycle through container {0:?}")]
    InlineMountCycle(ContainerId),

    #[error("Route group contains a non-method child")]
    MalformedRouteGroup,
}

/// One documented topology entry.
#[derive(Debug, Clone, Serialize)]
pub struct DocItem {
    /// Item kind plus kind-specific payload.
    pub kind: DocItemKind,

    /// Per-node path contributions from the root to this item.
    pub path_chain: Vec<PathChainElement>,

    /// Attached documentation, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<DocAnnotation>,
}

/// Doc item discriminant.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DocItemKind {
    /// Terminal verb handler.
    Method { verb: String },

    /// A documented route group. Emitted only when the group itself
    /// carries a doc; its methods are emitted either way.
    Route,

    /// A container heading its own item list (or an inline sub-application
    /// mount).
    Container {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// A mount point referencing another container. The attached doc
    /// belongs to the mount call, not to the referent.
    ContainerRef {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// Opaque middleware handler.
    Middleware {
        #[serde(skip_serializing_if = "Option::is_none")]
        handler: Option<String>,
    },
}

/// Walk output for the application container.
#[derive(Debug, Serialize)]
pub struct ContainerReport {
    pub name: String,
    pub items: Vec<DocItem>,
}

/// Walk output for one sub-router container.
#[derive(Debug, Serialize)]
pub struct RouterReport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub items: Vec<DocItem>,
}

/// Complete walk output: exactly one application plus routers ordered by
/// registration index.
#[derive(Debug, Serialize)]
pub struct WalkReport {
    pub app: ContainerReport,
    pub routers: Vec<RouterReport>,
}

/// Walk the container graph rooted at `root`, producing one ordered doc
/// item list per distinct container.
pub fn walk(
    topology: &Topology,
    root: ContainerId,
    store: &dyn AnnotationStore,
) -> Result<WalkReport, WalkError> {
    let mut state = WalkState {
        topology,
        store,
        queue: VecDeque::new(),
        discovered: HashSet::new(),
        inline_stack: Vec::new(),
    };
    state.discover(root);

    let mut processed: Vec<(ContainerId, Vec<DocItem>)> = Vec::new();
    while let Some(current) = state.queue.pop_front() {
        let items = state.process(current)?;
        processed.push((current, items));
    }

    tracing::debug!(containers = processed.len(), "walk complete");
    assemble(topology, store, processed)
}

struct WalkState<'a> {
    topology: &'a Topology,
    store: &'a dyn AnnotationStore,
    queue: VecDeque<ContainerId>,
    discovered: HashSet<ContainerId>,
    /// Containers currently open as inline mounts; a repeat is a cycle
    /// that would otherwise recurse without bound.
    inline_stack: Vec<ContainerId>,
}

impl<'a> WalkState<'a> {
    fn discover(&mut self, id: ContainerId) {
        if self.discovered.insert(id) {
            tracing::debug!(container = id.index(), "container discovered");
            self.queue.push_back(id);
        }
    }

    fn container(&self, id: ContainerId) -> Result<&'a Container, WalkError> {
        self.topology.get(id).ok_or(WalkError::UnknownContainer(id))
    }

    /// Process one dequeued container in a fresh path context.
    fn process(&mut self, id: ContainerId) -> Result<Vec<DocItem>, WalkError> {
        let container = self.container(id)?;
        let element = if container.is_app {
            PathChainElement::mount("/")
        } else {
            PathChainElement::literal("/")
        };

        let mut items = Vec::new();
        self.inline_stack.clear();
        self.inline_stack.push(id);
        self.emit_container(id, container, vec![element], None, &mut items)?;
        Ok(items)
    }

    /// Emit the container item itself, then its children depth-first with
    /// the chain extended by the container's element.
    ///
    /// `doc` is the mount call's annotation. When the mount carried none,
    /// the container's own registered doc fills the item, so an
    /// undocumented inline mount still surfaces the target's doc.
    fn emit_container(
        &mut self,
        id: ContainerId,
        container: &'a Container,
        chain: Vec<PathChainElement>,
        doc: Option<DocAnnotation>,
        items: &mut Vec<DocItem>,
    ) -> Result<(), WalkError> {
        let doc = doc.or_else(|| self.store.container_doc(id).cloned());
        items.push(DocItem {
            kind: DocItemKind::Container {
                name: self.store.container_name(id).map(str::to_string),
                index: self.store.container_index(id),
            },
            path_chain: chain.clone(),
            doc,
        });

        for child in &container.children {
            self.visit(child, &chain, items)?;
        }
        Ok(())
    }

    fn visit(
        &mut self,
        node: &'a RoutingNode,
        chain: &[PathChainElement],
        items: &mut Vec<DocItem>,
    ) -> Result<(), WalkError> {
        let mut chain = chain.to_vec();
        chain.push(node.chain_element());
        let doc = self.store.node_doc(node.id).cloned();

        match &node.kind {
            NodeKind::Method { verb, .. } => {
                items.push(DocItem {
                    kind: DocItemKind::Method { verb: verb.clone() },
                    path_chain: chain,
                    doc,
                });
            }
            NodeKind::RouteGroup { methods } => {
                // Undocumented groups produce no item of their own; their
                // methods are emitted either way, under the group's chain.
                if doc.is_some() {
                    items.push(DocItem {
                        kind: DocItemKind::Route,
                        path_chain: chain.clone(),
                        doc,
                    });
                }
                for method in methods {
                    if !matches!(method.kind, NodeKind::Method { .. }) {
                        return Err(WalkError::MalformedRouteGroup);
                    }
                    self.visit(method, &chain, items)?;
                }
            }
            NodeKind::Container { target } => {
                if self.inline_stack.contains(target) {
                    return Err(WalkError::InlineMountCycle(*target));
                }
                let container = self.container(*target)?;
                self.inline_stack.push(*target);
                self.emit_container(*target, container, chain, doc, items)?;
                self.inline_stack.pop();
            }
            NodeKind::ContainerRef { target } => {
                self.container(*target)?;
                items.push(DocItem {
                    kind: DocItemKind::ContainerRef {
                        name: self.store.container_name(*target).map(str::to_string),
                        index: self.store.container_index(*target),
                    },
                    path_chain: chain,
                    doc,
                });
                self.discover(*target);
            }
            NodeKind::Middleware { name } => {
                items.push(DocItem {
                    kind: DocItemKind::Middleware {
                        handler: name.clone(),
                    },
                    path_chain: chain,
                    doc,
                });
            }
        }
        Ok(())
    }
}

fn assemble(
    topology: &Topology,
    store: &dyn AnnotationStore,
    processed: Vec<(ContainerId, Vec<DocItem>)>,
) -> Result<WalkReport, WalkError> {
    let mut app: Option<ContainerReport> = None;
    let mut routers: Vec<RouterReport> = Vec::new();

    for (id, items) in processed {
        let container = topology.get(id).ok_or(WalkError::UnknownContainer(id))?;
        if container.is_app {
            if app.is_some() {
                return Err(WalkError::MultipleApplications);
            }
            app = Some(ContainerReport {
                name: "<app>".to_string(),
                items,
            });
        } else {
            routers.push(RouterReport {
                name: store
                    .container_name(id)
                    .unwrap_or("<unnamed>")
                    .to_string(),
                index: store.container_index(id),
                items,
            });
        }
    }

    routers.sort_by_key(|router| router.index.unwrap_or(usize::MAX));

    Ok(WalkReport {
        app: app.ok_or(WalkError::NoApplication)?,
        routers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DocAnnotation, Registry};
    use crate::topology::NodeId;

    fn doc(text: &str) -> Option<DocAnnotation> {
        Some(DocAnnotation::new(text))
    }

    /// Store with no annotations at all, for walks over hand-built arenas.
    struct EmptyStore;

    impl AnnotationStore for EmptyStore {
        fn node_doc(&self, _node: NodeId) -> Option<&DocAnnotation> {
            None
        }

        fn container_doc(&self, _container: ContainerId) -> Option<&DocAnnotation> {
            None
        }

        fn container_name(&self, _container: ContainerId) -> Option<&str> {
            None
        }

        fn container_index(&self, _container: ContainerId) -> Option<usize> {
            None
        }
    }

    fn bare_node(id: u64, kind: NodeKind) -> RoutingNode {
        RoutingNode {
            id: NodeId(id),
            literal: None,
            pattern: None,
            mount: None,
            kind,
        }
    }

    #[test]
    fn test_root_method_scenario() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        registry
            .register_method(app, "get", "/", "root", doc("root"))
            .unwrap();

        let report = walk(registry.topology(), app, &registry).unwrap();
        assert_eq!(report.app.name, "<app>");
        assert!(report.routers.is_empty());

        // Container item plus the method item.
        assert_eq!(report.app.items.len(), 2);
        match &report.app.items[1].kind {
            DocItemKind::Method { verb } => assert_eq!(verb, "get"),
            other => panic!("unexpected kind: {other:?}"),
        }
        assert_eq!(report.app.items[1].doc.as_ref().unwrap().text(), "root");
    }

    #[test]
    fn test_walk_root_must_be_application() {
        let mut registry = Registry::new();
        registry.application(None);
        let lonely = registry.router(Some("lonely"), None);

        assert!(matches!(
            walk(registry.topology(), lonely, &registry),
            Err(WalkError::NoApplication)
        ));
    }

    #[test]
    fn test_second_application_is_fatal() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        let other = registry.application(None);
        registry.mount(app, "/other/", other, None).unwrap();

        assert!(matches!(
            walk(registry.topology(), app, &registry),
            Err(WalkError::MultipleApplications)
        ));
    }

    #[test]
    fn test_self_mount_terminates() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        let recursive = registry.router(Some("recursive"), None);
        registry
            .register_method(recursive, "get", "/", "made_it", None)
            .unwrap();
        registry.mount(recursive, "/more/", recursive, None).unwrap();
        registry.mount(app, "/recursive/", recursive, None).unwrap();

        let report = walk(registry.topology(), app, &registry).unwrap();
        assert_eq!(report.routers.len(), 1);

        let refs = report.routers[0]
            .items
            .iter()
            .filter(|item| matches!(item.kind, DocItemKind::ContainerRef { .. }))
            .count();
        assert_eq!(refs, 1);
    }

    #[test]
    fn test_diamond_mount_processed_once() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        let shared = registry.router(Some("shared"), None);
        registry
            .register_method(shared, "get", "/", "shared_root", None)
            .unwrap();
        registry.mount(app, "/a/", shared, None).unwrap();
        registry.mount(app, "/b/", shared, None).unwrap();

        let report = walk(registry.topology(), app, &registry).unwrap();

        let refs = report
            .app
            .items
            .iter()
            .filter(|item| matches!(item.kind, DocItemKind::ContainerRef { .. }))
            .count();
        assert_eq!(refs, 2);
        assert_eq!(report.routers.len(), 1);
        assert_eq!(report.routers[0].name, "shared");
    }

    #[test]
    fn test_undocumented_group_emits_no_route_item() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        registry
            .register_method(app, "get", "/plain", "plain", None)
            .unwrap();

        let report = walk(registry.topology(), app, &registry).unwrap();
        assert!(report
            .app
            .items
            .iter()
            .all(|item| !matches!(item.kind, DocItemKind::Route)));
        assert!(report
            .app
            .items
            .iter()
            .any(|item| matches!(item.kind, DocItemKind::Method { .. })));
    }

    #[test]
    fn test_documented_group_emits_route_item_before_methods() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        let route = registry
            .route(app, "/base/:param/", doc("route doc cool"))
            .unwrap();
        registry
            .route_method(route, "get", "get_it", doc("get it"))
            .unwrap();
        registry
            .route_method(route, "put", "put_it", doc("put it"))
            .unwrap();

        let report = walk(registry.topology(), app, &registry).unwrap();
        let kinds: Vec<&DocItemKind> = report.app.items.iter().map(|i| &i.kind).collect();
        assert!(matches!(kinds[1], DocItemKind::Route));
        assert!(matches!(kinds[2], DocItemKind::Method { .. }));
        assert!(matches!(kinds[3], DocItemKind::Method { .. }));

        // Methods share the group's chain length: group element plus their
        // own separator element.
        assert_eq!(
            report.app.items[2].path_chain.len(),
            report.app.items[1].path_chain.len() + 1
        );
    }

    #[test]
    fn test_mount_doc_belongs_to_mount_call() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        let named = registry.router(Some("named"), doc("router doc"));
        registry
            .mount(app, "/named/", named, doc("mount doc"))
            .unwrap();

        let report = walk(registry.topology(), app, &registry).unwrap();

        let mount_item = report
            .app
            .items
            .iter()
            .find(|item| matches!(item.kind, DocItemKind::ContainerRef { .. }))
            .unwrap();
        assert_eq!(mount_item.doc.as_ref().unwrap().text(), "mount doc");

        // The router's own doc shows up on its container item instead.
        let head = &report.routers[0].items[0];
        assert_eq!(head.doc.as_ref().unwrap().text(), "router doc");
    }

    #[test]
    fn test_routers_ordered_by_registration_index() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        let first = registry.router(Some("first"), None);
        let second = registry.router(Some("second"), None);

        // Mounted in reverse discovery order; report order follows the
        // registration index regardless.
        registry.mount(app, "/second/", second, None).unwrap();
        registry.mount(app, "/first/", first, None).unwrap();

        let report = walk(registry.topology(), app, &registry).unwrap();
        let names: Vec<&str> = report.routers.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(report.routers[0].index, Some(0));
        assert_eq!(report.routers[1].index, Some(1));
    }

    #[test]
    fn test_inline_self_mount_is_fatal() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        registry.mount_application(app, "/loop", app, None).unwrap();

        assert!(matches!(
            walk(registry.topology(), app, &registry),
            Err(WalkError::InlineMountCycle(_))
        ));
    }

    #[test]
    fn test_indirect_inline_cycle_is_fatal() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        let sub = registry.router(Some("sub"), None);
        registry.mount_application(app, "/sub", sub, None).unwrap();
        registry.mount_application(sub, "/back", app, None).unwrap();

        assert!(matches!(
            walk(registry.topology(), app, &registry),
            Err(WalkError::InlineMountCycle(_))
        ));
    }

    #[test]
    fn test_repeated_inline_mount_of_same_target_is_not_a_cycle() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        let shared = registry.router(Some("shared"), None);
        registry
            .register_method(shared, "get", "/", "shared_root", None)
            .unwrap();

        // Two sibling inline mounts of one container: fine, only nesting
        // through the active chain is cyclic.
        registry.mount_application(app, "/a", shared, None).unwrap();
        registry.mount_application(app, "/b", shared, None).unwrap();

        let report = walk(registry.topology(), app, &registry).unwrap();
        let inline_heads = report
            .app
            .items
            .iter()
            .filter(|item| {
                matches!(&item.kind, DocItemKind::Container { name: Some(n), .. } if n == "shared")
            })
            .count();
        assert_eq!(inline_heads, 2);
    }

    #[test]
    fn test_dangling_container_ref_is_fatal() {
        let mut topology = Topology::new();
        let app = topology.insert(Container {
            children: Vec::new(),
            is_app: true,
        });
        topology.get_mut(app).unwrap().children.push(bare_node(
            1,
            NodeKind::ContainerRef {
                target: ContainerId(99),
            },
        ));

        assert!(matches!(
            walk(&topology, app, &EmptyStore),
            Err(WalkError::UnknownContainer(_))
        ));
    }

    #[test]
    fn test_non_method_group_child_is_fatal() {
        let mut topology = Topology::new();
        let app = topology.insert(Container {
            children: Vec::new(),
            is_app: true,
        });
        topology.get_mut(app).unwrap().children.push(bare_node(
            1,
            NodeKind::RouteGroup {
                methods: vec![bare_node(2, NodeKind::Middleware { name: None })],
            },
        ));

        assert!(matches!(
            walk(&topology, app, &EmptyStore),
            Err(WalkError::MalformedRouteGroup)
        ));
    }

    #[test]
    fn test_undocumented_inline_mount_surfaces_container_doc() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        let sub = registry.router(Some("inline"), doc("container doc"));
        registry.mount_application(app, "/sub", sub, None).unwrap();

        let report = walk(registry.topology(), app, &registry).unwrap();
        let inline = report
            .app
            .items
            .iter()
            .find(|item| {
                matches!(&item.kind, DocItemKind::Container { name: Some(n), .. } if n == "inline")
            })
            .unwrap();
        assert_eq!(inline.doc.as_ref().unwrap().text(), "container doc");
    }

    #[test]
    fn test_inline_application_mount_traversed_in_place() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        let sub = registry.router(Some("inline"), None);
        registry
            .register_method(sub, "get", "/pong", "pong", None)
            .unwrap();
        registry
            .mount_application(app, "/sub", sub, doc("inline mount"))
            .unwrap();

        let report = walk(registry.topology(), app, &registry).unwrap();
        // Everything lands in the app's item list; nothing was enqueued.
        assert!(report.routers.is_empty());

        let inline = report
            .app
            .items
            .iter()
            .find(|item| {
                matches!(&item.kind, DocItemKind::Container { name: Some(n), .. } if n == "inline")
            })
            .unwrap();
        assert_eq!(inline.doc.as_ref().unwrap().text(), "inline mount");
        assert_eq!(inline.path_chain.last().unwrap().mount.as_deref(), Some("/sub"));
    }
}
