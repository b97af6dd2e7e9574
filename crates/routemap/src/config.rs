// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Topology configuration.
//!
//! Describes a routing topology declaratively so it can be walked and
//! rendered from the command line without a host application.

use crate::registry::{DocAnnotation, Registry, RegistryError};
use crate::topology::ContainerId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<RegistryError> for ConfigError {
    fn from(err: RegistryError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

/// Top-level topology description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Application-level settings.
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Sub-routers, in registration order.
    #[serde(default)]
    pub routers: Vec<RouterConfig>,

    /// Verb registrations, simple or grouped.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    /// Middleware registrations.
    #[serde(default)]
    pub middlewares: Vec<MiddlewareConfig>,

    /// Router mounts.
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
}

/// Application container settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Documentation for the application itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// One sub-router declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Router name; also how routes and mounts refer to it.
    pub name: String,

    /// Documentation for the router itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// One route registration. Either `verb` (simple registration) or
/// `methods` (grouped registration) must be present, not both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Owning router name; omit for the application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Registration path; `:name` segments become parameters.
    pub path: String,

    /// Verb for a simple registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,

    /// Handler name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    /// Documentation. Attaches to the method for a simple registration,
    /// to the route group for a grouped one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    /// Methods of a grouped registration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodConfig>,
}

/// One method of a grouped route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodConfig {
    pub verb: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// One middleware registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Path prefix; defaults to the root.
    #[serde(default = "default_path")]
    pub path: String,

    /// Middleware name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// One router mount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Mount path prefix.
    pub path: String,

    /// Name of the mounted router.
    pub router: String,

    /// Documentation for the mount call itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

fn default_path() -> String {
    "/".to_string()
}

fn default_handler() -> String {
    "<anonymous>".to_string()
}

impl TopologyConfig {
    /// Load and validate a topology from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for router in &self.routers {
            if router.name.is_empty() {
                return Err(ConfigError::Invalid("Router name must not be empty".into()));
            }
            if !names.insert(router.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate router name '{}'",
                    router.name
                )));
            }
        }

        let known = |owner: &Option<String>| match owner {
            None => true,
            Some(name) => names.contains(name.as_str()),
        };

        for route in &self.routes {
            if !known(&route.owner) {
                return Err(ConfigError::Invalid(format!(
                    "Route '{}' references unknown router '{}'",
                    route.path,
                    route.owner.as_deref().unwrap_or("")
                )));
            }
            match (&route.verb, route.methods.is_empty()) {
                (Some(_), false) => {
                    return Err(ConfigError::Invalid(format!(
                        "Route '{}' has both a verb and a method list",
                        route.path
                    )))
                }
                (None, true) => {
                    return Err(ConfigError::Invalid(format!(
                        "Route '{}' has neither a verb nor a method list",
                        route.path
                    )))
                }
                _ => {}
            }
        }

        for middleware in &self.middlewares {
            if !known(&middleware.owner) {
                return Err(ConfigError::Invalid(format!(
                    "Middleware on '{}' references unknown router '{}'",
                    middleware.path,
                    middleware.owner.as_deref().unwrap_or("")
                )));
            }
        }

        for mount in &self.mounts {
            if !known(&mount.owner) {
                return Err(ConfigError::Invalid(format!(
                    "Mount '{}' references unknown owner '{}'",
                    mount.path,
                    mount.owner.as_deref().unwrap_or("")
                )));
            }
            if !names.contains(mount.router.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "Mount '{}' references unknown router '{}'",
                    mount.path, mount.router
                )));
            }
        }

        Ok(())
    }

    /// Build a registry from this description. Registrations happen in
    /// section order: routers, middlewares, routes, mounts.
    pub fn build(&self) -> Result<(Registry, ContainerId), ConfigError> {
        let mut registry = Registry::new();
        let app = registry.application(self.application.doc.as_deref().map(DocAnnotation::new));

        let mut by_name: HashMap<&str, ContainerId> = HashMap::new();
        for router in &self.routers {
            let id = registry.router(
                Some(&router.name),
                router.doc.as_deref().map(DocAnnotation::new),
            );
            by_name.insert(router.name.as_str(), id);
        }

        let resolve = |owner: &Option<String>| -> Result<ContainerId, ConfigError> {
            match owner {
                None => Ok(app),
                Some(name) => by_name.get(name.as_str()).copied().ok_or_else(|| {
                    ConfigError::Invalid(format!("Unknown router '{name}'"))
                }),
            }
        };

        for middleware in &self.middlewares {
            registry.middleware(
                resolve(&middleware.owner)?,
                &middleware.path,
                middleware.name.as_deref(),
                middleware.doc.as_deref().map(DocAnnotation::new),
            )?;
        }

        for route in &self.routes {
            let owner = resolve(&route.owner)?;
            let handler = route.handler.clone().unwrap_or_else(default_handler);
            if let Some(verb) = &route.verb {
                registry.register_method(
                    owner,
                    verb,
                    &route.path,
                    &handler,
                    route.doc.as_deref().map(DocAnnotation::new),
                )?;
            } else {
                let group = registry.route(
                    owner,
                    &route.path,
                    route.doc.as_deref().map(DocAnnotation::new),
                )?;
                for method in &route.methods {
                    let handler = method.handler.clone().unwrap_or_else(default_handler);
                    registry.route_method(
                        group,
                        &method.verb,
                        &handler,
                        method.doc.as_deref().map(DocAnnotation::new),
                    )?;
                }
            }
        }

        for mount in &self.mounts {
            let target = by_name.get(mount.router.as_str()).copied().ok_or_else(|| {
                ConfigError::Invalid(format!("Unknown router '{}'", mount.router))
            })?;
            registry.mount(
                resolve(&mount.owner)?,
                &mount.path,
                target,
                mount.doc.as_deref().map(DocAnnotation::new),
            )?;
        }

        Ok((registry, app))
    }

    /// Example configuration for `gen-config`.
    pub fn example() -> Self {
        Self {
            application: ApplicationConfig {
                doc: Some("what a superb app".to_string()),
            },
            routers: vec![RouterConfig {
                name: "basic".to_string(),
                doc: Some("just your plain basic router".to_string()),
            }],
            routes: vec![
                RouteConfig {
                    owner: None,
                    path: "/".to_string(),
                    verb: Some("get".to_string()),
                    handler: Some("hello".to_string()),
                    doc: Some("Says 'hello world'".to_string()),
                    methods: Vec::new(),
                },
                RouteConfig {
                    owner: Some("basic".to_string()),
                    path: "/parameterized/:fizz/:buzz/const/:quux".to_string(),
                    verb: Some("get".to_string()),
                    handler: Some("params".to_string()),
                    doc: Some("Spits your params back out at you".to_string()),
                    methods: Vec::new(),
                },
            ],
            middlewares: Vec::new(),
            mounts: vec![MountConfig {
                owner: None,
                path: "/basic/".to_string(),
                router: "basic".to_string(),
                doc: None,
            }],
        }
    }
}
