//! Component health registry.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

/// Health state of one dependency.
#[derive(Debug)]
pub struct ComponentHealth {
    name: &'static str,
    healthy: AtomicBool,
    message: RwLock<Option<String>>,
}

impl ComponentHealth {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            healthy: AtomicBool::new(false),
            message: RwLock::new(None),
        }
    }

    pub fn set_healthy(&self) {
        self.healthy.store(true, Ordering::Relaxed);
        *self.message.write() = None;
    }

    pub fn set_unhealthy(&self, msg: impl Into<String>) {
        self.healthy.store(false, Ordering::Relaxed);
        *self.message.write() = Some(msg.into());
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> ComponentReport {
        ComponentReport {
            name: self.name.to_string(),
            healthy: self.is_healthy(),
            message: self.message.read().clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentReport {
    pub name: String,
    pub healthy: bool,
    pub message: Option<String>,
}

/// All tracked dependencies of the service.
#[derive(Debug)]
pub struct HealthRegistry {
    pub store: ComponentHealth,
    pub content_resolver: ComponentHealth,
}

impl HealthRegistry {
    const fn new() -> Self {
        Self {
            store: ComponentHealth::new("store"),
            content_resolver: ComponentHealth::new("content_resolver"),
        }
    }

    /// Ready to serve redirects; only the store is load-bearing, the
    /// content resolver degrades to 404s on the split path.
    pub fn is_ready(&self) -> bool {
        self.store.is_healthy()
    }

    pub fn report(&self) -> Vec<ComponentReport> {
        vec![self.store.report(), self.content_resolver.report()]
    }
}

static HEALTH: OnceLock<HealthRegistry> = OnceLock::new();

/// Global health registry.
pub fn health() -> &'static HealthRegistry {
    HEALTH.get_or_init(HealthRegistry::new)
}
