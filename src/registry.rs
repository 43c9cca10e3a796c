use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxHashMap;

use crate::handler::{
    default_handler,
    Handler,
    HandlerRef
};

/// Resolves a channel name to its handler.
pub trait Lookup {
    fn lookup(&self, name: &str) -> Option<HandlerRef>;
}

/// Single-owner channel registry.
///
/// Registration needs `&mut self`, so it can never race with a dispatch
/// through the same registry. Share it behind your own lock, or use
/// [`SharedRegistry`], when channels change while other threads log.
#[derive(Default)]
pub struct Registry {
    handlers: FxHashMap<String, HandlerRef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `name` to `handler`, replacing any previous handler.
    pub fn register<H>(&mut self, name: impl Into<String>, handler: H)
    where
        H: Handler + 'static,
    {
        let name = name.into();
        info!("Registering log channel {}", name);
        if self.handlers.insert(name, Arc::new(handler)).is_some() {
            info!("Replaced previous handler");
        }
    }

    /// Routes `name` to [`default_handler`].
    pub fn register_default(&mut self, name: impl Into<String>) {
        self.register(name, default_handler)
    }

    pub fn deregister(&mut self, name: &str) {
        if self.handlers.remove(name).is_some() {
            info!("Deregistered log channel {}", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }
}

impl Lookup for Registry {
    fn lookup(&self, name: &str) -> Option<HandlerRef> {
        self.handlers.get(name).cloned()
    }
}

/// Channel registry that can be changed while other threads dispatch.
#[derive(Default)]
pub struct SharedRegistry {
    handlers: DashMap<String, HandlerRef>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `name` to `handler`, replacing any previous handler.
    pub fn register<H>(&self, name: impl Into<String>, handler: H)
    where
        H: Handler + 'static,
    {
        let name = name.into();
        info!("Registering log channel {}", name);
        if self.handlers.insert(name, Arc::new(handler)).is_some() {
            info!("Replaced previous handler");
        }
    }

    /// Routes `name` to [`default_handler`].
    pub fn register_default(&self, name: impl Into<String>) {
        self.register(name, default_handler)
    }

    pub fn deregister(&self, name: &str) {
        if self.handlers.remove(name).is_some() {
            info!("Deregistered log channel {}", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.handlers.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl Lookup for SharedRegistry {
    // The shard guard is released before the handler runs, so handlers may
    // register or deregister channels themselves.
    fn lookup(&self, name: &str) -> Option<HandlerRef> {
        self.handlers.get(name).map(|entry| Arc::clone(entry.value()))
    }
}
