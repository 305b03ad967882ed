//! Ordered component registry.
//!
//! Components are kept in insertion order, which is both the init order and
//! the stop order. No deduplication: registering the same kind of component
//! twice manages two instances.

use std::sync::Arc;

use crate::component::Component;

/// Components registered before start-up.
#[derive(Default)]
pub struct ComponentRegistry {
    components: Vec<Box<dyn Component>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component after those already registered.
    pub fn register<C: Component>(&mut self, component: C) {
        self.components.push(Box::new(component));
    }

    pub fn register_boxed(&mut self, component: Box<dyn Component>) {
        self.components.push(component);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Component> {
        self.components.iter().map(|c| c.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Component>> {
        self.components.iter_mut()
    }

    /// Freeze the registry once initialisation is done so components can be
    /// shared with concurrently running tasks.
    pub fn into_shared(self) -> Arc<[Arc<dyn Component>]> {
        self.components
            .into_iter()
            .map(Arc::<dyn Component>::from)
            .collect()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(crate::component::describe))
            .finish()
    }
}
