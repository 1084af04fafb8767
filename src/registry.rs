//! The set of layers a [`Processor`](crate::processor::Processor) publishes.
//!
//! A `LayerRegistry` is an ordinary value: the caller creates it, lends it to
//! one or more processors and drops it when done. Layers stay alive for as
//! long as they are registered or referenced elsewhere.
//!
//! ```
//! use std::rc::Rc;
//! use gdal_processor::registry::LayerRegistry;
//! use gdal_processor::spatial_ref::Crs;
//! use gdal_processor::vector::{OGRwkbGeometryType, VectorLayer};
//!
//! let mut registry = LayerRegistry::new();
//! let layer = Rc::new(
//!     VectorLayer::create_in_memory("scratch", &Crs::invalid(), OGRwkbGeometryType::wkbPoint)
//!         .unwrap(),
//! );
//! let id = registry.add(Rc::clone(&layer));
//! assert_eq!(registry.add(layer), id);
//! assert_eq!(registry.layers_by_name("scratch").len(), 1);
//! ```

use std::fmt;
use std::rc::Rc;

use crate::vector::VectorLayer;

/// Identifies a layer within one [`LayerRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct LayerRegistry {
    layers: Vec<(LayerId, Rc<VectorLayer>)>,
    next_id: u64,
}

impl LayerRegistry {
    pub fn new() -> LayerRegistry {
        LayerRegistry::default()
    }

    /// Register `layer` and return its id.
    ///
    /// Registering a layer that is already present returns the existing id.
    pub fn add(&mut self, layer: Rc<VectorLayer>) -> LayerId {
        if let Some(id) = self.id_of(&layer) {
            log::debug!("layer '{}' is already registered as {id}", layer.name());
            return id;
        }
        let id = LayerId(self.next_id);
        self.next_id += 1;
        log::info!("registered layer '{}' as {id}", layer.name());
        self.layers.push((id, layer));
        id
    }

    /// Unregister a layer, returning it if it was present.
    pub fn remove(&mut self, id: LayerId) -> Option<Rc<VectorLayer>> {
        let pos = self.layers.iter().position(|(lid, _)| *lid == id)?;
        let (_, layer) = self.layers.remove(pos);
        log::info!("removed layer '{}' ({id})", layer.name());
        Some(layer)
    }

    pub fn remove_all(&mut self) {
        log::info!("removing {} registered layers", self.layers.len());
        self.layers.clear();
    }

    pub fn get(&self, id: LayerId) -> Option<&Rc<VectorLayer>> {
        self.layers
            .iter()
            .find(|(lid, _)| *lid == id)
            .map(|(_, layer)| layer)
    }

    /// The id under which this very layer object is registered.
    pub fn id_of(&self, layer: &Rc<VectorLayer>) -> Option<LayerId> {
        self.layers
            .iter()
            .find(|(_, registered)| Rc::ptr_eq(registered, layer))
            .map(|(id, _)| *id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.get(id).is_some()
    }

    /// Every registered layer called `name`, in registration order.
    pub fn layers_by_name(&self, name: &str) -> Vec<Rc<VectorLayer>> {
        self.layers
            .iter()
            .filter(|(_, layer)| layer.name() == name)
            .map(|(_, layer)| Rc::clone(layer))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &Rc<VectorLayer>)> {
        self.layers.iter().map(|(id, layer)| (*id, layer))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial_ref::Crs;
    use crate::vector::OGRwkbGeometryType;

    fn scratch(name: &str) -> Rc<VectorLayer> {
        Rc::new(
            VectorLayer::create_in_memory(name, &Crs::invalid(), OGRwkbGeometryType::wkbPoint)
                .unwrap(),
        )
    }

    #[test]
    fn test_add_and_query() {
        let mut registry = LayerRegistry::new();
        assert!(registry.is_empty());

        let a = registry.add(scratch("a"));
        let b = registry.add(scratch("b"));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(a));
        assert_eq!(registry.get(b).unwrap().name(), "b");
        assert_eq!(registry.layers_by_name("a").len(), 1);
        assert!(registry.layers_by_name("c").is_empty());
    }

    #[test]
    fn test_same_layer_registers_once() {
        let mut registry = LayerRegistry::new();
        let layer = scratch("cities");
        let first = registry.add(Rc::clone(&layer));
        let second = registry.add(Rc::clone(&layer));
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.id_of(&layer), Some(first));
    }

    #[test]
    fn test_equal_names_are_distinct_layers() {
        let mut registry = LayerRegistry::new();
        registry.add(scratch("cities"));
        registry.add(scratch("cities"));
        assert_eq!(registry.layers_by_name("cities").len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut registry = LayerRegistry::new();
        let a = registry.add(scratch("a"));
        let b = registry.add(scratch("b"));

        let removed = registry.remove(a).unwrap();
        assert_eq!(removed.name(), "a");
        assert!(registry.remove(a).is_none());
        assert!(!registry.contains(a));

        // ids are never reused
        let c = registry.add(scratch("c"));
        assert_ne!(c, a);

        let ids: Vec<LayerId> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, [b, c]);

        registry.remove_all();
        assert!(registry.is_empty());
    }
}
