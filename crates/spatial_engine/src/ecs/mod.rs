//! Entities and the registry the spatial partition reads them through.

pub mod entity;
pub mod entity_manager;
pub mod registry;

pub use entity::Entity;
pub use entity_manager::EntityManager;
pub use registry::EntityRegistry;
