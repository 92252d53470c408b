//! # engine_component
//!
//! The ECS core of the engine: entities, the components attached to them, and
//! the systems interested in particular component combinations.
//!
//! This crate provides:
//!
//! - [`Entity`] and [`EntityAllocator`]: generational entity handles.
//! - [`Component`] and [`ComponentTypes`]: the component trait and the
//!   type → dense id table.
//! - [`Signature`]: the bitset used to match entities to systems.
//! - [`ComponentPool`]: dense per-type storage behind the [`Pool`] trait.
//! - [`System`] and [`SystemCore`]: required signature plus cached members.
//! - [`Registry`]: owns everything above and settles membership once per tick.
//!
//! ## Usage
//!
//! ```rust
//! use engine_component::{Component, Registry, System, SystemCore};
//!
//! struct Position(f32);
//! impl Component for Position {}
//!
//! struct Speed(f32);
//! impl Component for Speed {}
//!
//! struct Movement {
//!     core: SystemCore,
//! }
//!
//! impl System for Movement {
//!     fn core(&self) -> &SystemCore {
//!         &self.core
//!     }
//!     fn core_mut(&mut self) -> &mut SystemCore {
//!         &mut self.core
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! let mut core = SystemCore::new();
//! core.require_component::<Position>();
//! core.require_component::<Speed>();
//! registry.add_system(Movement { core })?;
//!
//! let e = registry.create_entity();
//! registry.add_component(e, Position(0.0))?;
//! registry.add_component(e, Speed(2.0))?;
//! registry.update();
//!
//! assert_eq!(registry.system_entities::<Movement>()?, vec![e]);
//! # Ok::<(), engine_component::EcsError>(())
//! ```

pub mod component;
pub mod entity;
pub mod error;
pub mod pool;
pub mod registry;
pub mod signature;
pub mod system;

pub use component::{Component, ComponentTypeId, ComponentTypes};
pub use entity::{Entity, EntityAllocator};
pub use error::{EcsError, Result};
pub use pool::{ComponentPool, DEFAULT_POOL_CAPACITY, Pool};
pub use registry::{Registry, UpdateStats};
pub use signature::{MAX_COMPONENTS, Signature};
pub use system::{AsAny, System, SystemCore};
