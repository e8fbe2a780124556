//! Lazy dependency-injection container with named beans
//!
//! Definitions are collected on a [`ContainerBuilder`] before any
//! resolution begins; [`ContainerBuilder::build`] freezes them into a
//! [`Container`] that resolves each bean at most once and shares the
//! constructed instance with every consumer. Dependencies are declared
//! explicitly by name and resolved depth-first, with dependency cycles
//! reported instead of looping.
//!
//! # Example
//! ```
//! use armature::{BeanDef, Beans, ContainerBuilder};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), armature::error::Error> {
//! #[derive(Debug)]
//! struct Db { conn_str: String }
//!
//! let mut builder = ContainerBuilder::new();
//! builder.register_value("conn_str", "sqlite::memory:".to_string())?;
//! builder.register(
//!     BeanDef::new("db")
//!         .depends_on(["conn_str"])
//!         .constructor(|deps: &Beans, _: &Beans| {
//!             Ok(Db { conn_str: deps.get_cloned("conn_str")? })
//!         }),
//! )?;
//!
//! let container = builder.build();
//! let db: Arc<Db> = container.resolve("db")?;
//!
//! assert_eq!(db.conn_str, "sqlite::memory:");
//! # Ok(())
//! # }
//! ```

pub use crate::container::{
    BeanDef,
    BeanValue,
    Beans,
    Container,
    ContainerBuilder,
};

pub mod error;
pub mod container;
