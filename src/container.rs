//! Bean container: registration, resolution and typed retrieval

use crate::error::Error;
use indexmap::IndexMap;
use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
};

pub use self::{
    beans::{BeanValue, Beans},
    definition::BeanDef,
};

use self::definition::BeanEntry;

pub mod beans;
pub mod definition;

/// Inner map of registered definitions, in registration order
type DefMap = IndexMap<String, BeanEntry>;

/// Collects bean definitions before any resolution begins
///
/// Registration and resolution are split the same way the container is
/// used: all definitions go in first, then [`build`](Self::build) freezes
/// them into a read-only [`Container`].
#[derive(Debug)]
pub struct ContainerBuilder {
    defs: DefMap,
}

impl Default for ContainerBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    /// Creates a new, empty builder
    #[inline]
    pub fn new() -> Self {
        Self { defs: DefMap::new() }
    }

    /// Registers a bean definition
    ///
    /// Fails with [`Error::DuplicateBean`] when the name is already taken
    /// and with [`Error::MissingConstructor`] when the definition carries
    /// no constructor; the store is left untouched in both cases.
    pub fn register(&mut self, def: BeanDef) -> Result<(), Error> {
        if self.defs.contains_key(def.name()) {
            return Err(Error::DuplicateBean(def.name().to_owned()));
        }
        let (name, entry) = def.into_entry()?;
        #[cfg(feature = "tracing")]
        tracing::debug!("bean registered: {name}");
        self.defs.insert(name, entry);
        Ok(())
    }

    /// Registers an already-constructed value as a dependency-free bean
    pub fn register_value<T: Send + Sync + 'static>(
        &mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<(), Error> {
        let value: BeanValue = Arc::new(value);
        let def = BeanDef::new(name)
            .constructor_erased(Arc::new(move |_: &Beans, _: &Beans| Ok(value.clone())));
        self.register(def)
    }

    /// Number of registered definitions
    #[inline]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Freezes the definitions and returns a resolvable container
    pub fn build(self) -> Container {
        Container {
            defs: Arc::new(self.defs),
            state: Arc::new(Mutex::new(ResolveState::default())),
        }
    }
}

/// Constructed instances plus the names whose construction is in flight
#[derive(Debug, Default)]
struct ResolveState {
    instances: Beans,
    in_progress: HashSet<String>,
}

/// Resolves named beans into a lazily constructed singleton graph
///
/// Each bean is constructed at most once, on first request; every later
/// request returns the same shared instance. Dependencies are resolved
/// depth-first in the order declared on the definition, and a name
/// re-entered while its own construction is still in flight is reported
/// as [`Error::CircularDependency`].
#[derive(Clone, Debug)]
pub struct Container {
    /// Read-only map of definitions
    defs: Arc<DefMap>,
    /// Cache and cycle markers, behind one lock for the whole resolution
    state: Arc<Mutex<ResolveState>>,
}

impl Container {
    /// Resolves the bean `name`, constructing it and any not-yet-cached
    /// dependencies
    ///
    /// Failures are not cached, so a bean whose construction failed can be
    /// requested again. Constructors receive their dependencies as
    /// arguments and must not resolve from the container they are being
    /// built by.
    pub fn get(&self, name: &str) -> Result<BeanValue, Error> {
        let mut state = self.lock_state();
        self.resolve_bean(&mut state, name)
    }

    /// Resolves the bean `name` and downcasts it to `T`
    ///
    /// The error of the underlying [`get`](Self::get) passes through
    /// unchanged; a failed downcast is [`Error::TypeMismatch`].
    pub fn resolve<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, Error> {
        self.get(name).and_then(|bean| beans::downcast(bean, name))
    }

    /// Resolves the bean `name` and returns an owned clone of the `T`
    /// behind it; use [`resolve`](Self::resolve) to share the instance
    /// without cloning
    pub fn resolve_cloned<T: Send + Sync + Clone + 'static>(&self, name: &str) -> Result<T, Error> {
        self.resolve::<T>(name).map(|bean| bean.as_ref().clone())
    }

    /// Whether a definition is registered under `name`
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Whether the bean `name` has already been constructed
    pub fn is_cached(&self, name: &str) -> bool {
        self.lock_state().instances.contains(name)
    }

    /// Registered bean names, in registration order
    pub fn bean_names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    fn lock_state(&self) -> MutexGuard<'_, ResolveState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => {
                // a constructor panicked mid-resolution; the markers it left
                // behind would read as false cycles
                let mut state = poisoned.into_inner();
                state.in_progress.clear();
                state
            }
        }
    }

    fn resolve_bean(&self, state: &mut ResolveState, name: &str) -> Result<BeanValue, Error> {
        if let Some(bean) = state.instances.get_raw(name) {
            #[cfg(feature = "tracing")]
            tracing::debug!("bean cache hit: {name}");
            return Ok(bean.clone());
        }
        let Some(entry) = self.defs.get(name) else {
            return Err(Error::NotFound(name.to_owned()));
        };
        if !state.in_progress.insert(name.to_owned()) {
            return Err(Error::CircularDependency(name.to_owned()));
        }

        // the marker comes off on every exit path before the result leaves
        // this frame, so `in_progress` is empty between top-level calls
        let built = self.construct(state, name, entry);
        state.in_progress.remove(name);

        let bean = built?;
        state.instances.insert(name, bean.clone());
        #[cfg(feature = "tracing")]
        tracing::debug!("bean constructed: {name}");
        Ok(bean)
    }

    fn construct(
        &self,
        state: &mut ResolveState,
        name: &str,
        entry: &BeanEntry,
    ) -> Result<BeanValue, Error> {
        let mut deps = Beans::with_capacity(entry.dependencies.len());
        for dep in &entry.dependencies {
            // dependency failures propagate as-is; only this bean's own
            // constructor error gets wrapped with its name below
            let bean = self.resolve_bean(state, dep)?;
            deps.insert(dep.clone(), bean);
        }
        (entry.constructor)(&deps, &entry.params).map_err(|err| {
            #[cfg(feature = "tracing")]
            tracing::warn!("bean construction failed: {name}: {err}");
            Error::BuildFailed {
                bean: name.to_owned(),
                source: err,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Db {
        conn_str: String,
    }

    #[derive(Debug)]
    struct Service {
        db: Arc<Db>,
    }

    fn builder_with_db() -> ContainerBuilder {
        let mut builder = ContainerBuilder::new();
        builder
            .register(
                BeanDef::new("db")
                    .param("conn_str", "sqlite::memory:".to_string())
                    .constructor(|_: &Beans, params: &Beans| {
                        Ok(Db { conn_str: params.get_cloned("conn_str")? })
                    }),
            )
            .unwrap();
        builder
    }

    #[test]
    fn it_registers_and_resolves() {
        let container = builder_with_db().build();

        let db = container.resolve::<Db>("db").unwrap();

        assert_eq!(db.conn_str, "sqlite::memory:");
    }

    #[test]
    fn it_rejects_duplicate_bean() {
        let mut builder = builder_with_db();

        let err = builder
            .register(BeanDef::new("db").constructor(|_: &Beans, _: &Beans| Ok(())))
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateBean(name) if name == "db"));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn it_rejects_missing_constructor() {
        let mut builder = ContainerBuilder::new();

        let err = builder.register(BeanDef::new("db")).unwrap_err();

        assert!(matches!(err, Error::MissingConstructor(name) if name == "db"));
        assert!(builder.is_empty());
    }

    #[test]
    fn it_rejects_empty_name() {
        let mut builder = ContainerBuilder::new();

        let err = builder
            .register(BeanDef::new("").constructor(|_: &Beans, _: &Beans| Ok(())))
            .unwrap_err();

        assert!(matches!(err, Error::MissingName));
    }

    #[test]
    fn it_returns_not_found() {
        let container = ContainerBuilder::new().build();

        let err = container.get("db").unwrap_err();

        assert!(matches!(err, Error::NotFound(name) if name == "db"));
    }

    #[test]
    fn it_caches_the_first_instance() {
        let container = builder_with_db().build();

        let first = container.resolve::<Db>("db").unwrap();
        let second = container.resolve::<Db>("db").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(container.is_cached("db"));
    }

    #[test]
    fn it_constructs_at_most_once() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let mut builder = ContainerBuilder::new();
        builder
            .register(BeanDef::new("counted").constructor(|_: &Beans, _: &Beans| {
                CALLS.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();
        let container = builder.build();

        container.get("counted").unwrap();
        container.get("counted").unwrap();

        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn it_resolves_declared_dependencies() {
        let mut builder = builder_with_db();
        builder
            .register(
                BeanDef::new("service")
                    .depends_on(["db"])
                    .constructor(|deps: &Beans, _: &Beans| {
                        Ok(Service { db: deps.get("db")? })
                    }),
            )
            .unwrap();
        let container = builder.build();

        let service = container.resolve::<Service>("service").unwrap();
        let db = container.resolve::<Db>("db").unwrap();

        assert!(Arc::ptr_eq(&service.db, &db));
    }

    #[test]
    fn it_detects_self_cycle() {
        let mut builder = ContainerBuilder::new();
        builder
            .register(
                BeanDef::new("narcissus")
                    .depends_on(["narcissus"])
                    .constructor(|_: &Beans, _: &Beans| Ok(())),
            )
            .unwrap();
        let container = builder.build();

        let err = container.get("narcissus").unwrap_err();

        assert!(matches!(err, Error::CircularDependency(name) if name == "narcissus"));
    }

    #[test]
    fn it_rejects_type_mismatch() {
        let container = builder_with_db().build();

        let err = container.resolve::<Service>("db").unwrap_err();

        assert!(matches!(err, Error::TypeMismatch { bean, .. } if bean == "db"));
    }

    #[test]
    fn it_registers_values() {
        let mut builder = ContainerBuilder::new();
        builder.register_value("answer", 42u32).unwrap();
        let container = builder.build();

        let first = container.resolve::<u32>("answer").unwrap();
        let second = container.resolve::<u32>("answer").unwrap();

        assert_eq!(*first, 42);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn it_lists_bean_names_in_registration_order() {
        let mut builder = ContainerBuilder::new();
        for name in ["zeta", "alpha", "mid"] {
            builder.register_value(name, ()).unwrap();
        }
        let container = builder.build();

        let names: Vec<&str> = container.bean_names().collect();

        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert!(container.contains("alpha"));
        assert!(!container.contains("omega"));
    }

    fn failing_ctor(_: &Beans, _: &Beans) -> Result<(), BoxError> {
        Err("disk on fire".into())
    }

    #[test]
    fn it_wraps_constructor_errors() {
        let mut builder = ContainerBuilder::new();
        builder
            .register(BeanDef::new("flaky").constructor(failing_ctor))
            .unwrap();
        let container = builder.build();

        let err = container.get("flaky").unwrap_err();

        assert!(matches!(&err, Error::BuildFailed { bean, .. } if bean == "flaky"));
        assert_eq!(err.to_string(), "Container Error: create flaky: disk on fire");
        assert!(!container.is_cached("flaky"));
    }

    #[test]
    fn it_keeps_resolving_after_errors() {
        let mut builder = builder_with_db();
        builder
            .register(
                BeanDef::new("loop")
                    .depends_on(["loop"])
                    .constructor(|_: &Beans, _: &Beans| Ok(())),
            )
            .unwrap();
        let container = builder.build();

        assert!(container.get("missing").is_err());
        assert!(container.get("loop").is_err());

        let db = container.resolve::<Db>("db").unwrap();
        assert_eq!(db.conn_str, "sqlite::memory:");
    }
}
