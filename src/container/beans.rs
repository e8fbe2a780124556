//! Typed access over type-erased bean values

use crate::error::Error;
use std::{
    any::{self, Any},
    collections::HashMap,
    fmt,
    sync::Arc,
};

/// A shared, type-erased bean instance
pub type BeanValue = Arc<
    dyn Any
    + Send
    + Sync
>;

/// A string-keyed map of type-erased values
///
/// Constructors receive two of these: the resolved dependencies, keyed by
/// the names declared on the definition, and the definition's static
/// parameters. The container also keeps its instance cache in one.
#[derive(Default, Clone)]
pub struct Beans {
    inner: HashMap<String, BeanValue>,
}

impl Beans {
    pub(crate) fn new() -> Self {
        Self { inner: HashMap::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { inner: HashMap::with_capacity(capacity) }
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: BeanValue) {
        self.inner.insert(name.into(), value);
    }

    pub(crate) fn get_raw(&self, name: &str) -> Option<&BeanValue> {
        self.inner.get(name)
    }

    /// Returns the value stored under `name`, downcast to `T`
    ///
    /// Fails with [`Error::NotFound`] when nothing is stored under `name`
    /// and with [`Error::TypeMismatch`] when the stored value is not a `T`.
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, Error> {
        let value = self.inner
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;
        downcast(value.clone(), name)
    }

    /// Returns an owned clone of the `T` stored under `name`
    pub fn get_cloned<T: Send + Sync + Clone + 'static>(&self, name: &str) -> Result<T, Error> {
        self.get::<T>(name).map(|value| value.as_ref().clone())
    }

    /// Whether a value is stored under `name`
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Number of stored values
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for Beans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Beans")?;
        f.debug_set().entries(self.inner.keys()).finish()
    }
}

/// The one sanctioned runtime type check: narrows a type-erased value
/// down to the concrete type the caller asked for
pub(crate) fn downcast<T: Send + Sync + 'static>(value: BeanValue, name: &str) -> Result<Arc<T>, Error> {
    value
        .downcast::<T>()
        .map_err(|_| Error::TypeMismatch {
            bean: name.to_owned(),
            type_name: any::type_name::<T>(),
        })
}
