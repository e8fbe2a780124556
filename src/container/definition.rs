//! Bean definitions and constructor plumbing

use super::beans::{BeanValue, Beans};
use crate::error::{BoxError, Error};
use std::{fmt, sync::Arc};

/// A type-erased constructor: receives the resolved dependencies and the
/// definition's static parameters
pub(crate) type Constructor = Arc<
    dyn Fn(&Beans, &Beans) -> Result<BeanValue, BoxError>
    + Send
    + Sync
>;

/// Describes how to build one named bean: the beans it depends on, its
/// static parameters and its constructor
///
/// # Example
/// ```
/// use armature::{BeanDef, Beans};
///
/// let def = BeanDef::new("greeter")
///     .depends_on(["repository"])
///     .param("greeting", "hello".to_string())
///     .constructor(|_deps: &Beans, params: &Beans| {
///         let greeting: String = params.get_cloned("greeting")?;
///         Ok(greeting)
///     });
///
/// assert_eq!(def.name(), "greeter");
/// ```
pub struct BeanDef {
    name: String,
    dependencies: Vec<String>,
    params: Beans,
    constructor: Option<Constructor>,
}

impl BeanDef {
    /// Starts a definition for the bean `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            params: Beans::new(),
            constructor: None,
        }
    }

    /// Declares the beans this bean depends on
    ///
    /// The order given here is the order they are resolved in.
    pub fn depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds a static parameter handed to the constructor as-is
    pub fn param<T: Send + Sync + 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        self.params.insert(name, Arc::new(value));
        self
    }

    /// Sets the constructor
    ///
    /// The closure receives the resolved dependencies and the static
    /// parameters; whatever `T` it returns is erased behind
    /// [`BeanValue`](super::BeanValue) and narrowed back on retrieval.
    pub fn constructor<T, F>(mut self, ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Beans, &Beans) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(move |deps: &Beans, params: &Beans| {
            ctor(deps, params).map(|bean| Arc::new(bean) as BeanValue)
        }));
        self
    }

    /// The bean's name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets an already-erased constructor; lets the container register
    /// pre-built values without double-wrapping them
    pub(crate) fn constructor_erased(mut self, ctor: Constructor) -> Self {
        self.constructor = Some(ctor);
        self
    }

    /// Validates the definition and splits it into its key and the stored
    /// entry form
    pub(crate) fn into_entry(self) -> Result<(String, BeanEntry), Error> {
        if self.name.is_empty() {
            return Err(Error::MissingName);
        }
        let Some(constructor) = self.constructor else {
            return Err(Error::MissingConstructor(self.name));
        };
        Ok((
            self.name,
            BeanEntry {
                dependencies: self.dependencies,
                params: self.params,
                constructor,
            },
        ))
    }
}

impl fmt::Debug for BeanDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDef")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("params", &self.params)
            .field("constructor", &self.constructor.as_ref().map(|_| ".."))
            .finish()
    }
}

/// A registered definition; the constructor is guaranteed present
pub(crate) struct BeanEntry {
    pub(crate) dependencies: Vec<String>,
    pub(crate) params: Beans,
    pub(crate) constructor: Constructor,
}

impl fmt::Debug for BeanEntry {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BeanEntry(..)")
    }
}
