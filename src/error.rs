//! Describes bean container errors

use std::{
    error::Error as StdError,
    fmt::{Display, Formatter},
};

/// An opaque error returned by a bean constructor
pub type BoxError = Box<
    dyn StdError
    + Send
    + Sync
>;

/// Errors surfaced by bean registration and resolution
#[derive(Debug)]
pub enum Error {
    /// A definition was registered with an empty name
    MissingName,
    /// A definition was registered without a constructor
    MissingConstructor(String),
    /// The name is already taken by an earlier registration
    DuplicateBean(String),
    /// No definition is registered under the requested name
    NotFound(String),
    /// The name was re-entered while its own construction was still in flight
    CircularDependency(String),
    /// The bean's own constructor returned an error
    BuildFailed {
        bean: String,
        source: BoxError,
    },
    /// The resolved instance is not of the requested type
    TypeMismatch {
        bean: String,
        type_name: &'static str,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingName => write!(f, "Container Error: bean name is required"),
            Error::MissingConstructor(name) => write!(f, "Container Error: constructor is required: {name}"),
            Error::DuplicateBean(name) => write!(f, "Container Error: bean already registered: {name}"),
            Error::NotFound(name) => write!(f, "Container Error: bean not found: {name}"),
            Error::CircularDependency(name) => write!(f, "Container Error: circular dependency: {name}"),
            Error::BuildFailed { bean, source } => write!(f, "Container Error: create {bean}: {source}"),
            Error::TypeMismatch { bean, type_name } => write!(f, "Container Error: type mismatch: {bean} is not {type_name}")
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::BuildFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
