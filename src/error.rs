//! Recoverable errors.
//!
//! Precondition violations such as out-of-range indices are programming errors
//! and panic instead of returning an [`Error`].

use crate::entity::Index;

/// Errors returned by fallible operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The entity allocator cannot grow past its limit.
    #[error("cannot allocate {requested} entities: {len} of {limit} indices are in use")]
    Exhausted {
        /// The number of entities requested.
        requested: usize,
        /// The number of indices in use.
        len:       usize,
        /// The configured entity limit.
        limit:     usize,
    },
    /// No component manager is registered under the name.
    #[error("no component named {name:?} is registered")]
    UnknownComponent {
        /// The requested name.
        name: String,
    },
    /// A serialized archetype does not declare `transform.parent`.
    #[error("archetype {index} does not declare transform.parent")]
    MissingParent {
        /// The position of the archetype in its prefab.
        index: usize,
    },
    /// A parent index does not precede its child.
    #[error("archetype {index} has invalid parent {parent}")]
    InvalidParent {
        /// The position of the archetype in its prefab.
        index:  usize,
        /// The offending parent index.
        parent: i64,
    },
    /// A JSON value is of the wrong kind.
    #[error("expected a JSON {expected}")]
    Shape {
        /// The expected kind of value.
        expected: &'static str,
    },
    /// A component value cannot be converted from or to JSON.
    #[error("cannot convert component {name:?}: {source}")]
    Json {
        /// The component name.
        name:   &'static str,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Shorthand for results of this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns an error if a parent index does not refer to an earlier archetype.
pub(crate) fn check_parent(index: usize, parent: Option<Index>) -> Result<()> {
    match parent {
        Some(parent) if parent.usize() >= index => {
            Err(Error::InvalidParent { index, parent: i64::from(parent.get()) })
        }
        _ => Ok(()),
    }
}
