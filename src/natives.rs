//! Native predicates: the registry and the built-in catalog

pub mod builtin;
pub mod registry;

pub use registry::{NativePredicate, NativeRegistry};
