//! Layered configuration loading.
//!
//! Loads a TOML document into a typed record, then overrides fields one by one
//! from environment variables:
//! 1. **Document** - decoded first, onto whatever the record already holds
//! 2. **Environment** - `PREFIX_UPPERCASEFIELD`, or an explicit per-field name
//!
//! Environment values are fed through the TOML decoder as well. Strings are
//! quoted automatically, arrays use TOML array syntax, tables use TOML body
//! syntax, and arrays of tables separate elements with a blank line.

pub mod codec;
pub mod env;
pub mod error;
pub mod fragment;
pub mod loader;
pub mod merge;
pub mod shape;

pub use env::{EnvSource, ProcessEnv};
pub use error::{CodecError, ErrorKind, LoadError, LoadResult};
pub use loader::{ConfigMerger, load};
pub use merge::{Layered, MergeValue};
pub use shape::{Annotation, FieldDescriptor, FieldKind, TargetShape};

pub use toml;
