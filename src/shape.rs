//! Static field metadata for layered configuration records.
//!
//! Every record type describes its fields once, in declaration order, through
//! [`crate::Layered::fields`]. Each [`FieldDescriptor`] carries the field's value
//! kind and two independent annotations: one controlling the document key, one
//! controlling the environment variable name.

use crate::error::LoadError;
use crate::merge::Layered;
use std::collections::HashSet;

/// Override annotation for a document key or environment variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Annotation {
    /// Derive the name from the field identity.
    #[default]
    Default,
    /// Use this exact name.
    Explicit(&'static str),
    /// Never resolve this source for the field.
    Suppressed,
}

impl Annotation {
    /// Parse a tag string: `""` is default, `"-"` is suppressed, anything else is explicit.
    pub const fn from_tag(tag: &'static str) -> Self {
        match tag.as_bytes() {
            [] => Self::Default,
            [b'-'] => Self::Suppressed,
            _ => Self::Explicit(tag),
        }
    }
}

/// Declared value kind of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Integer,
    Float,
    Text,
    Datetime,
    /// Array of scalar values.
    List,
    /// Array of nested records (array of tables).
    RecordList,
    /// Nested record (table).
    Record,
}

impl FieldKind {
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List | Self::RecordList)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Bool => write!(f, "boolean"),
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Float => write!(f, "float"),
            FieldKind::Text => write!(f, "string"),
            FieldKind::Datetime => write!(f, "datetime"),
            FieldKind::List => write!(f, "array"),
            FieldKind::RecordList => write!(f, "array of tables"),
            FieldKind::Record => write!(f, "table"),
        }
    }
}

/// Metadata for one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    pub doc: Annotation,
    pub env: Annotation,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            doc: Annotation::Default,
            env: Annotation::Default,
        }
    }

    /// Set the document key annotation from a tag string.
    pub const fn doc(mut self, tag: &'static str) -> Self {
        self.doc = Annotation::from_tag(tag);
        self
    }

    /// Set the environment name annotation from a tag string.
    pub const fn env(mut self, tag: &'static str) -> Self {
        self.env = Annotation::from_tag(tag);
        self
    }

    /// Key used in the document, or `None` if the field is never decoded.
    pub fn document_key(&self) -> Option<&'static str> {
        match self.doc {
            Annotation::Default => Some(self.name),
            Annotation::Explicit(key) => Some(key),
            Annotation::Suppressed => None,
        }
    }

    /// Environment variable consulted for this field, or `None` if suppressed.
    ///
    /// Explicit names are used verbatim, without the prefix.
    pub fn env_name(&self, prefix: &str) -> Option<String> {
        match self.env {
            Annotation::Default => Some(format!("{}_{}", prefix, self.name.to_uppercase())),
            Annotation::Explicit(name) => Some(name.to_string()),
            Annotation::Suppressed => None,
        }
    }
}

/// Ordered field table of a record type.
#[derive(Debug, Clone)]
pub struct TargetShape {
    fields: Vec<FieldDescriptor>,
}

impl TargetShape {
    /// Derive the shape of `T`.
    pub fn of<T: Layered>() -> Self {
        Self {
            fields: T::fields(),
        }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn find(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Reject shapes that cannot act as a struct-shaped target.
    pub fn validate(&self) -> Result<(), LoadError> {
        let mut keys = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(LoadError::InvalidTarget(
                    "field with an empty name".to_string(),
                ));
            }
            if let Some(key) = field.document_key() {
                if !keys.insert(key) {
                    return Err(LoadError::InvalidTarget(format!(
                        "document key `{}` is used by more than one field",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
