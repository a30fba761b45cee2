//! Decoding TOML values onto already-populated records.
//!
//! Mirrors a deep merge where the incoming document is the overlay:
//! - Tables are merged key by key: only keys present in the overlay change
//! - Arrays, strings, numbers, booleans and datetimes are replaced entirely
//! - Keys that match no field are ignored
//!
//! Record types opt in through [`Layered`], usually generated by
//! [`impl_layered!`](crate::impl_layered).

use crate::error::CodecError;
use crate::shape::{FieldDescriptor, FieldKind};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use toml::{Table, Value};

/// A value a TOML document can be decoded onto in place.
pub trait MergeValue {
    /// Declared kind, used to pick the override fragment shape.
    const KIND: FieldKind;

    /// Decode `value` onto `self`.
    fn merge_value(&mut self, value: Value) -> Result<(), CodecError>;
}

/// A record whose fields are described statically and decoded in place.
pub trait Layered {
    /// Field descriptors in declaration order.
    fn fields() -> Vec<FieldDescriptor>;

    /// Decode a table onto the record, touching only the fields it names.
    fn merge_table(&mut self, table: Table) -> Result<(), CodecError>;

    /// Reset the named field to its empty value. Returns false for unknown names.
    fn reset_field(&mut self, name: &str) -> bool;
}

/// Kind of the field a projection points at.
///
/// Lets [`impl_layered!`](crate::impl_layered) infer kinds without naming field types.
pub fn field_kind<R, F: MergeValue>(_project: fn(&R) -> &F) -> FieldKind {
    F::KIND
}

/// Route the entries of `table` to `fields`, returning one slot per field in
/// declaration order.
///
/// Every field claims its exact key first. Only keys left unclaimed are then
/// matched ASCII case-insensitively, so a field never takes another field's
/// exact key. Suppressed fields and unmatched keys get nothing.
pub fn claim_keys(
    fields: &[FieldDescriptor],
    mut table: Table,
) -> Vec<Option<(&'static str, Value)>> {
    let mut claimed: Vec<Option<(&'static str, Value)>> = fields
        .iter()
        .map(|field| {
            let key = field.document_key()?;
            table.remove(key).map(|value| (key, value))
        })
        .collect();

    for (field, slot) in fields.iter().zip(claimed.iter_mut()) {
        if slot.is_some() {
            continue;
        }
        let Some(key) = field.document_key() else {
            continue;
        };
        if let Some(found) = table.keys().find(|k| k.eq_ignore_ascii_case(key)).cloned() {
            *slot = table.remove(&found).map(|value| (key, value));
        }
    }
    claimed
}

fn deserialize_scalar<T: DeserializeOwned>(target: &mut T, value: Value) -> Result<(), CodecError> {
    *target = value
        .try_into()
        .map_err(|e: toml::de::Error| CodecError::value(e.message().trim().to_string()))?;
    Ok(())
}

macro_rules! impl_scalar {
    ($kind:ident => $($ty:ty),+) => {
        $(
            impl MergeValue for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn merge_value(&mut self, value: Value) -> Result<(), CodecError> {
                    deserialize_scalar(self, value)
                }
            }
        )+
    };
}

impl_scalar!(Bool => bool);
impl_scalar!(Integer => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_scalar!(Float => f32, f64);
impl_scalar!(Text => String, PathBuf);
impl_scalar!(Datetime => toml::value::Datetime);

impl<T: MergeValue + Default> MergeValue for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn merge_value(&mut self, value: Value) -> Result<(), CodecError> {
        self.get_or_insert_with(T::default).merge_value(value)
    }
}

impl<T: MergeValue + Default> MergeValue for Vec<T> {
    const KIND: FieldKind = match T::KIND {
        FieldKind::Record => FieldKind::RecordList,
        _ => FieldKind::List,
    };

    fn merge_value(&mut self, value: Value) -> Result<(), CodecError> {
        let Value::Array(items) = value else {
            return Err(CodecError::mismatch("array", &value));
        };
        let mut decoded = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let mut element = T::default();
            element
                .merge_value(item)
                .map_err(|e| e.at_index(index))?;
            decoded.push(element);
        }
        *self = decoded;
        Ok(())
    }
}

/// Implement [`Layered`] and [`MergeValue`] for a struct.
///
/// Fields are listed in declaration order. Each may carry `doc` and `env`
/// annotations using the tag convention of [`Annotation::from_tag`](crate::Annotation::from_tag):
///
/// ```
/// use envlayer::impl_layered;
///
/// #[derive(Debug, Default)]
/// struct Server {
///     host: String,
///     port: u16,
///     token: String,
/// }
///
/// impl_layered!(Server {
///     host,
///     port { env: "PORT" },
///     token { doc: "auth-token", env: "-" },
/// });
/// ```
///
/// Every listed field type must implement [`MergeValue`] and `Default`.
#[macro_export]
macro_rules! impl_layered {
    (@descriptor $field:ident $( { $( $key:ident : $val:literal ),* $(,)? } )?) => {
        $crate::FieldDescriptor::new(
            stringify!($field),
            $crate::merge::field_kind(|record: &Self| &record.$field),
        )
        $( $( .$key($val) )* )?
    };

    ($ty:ty { $( $field:ident $( { $( $key:ident : $val:literal ),* $(,)? } )? ),* $(,)? }) => {
        impl $crate::Layered for $ty {
            fn fields() -> ::std::vec::Vec<$crate::FieldDescriptor> {
                ::std::vec![
                    $( $crate::impl_layered!(@descriptor $field $( { $( $key : $val ),* } )?) ),*
                ]
            }

            #[allow(unused_mut, unused_variables)]
            fn merge_table(
                &mut self,
                table: $crate::toml::Table,
            ) -> ::std::result::Result<(), $crate::CodecError> {
                let fields = <Self as $crate::Layered>::fields();
                let mut claimed = $crate::merge::claim_keys(&fields, table).into_iter();
                $(
                    if let ::std::option::Option::Some((key, value)) = claimed.next().flatten() {
                        $crate::MergeValue::merge_value(&mut self.$field, value)
                            .map_err(|e| e.at(key))?;
                    }
                )*
                ::std::result::Result::Ok(())
            }

            fn reset_field(&mut self, name: &str) -> bool {
                match name {
                    $( stringify!($field) => {
                        self.$field = ::std::default::Default::default();
                        true
                    } )*
                    _ => false,
                }
            }
        }

        impl $crate::MergeValue for $ty {
            const KIND: $crate::FieldKind = $crate::FieldKind::Record;

            fn merge_value(
                &mut self,
                value: $crate::toml::Value,
            ) -> ::std::result::Result<(), $crate::CodecError> {
                match value {
                    $crate::toml::Value::Table(table) => {
                        <Self as $crate::Layered>::merge_table(self, table)
                    }
                    other => ::std::result::Result::Err($crate::CodecError::mismatch("table", &other)),
                }
            }
        }
    };
}
