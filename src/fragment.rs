//! Override fragments synthesized from raw environment values.
//!
//! An environment value is not parsed directly. It is embedded into a small
//! TOML fragment shaped by the field's kind and decoded like any document:
//!
//! | kind            | raw value               | fragment                        |
//! |-----------------|-------------------------|---------------------------------|
//! | table           | `b = false\ni = 4`      | `[key]` header, value as body   |
//! | array of tables | bodies split on `\n\n`  | one `[[key]]` block per body    |
//! | array           | `[3,4,5]`               | `key = [3,4,5]`                 |
//! | string          | `DEF` or `"DEF"`        | `key = "DEF"`                   |
//! | anything else   | `true`, `3`, `2.5`      | `key = <raw>`                   |

use crate::shape::FieldKind;

/// Separator between array-of-tables elements in an environment value.
pub const RECORD_SEPARATOR: &str = "\n\n";

/// Build the fragment that assigns `raw` to `key`.
pub fn synthesize(key: &str, kind: FieldKind, raw: &str) -> String {
    let key = fragment_key(key);
    match kind {
        FieldKind::Record => format!("[{}]\n{}\n", key, raw),
        FieldKind::RecordList => raw
            .split(RECORD_SEPARATOR)
            .map(|body| format!("[[{}]]\n{}\n", key, body))
            .collect(),
        FieldKind::Text => {
            // Only the first and last characters are inspected.
            if !raw.starts_with('"') && !raw.ends_with('"') {
                format!("{} = \"{}\"\n", key, raw)
            } else {
                format!("{} = {}\n", key, raw)
            }
        }
        FieldKind::List
        | FieldKind::Bool
        | FieldKind::Integer
        | FieldKind::Float
        | FieldKind::Datetime => format!("{} = {}\n", key, raw),
    }
}

/// Bare keys are emitted as-is; anything else is quoted so the fragment names
/// exactly one key.
fn fragment_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_string()
    } else {
        toml::Value::String(key.to_string()).to_string()
    }
}
