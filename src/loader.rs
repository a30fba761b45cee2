//! Configuration loader with environment overrides.
//!
//! Loads a base TOML document into a record, then overrides individual fields
//! from environment variables. Environment variables take the form
//! `PREFIX_UPPERCASEFIELD` unless the field declares an explicit name.

use crate::codec::{parse_fragment, read_document};
use crate::env::{EnvSource, ProcessEnv};
use crate::error::{LoadError, LoadResult};
use crate::fragment::synthesize;
use crate::merge::Layered;
use crate::shape::{FieldDescriptor, TargetShape};
use std::io::Read;
use tracing::{debug, trace};

/// Applies a TOML document and environment overrides onto a record.
#[derive(Debug, Clone)]
pub struct ConfigMerger<E = ProcessEnv> {
    prefix: String,
    env: E,
}

impl ConfigMerger<ProcessEnv> {
    /// Create a merger reading the process environment.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            env: ProcessEnv,
        }
    }
}

impl<E: EnvSource> ConfigMerger<E> {
    /// Replace the environment source.
    pub fn with_env<F: EnvSource>(self, env: F) -> ConfigMerger<F> {
        ConfigMerger {
            prefix: self.prefix,
            env,
        }
    }

    /// Load `document` (if any) into `record`, then apply environment overrides.
    ///
    /// Fields are processed in declaration order and the first failing
    /// override stops processing; earlier overrides stay applied.
    pub fn load<T: Layered>(
        &self,
        record: &mut T,
        document: Option<&mut dyn Read>,
    ) -> LoadResult<()> {
        let shape = TargetShape::of::<T>();
        shape.validate()?;

        if let Some(reader) = document {
            let table = read_document(reader).map_err(LoadError::DocumentParse)?;
            debug!(keys = table.len(), "Decoding base configuration document");
            record.merge_table(table).map_err(LoadError::DocumentParse)?;
        }

        for field in shape.fields() {
            self.apply_override(record, field)?;
        }
        Ok(())
    }

    fn apply_override<T: Layered>(&self, record: &mut T, field: &FieldDescriptor) -> LoadResult<()> {
        let Some(key) = field.document_key() else {
            return Ok(());
        };
        let Some(var) = field.env_name(&self.prefix) else {
            trace!(field = field.name, "Environment lookup suppressed");
            return Ok(());
        };
        let raw = match self.env.lookup(&var) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(()),
        };

        debug!(env = %var, key, kind = %field.kind, "Applying environment override");

        if field.kind.is_list() {
            record.reset_field(field.name);
        }

        let fragment = synthesize(key, field.kind, &raw);
        parse_fragment(&fragment)
            .and_then(|table| record.merge_table(table))
            .map_err(|source| LoadError::EnvironmentParse { var, source })
    }
}

/// Load `document` into `record` and override fields from the process
/// environment using `env_prefix`.
///
/// # Example
/// ```
/// use envlayer::impl_layered;
///
/// #[derive(Debug, Default)]
/// struct Config {
///     port: u16,
///     name: String,
/// }
///
/// impl_layered!(Config { port, name });
///
/// let mut config = Config::default();
/// let mut doc: &[u8] = b"port = 8080\nname = \"svc\"\n";
/// envlayer::load(&mut config, Some(&mut doc), "ENVLAYER_DOCTEST").unwrap();
/// assert_eq!(config.port, 8080);
/// ```
pub fn load<T: Layered>(
    record: &mut T,
    document: Option<&mut dyn Read>,
    env_prefix: &str,
) -> LoadResult<()> {
    ConfigMerger::new(env_prefix).load(record, document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodecError, ErrorKind};
    use crate::impl_layered;
    use std::collections::HashMap;

    #[derive(Debug, Default, PartialEq)]
    struct Limits {
        max: u32,
        min: u32,
    }

    impl_layered!(Limits { max, min });

    #[derive(Debug, Default, PartialEq)]
    struct Settings {
        port: u16,
        ports: Vec<u16>,
        limits: Limits,
        windows: Vec<Limits>,
        name: String,
    }

    impl_layered!(Settings { port, ports, limits, windows, name });

    #[derive(Debug, Default, PartialEq)]
    struct Labelled {
        name: String,
        label: String,
    }

    impl_layered!(Labelled {
        name,
        label { doc: "NAME" },
    });

    #[derive(Debug, Default)]
    struct Clashing {
        a: bool,
        b: bool,
    }

    impl_layered!(Clashing {
        a { doc: "x" },
        b { doc: "x" },
    });

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn merger(pairs: &[(&str, &str)]) -> ConfigMerger<HashMap<String, String>> {
        ConfigMerger::new("T").with_env(env(pairs))
    }

    const DOC: &[u8] = b"port = 1\nports = [1, 2]\nname = \"base\"\n[limits]\nmax = 10\nmin = 1\n[[windows]]\nmax = 5\n";

    #[test]
    fn test_no_document_only_env() {
        let mut settings = Settings::default();
        merger(&[("T_PORT", "9")]).load(&mut settings, None).unwrap();
        assert_eq!(settings.port, 9);
        assert!(settings.ports.is_empty());
    }

    #[test]
    fn test_empty_value_treated_as_absent() {
        let mut settings = Settings::default();
        let mut doc = DOC;
        merger(&[("T_NAME", ""), ("T_PORTS", "")])
            .load(&mut settings, Some(&mut doc))
            .unwrap();
        assert_eq!(settings.name, "base");
        assert_eq!(settings.ports, vec![1, 2]);
    }

    #[test]
    fn test_nested_record_merges_keys() {
        let mut settings = Settings::default();
        let mut doc = DOC;
        merger(&[("T_LIMITS", "max = 20")])
            .load(&mut settings, Some(&mut doc))
            .unwrap();
        assert_eq!(settings.limits, Limits { max: 20, min: 1 });
    }

    #[test]
    fn test_invalid_target_before_io() {
        struct FailingReader;
        impl Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                panic!("reader must not be touched");
            }
        }

        let mut clashing = Clashing::default();
        let mut reader = FailingReader;
        let err = merger(&[])
            .load(&mut clashing, Some(&mut reader))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTarget);
        assert!(!clashing.a && !clashing.b);
    }

    #[test]
    fn test_document_error() {
        let mut settings = Settings::default();
        let mut doc: &[u8] = b"port = \"not a number\"\n";
        let err = merger(&[]).load(&mut settings, Some(&mut doc)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DocumentParseError);
        match err {
            LoadError::DocumentParse(CodecError::Value { path, .. }) => assert_eq!(path, "port"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_env_error_stops_processing() {
        let mut settings = Settings::default();
        let mut doc = DOC;
        let err = merger(&[("T_PORT", "2"), ("T_PORTS", "[oops"), ("T_NAME", "late")])
            .load(&mut settings, Some(&mut doc))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EnvironmentParseError);
        assert_eq!(err.env_var(), Some("T_PORTS"));
        // Earlier override stays, failing list stays reset, later field untouched.
        assert_eq!(settings.port, 2);
        assert!(settings.ports.is_empty());
        assert_eq!(settings.name, "base");
    }

    #[test]
    fn test_record_list_replaced() {
        let mut settings = Settings::default();
        let mut doc = DOC;
        merger(&[("T_WINDOWS", "max = 1\n\nmin = 2")])
            .load(&mut settings, Some(&mut doc))
            .unwrap();
        assert_eq!(
            settings.windows,
            vec![Limits { max: 1, min: 0 }, Limits { max: 0, min: 2 }]
        );
    }

    #[test]
    fn test_override_lands_on_own_field_when_keys_differ_by_case() {
        let mut labelled = Labelled::default();
        let mut doc: &[u8] = b"name = \"a\"\n";
        merger(&[("T_LABEL", "y")])
            .load(&mut labelled, Some(&mut doc))
            .unwrap();
        assert_eq!(
            labelled,
            Labelled {
                name: "a".to_string(),
                label: "y".to_string(),
            }
        );
    }
}
