//! Environment variable sources.

use std::collections::{BTreeMap, HashMap};

/// Read-only lookup of environment variables.
pub trait EnvSource {
    /// Value of `name`, or `None` if unset.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        // Non-unicode values are treated as unset.
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_sources() {
        let mut map = HashMap::new();
        map.insert("APP_PORT".to_string(), "80".to_string());
        assert_eq!(map.lookup("APP_PORT").as_deref(), Some("80"));
        assert_eq!(map.lookup("APP_HOST"), None);

        let tree: BTreeMap<String, String> = map.into_iter().collect();
        assert_eq!((&tree).lookup("APP_PORT").as_deref(), Some("80"));
    }

    #[test]
    fn test_process_env() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("ENVLAYER_ENV_RS_PROBE", "1") };
        assert_eq!(ProcessEnv.lookup("ENVLAYER_ENV_RS_PROBE").as_deref(), Some("1"));
        assert_eq!(ProcessEnv.lookup("ENVLAYER_ENV_RS_UNSET"), None);
    }
}
