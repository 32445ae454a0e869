use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

/// Variables consulted by the generator and the data processing pass.
const TRACKED_VARIABLES: [&str; 5] = [
    "PATH",
    "PATHEXT",
    "VULKAN_SDK",
    "ANDROID_HOME",
    "ANDROID_NDK_HOME",
];

/// Snapshot of the process environment.
///
/// The library never reads environment variables directly: everything goes through this struct so
/// that the lookups can be redirected in tests.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, OsString>,
}

impl Environment {
    /// Creates an empty environment, where every lookup fails.
    pub fn new() -> Environment {
        Environment {
            vars: HashMap::new(),
        }
    }

    /// Captures the variables used by this crate from the current process.
    pub fn capture() -> Environment {
        let vars = TRACKED_VARIABLES
            .iter()
            .filter_map(|name| std::env::var_os(name).map(|value| (name.to_string(), value)))
            .collect();
        Environment { vars }
    }

    /// Sets a variable, replacing any previous value.
    pub fn with<K: Into<String>, V: Into<OsString>>(mut self, key: K, value: V) -> Environment {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&OsString> {
        self.vars.get(key).filter(|value| !value.is_empty())
    }

    pub fn path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    /// Splits the `PATH` variable in its entries.
    pub fn search_path(&self) -> Vec<PathBuf> {
        self.get("PATH")
            .map(|path| std::env::split_paths(path).collect())
            .unwrap_or_default()
    }

    /// Executable extensions to try on Windows, lowercase and with the leading dot.
    pub fn executable_extensions(&self) -> Vec<String> {
        match self.get("PATHEXT") {
            Some(exts) => exts
                .to_string_lossy()
                .split(';')
                .filter(|ext| !ext.is_empty())
                .map(str::to_lowercase)
                .collect(),
            None => vec![".exe".to_string(), ".bat".to_string(), ".cmd".to_string()],
        }
    }

    pub fn vulkan_sdk(&self) -> Option<PathBuf> {
        self.path("VULKAN_SDK")
    }

    pub fn android_sdk_home(&self) -> Option<PathBuf> {
        self.path("ANDROID_HOME")
    }

    pub fn android_ndk_home(&self) -> Option<PathBuf> {
        self.path("ANDROID_NDK_HOME")
    }
}

#[cfg(test)]
mod tests {
    use super::Environment;
    use std::path::PathBuf;

    #[test]
    fn empty_values_are_unset() {
        let env = Environment::new().with("VULKAN_SDK", "");
        assert!(env.vulkan_sdk().is_none());
    }

    #[test]
    fn search_path_split() {
        let joined = std::env::join_paths(["/usr/bin", "/opt/tools/bin"]).unwrap();
        let env = Environment::new().with("PATH", joined);
        assert_eq!(
            env.search_path(),
            vec![PathBuf::from("/usr/bin"), PathBuf::from("/opt/tools/bin")]
        );
    }

    #[test]
    fn pathext_defaults_and_parsing() {
        let env = Environment::new();
        assert!(env.executable_extensions().contains(&".exe".to_string()));
        let env = env.with("PATHEXT", ".COM;.EXE;");
        assert_eq!(env.executable_extensions(), vec![".com", ".exe"]);
    }
}
