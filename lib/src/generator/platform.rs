use super::GeneratorError;
use std::fmt::Display;
use std::str::FromStr;

/// The platforms a project can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOsx,
    Ios,
    Android,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Windows,
        Platform::Linux,
        Platform::MacOsx,
        Platform::Ios,
        Platform::Android,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOsx => "macosx",
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }

    /// True for the platforms built directly with CMake on the host.
    pub fn is_desktop(&self) -> bool {
        matches!(self, Platform::Windows | Platform::Linux | Platform::MacOsx)
    }
}

impl FromStr for Platform {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .iter()
            .find(|p| p.to_str() == s)
            .copied()
            .ok_or_else(|| GeneratorError::UnknownPlatform(s.to_string()))
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Returns the platforms that can be generated from the current host.
///
/// Android can be targeted from every host, iOS only from macOS.
pub fn host_platforms() -> Vec<Platform> {
    if cfg!(target_os = "windows") {
        vec![Platform::Windows, Platform::Android]
    } else if cfg!(target_os = "macos") {
        vec![Platform::MacOsx, Platform::Ios, Platform::Android]
    } else if cfg!(target_os = "linux") {
        vec![Platform::Linux, Platform::Android]
    } else {
        vec![Platform::Android]
    }
}

/// Kind of build, forwarded to CMake as `CMAKE_BUILD_TYPE`-like value and to Gradle as task suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildType {
    Release,
    #[default]
    Debug,
}

impl BuildType {
    pub fn to_str(&self) -> &'static str {
        match self {
            BuildType::Release => "Release",
            BuildType::Debug => "Debug",
        }
    }
}

impl FromStr for BuildType {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Release" => Ok(BuildType::Release),
            "Debug" => Ok(BuildType::Debug),
            _ => Err(GeneratorError::UnknownBuildType(s.to_string())),
        }
    }
}

impl Display for BuildType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{host_platforms, BuildType, Platform};
    use std::str::FromStr;

    #[test]
    fn platform_names() {
        for platform in Platform::ALL {
            assert_eq!(Platform::from_str(platform.to_str()).unwrap(), platform);
        }
        assert!(Platform::from_str("Linux").is_err());
        assert!(Platform::from_str("mac").is_err());
    }

    #[test]
    fn android_always_available() {
        let platforms = host_platforms();
        assert!(platforms.contains(&Platform::Android));
        assert!(!platforms.contains(&Platform::Ios) || cfg!(target_os = "macos"));
    }

    #[test]
    fn build_type_default_debug() {
        assert_eq!(BuildType::default(), BuildType::Debug);
        assert_eq!(BuildType::from_str("Release").unwrap(), BuildType::Release);
        assert!(BuildType::from_str("release").is_err());
    }
}
