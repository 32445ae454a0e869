//! Generation of the per-platform build directories.

mod platform;
pub use self::platform::{host_platforms, BuildType, Platform};
mod project;
pub use self::project::{Generator, GeneratorConfig};

use crate::fileutils::ParseModeError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported while configuring or generating a project.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("unknown platform `{0}`")]
    UnknownPlatform(String),
    #[error("unknown build type `{0}`")]
    UnknownBuildType(String),
    #[error("platform `{0}` can not be generated from this host")]
    UnsupportedHost(Platform),
    #[error("invalid CMake argument `{0}`, expected KEY=VALUE")]
    InvalidCMakeArgument(String),
    #[error("could not create build directory {}", .0.display())]
    BuildDirectory(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Mode(#[from] ParseModeError),
}
