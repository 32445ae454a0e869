//! Layout fixes for the extracted Vulkan SDK.

use crate::fileutils::{annotate, mv, rm, rmdir, Options};
use std::ffi::OsStr;
use std::fs;
use std::io::Error;
use std::path::{Path, PathBuf};
use thiserror::Error;

const SDK_FOLDER: &str = "VulkanSDK";
const TMP_FOLDER: &str = "VulkanSDK_TMP";

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("no Vulkan SDK found in {}", .0.display())]
    NotFound(PathBuf),
    #[error("expected a single versioned folder inside the Vulkan SDK, found {0} entries")]
    UnexpectedLayout(usize),
    #[error(transparent)]
    Io(#[from] Error),
}

/// An installed Vulkan SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkInfo {
    pub version: String,
    pub location: PathBuf,
}

/// Flattens `<output_dir>/VulkanSDK/<version>` into `<output_dir>/VulkanSDK`.
///
/// The installer extracts the SDK inside a folder named after its version. The content of that
/// folder is moved one level up, so the SDK location does not depend on the version.
///
/// # Errors
/// Fails if `<output_dir>/VulkanSDK` is missing or if it does not contain exactly one directory.
/// In the latter case the folder is left as it was found. With `noop` nothing is touched and the
/// planned layout is returned.
pub fn normalize_sdk_layout<P: AsRef<Path>>(
    output_dir: P,
    options: Options,
) -> Result<SdkInfo, SdkError> {
    let output_dir = output_dir.as_ref();
    let sdk_dir = output_dir.join(SDK_FOLDER);
    let tmp_dir = output_dir.join(TMP_FOLDER);
    if !sdk_dir.is_dir() {
        return Err(SdkError::NotFound(output_dir.to_path_buf()));
    }
    let entries = list_entries(&sdk_dir).map_err(|e| annotate(e, &sdk_dir))?;
    let name = match entries.as_slice() {
        [versioned] if versioned.is_dir() => versioned.file_name().map(OsStr::to_os_string),
        _ => None,
    }
    .ok_or(SdkError::UnexpectedLayout(entries.len()))?;
    let version = name.to_string_lossy().to_string();
    if tmp_dir.exists() {
        log::warn!("Removing stale {}", tmp_dir.display());
        rm(&[&tmp_dir], options.recursive().force())?;
    }
    mv(&sdk_dir, &tmp_dir, options)?;
    if let Err(e) = mv(tmp_dir.join(&name), &sdk_dir, options) {
        if let Err(restore) = mv(&tmp_dir, &sdk_dir, options) {
            log::warn!("Could not restore {}: {}", sdk_dir.display(), restore);
        }
        return Err(e.into());
    }
    rmdir(&[&tmp_dir], options)?;
    if !options.noop {
        log::info!("Vulkan SDK {} installed in {}", version, sdk_dir.display());
    }
    Ok(SdkInfo {
        version,
        location: sdk_dir,
    })
}

fn list_entries(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        entries.push(entry?.path());
    }
    Ok(entries)
}
