//! Library versions of the shell commands used by the build scripts.
//!
//! Each utility mirrors the behaviour of the homonymous POSIX command, with the command line
//! switches replaced by an [Options] value. All of them return [std::io::Error]s mentioning the
//! offending path.

mod chmod;
pub use self::chmod::{chmod, file_mode};
mod cp;
pub use self::cp::{copy_directory_contents, cp, cp_r};
mod ln;
pub use self::ln::ln;
mod mkdir;
pub use self::mkdir::{create_directory, mkdir};
mod mode;
pub use self::mode::{mode_string, Mode, ParseModeError, MODE_MASK, SETGID, SETUID, STICKY};
mod mv;
pub use self::mv::mv;
mod options;
pub use self::options::Options;
mod rm;
pub use self::rm::{remove_directory_contents, rm, rm_rf, rmdir};
mod search;
pub use self::search::{cd, find_in, glob, join, which};

use std::io::{Error, ErrorKind};
use std::path::Path;

/// Prefixes the message of an error with the path it refers to.
pub(crate) fn annotate(error: Error, path: &Path) -> Error {
    Error::new(error.kind(), format!("{}: {}", path.display(), error))
}

/// The last component of `path`, or an error for paths like `/` or `..`.
pub(crate) fn base_name(path: &Path) -> Result<&std::ffi::OsStr, Error> {
    path.file_name().ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("{} has no file name", path.display()),
        )
    })
}

/// True if both paths exist and resolve to the same file. Symbolic links are followed.
#[cfg(unix)]
pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

/// True if both paths exist and resolve to the same file. Symbolic links are followed.
#[cfg(not(unix))]
pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

pub(crate) fn same_file_error(src: &Path, dst: &Path) -> Error {
    Error::new(
        ErrorKind::InvalidInput,
        format!("{} and {} are the same file", src.display(), dst.display()),
    )
}

#[cfg(test)]
mod tests;
