use super::{annotate, Options};
use crate::Environment;
use std::ffi::OsStr;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

/// Finds the executable named `program` in the directories listed by the `PATH` variable.
///
/// On Windows every extension listed in `PATHEXT` is also tried. A `program` containing a path
/// separator is not searched, but checked as is.
///
/// # Examples
/// ```
/// use enginegen::fileutils::which;
/// use enginegen::Environment;
///
/// let env = Environment::new();
/// assert!(which("cmake", &env).is_none());
/// ```
pub fn which<S: AsRef<OsStr>>(program: S, env: &Environment) -> Option<PathBuf> {
    let program = Path::new(program.as_ref());
    let candidates = candidate_names(program, env);
    if program.components().count() > 1 {
        candidates.into_iter().find(|c| is_executable(c))
    } else {
        env.search_path().iter().find_map(|dir| {
            candidates
                .iter()
                .map(|name| dir.join(name))
                .find(|c| is_executable(c))
        })
    }
}

/// Finds `program` in the first directory of `dirs` containing it as an executable file.
pub fn find_in<S: AsRef<OsStr>, P: AsRef<Path>>(program: S, dirs: &[P]) -> Option<PathBuf> {
    let program = program.as_ref();
    dirs.iter()
        .map(|dir| dir.as_ref().join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(windows)]
fn candidate_names(program: &Path, env: &Environment) -> Vec<PathBuf> {
    let mut names = vec![program.to_path_buf()];
    if program.extension().is_none() {
        names.extend(env.executable_extensions().into_iter().map(|ext| {
            let mut name = program.as_os_str().to_os_string();
            name.push(ext);
            PathBuf::from(name)
        }));
    }
    names
}

#[cfg(not(windows))]
fn candidate_names(program: &Path, _: &Environment) -> Vec<PathBuf> {
    vec![program.to_path_buf()]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Returns the paths matching a shell pattern like `shaders/**/*.vert`, sorted.
///
/// Entries that can not be read while matching are skipped with a warning.
pub fn glob(pattern: &str) -> Result<Vec<PathBuf>, Error> {
    let paths = glob::glob(pattern).map_err(|e| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("invalid pattern `{}`: {}", pattern, e),
        )
    })?;
    let mut matches = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .collect::<Vec<_>>();
    matches.sort();
    Ok(matches)
}

/// Changes the working directory of the process.
pub fn cd<P: AsRef<Path>>(path: P, options: Options) -> Result<(), Error> {
    let path = path.as_ref();
    options.echo("cd", &[path.display()]);
    if options.noop {
        return Ok(());
    }
    std::env::set_current_dir(path).map_err(|e| annotate(e, path))
}

/// Joins path components in a single path.
pub fn join<I, P>(parts: I) -> PathBuf
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    parts.into_iter().fold(PathBuf::new(), |acc, part| acc.join(part))
}
