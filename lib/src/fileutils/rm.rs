use super::options::command_args;
use super::cp::ends_with_current_dir;
use super::{annotate, Options};
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Component, Path};

/// Removes each path in `paths`.
///
/// Directories are removed only with `recursive`, together with their content. Symbolic links are
/// removed and never followed. With `force` missing paths are silently ignored.
///
/// # Examples
/// ```no_run
/// use enginegen::fileutils::{rm, Options};
///
/// rm(&["build/android"], Options::new().recursive().force()).expect("Failed to remove");
/// ```
pub fn rm<P: AsRef<Path>>(paths: &[P], options: Options) -> Result<(), Error> {
    options.echo("rm", &command_args(options.flag_string("rf"), paths));
    for path in paths {
        let path = path.as_ref();
        if is_dot_or_dot_dot(path) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("refusing to remove '.' or '..' directory: {}", path.display()),
            ));
        }
    }
    if options.noop {
        return Ok(());
    }
    for path in paths {
        let path = path.as_ref();
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound && options.force => continue,
            Err(e) => return Err(annotate(e, path)),
        };
        if metadata.is_dir() {
            if !options.recursive {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("cannot remove {}: is a directory", path.display()),
                ));
            }
            fs::remove_dir_all(path).map_err(|e| annotate(e, path))?;
        } else {
            remove_link_or_file(path, &metadata)?;
        }
    }
    Ok(())
}

fn is_dot_or_dot_dot(path: &Path) -> bool {
    ends_with_current_dir(path)
        || matches!(path.components().next_back(), Some(Component::ParentDir))
}

/// Same as [rm] with both `recursive` and `force`.
pub fn rm_rf<P: AsRef<Path>>(paths: &[P]) -> Result<(), Error> {
    rm(paths, Options::new().recursive().force())
}

/// Removes the empty directories in `paths`.
///
/// With `parents`, every ancestor named in the path is removed too, stopping at the first one that
/// is not empty. With `force` missing or non-empty directories are ignored.
pub fn rmdir<P: AsRef<Path>>(paths: &[P], options: Options) -> Result<(), Error> {
    options.echo("rmdir", &command_args(options.flag_string("p"), paths));
    if options.noop {
        return Ok(());
    }
    for path in paths {
        let path = path.as_ref();
        match fs::remove_dir(path) {
            Ok(()) => {}
            Err(_) if options.force => continue,
            Err(e) => return Err(annotate(e, path)),
        }
        if options.parents {
            let mut ancestor = path.parent();
            while let Some(dir) = ancestor.filter(|dir| !dir.as_os_str().is_empty()) {
                if fs::remove_dir(dir).is_err() {
                    break;
                }
                ancestor = dir.parent();
            }
        }
    }
    Ok(())
}

/// Removes everything inside `dir`, keeping the directory itself.
pub fn remove_directory_contents<P: AsRef<Path>>(dir: P, options: Options) -> Result<(), Error> {
    let dir = dir.as_ref();
    options.echo("rm", &command_args(String::from("-rf"), &[dir.join("*")]));
    if options.noop {
        return Ok(());
    }
    for entry in fs::read_dir(dir).map_err(|e| annotate(e, dir))? {
        let entry = entry?;
        let path = entry.path();
        let metadata = fs::symlink_metadata(&path)?;
        if metadata.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| annotate(e, &path))?;
        } else {
            remove_link_or_file(&path, &metadata)?;
        }
    }
    Ok(())
}

#[cfg(not(windows))]
fn remove_link_or_file(path: &Path, _: &fs::Metadata) -> Result<(), Error> {
    fs::remove_file(path).map_err(|e| annotate(e, path))
}

// directory symlinks on Windows are removed as directories
#[cfg(windows)]
fn remove_link_or_file(path: &Path, metadata: &fs::Metadata) -> Result<(), Error> {
    match fs::remove_file(path) {
        Err(_) if metadata.file_type().is_symlink() => fs::remove_dir(path),
        other => other,
    }
    .map_err(|e| annotate(e, path))
}
