use super::options::command_args;
use super::{annotate, base_name, ln, same_file, same_file_error, Options};
use std::fs::{self, File};
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Copies `src` to `dst`.
///
/// If `dst` is an existing directory, the copy is placed at `dst/basename(src)`. Directories are
/// copied only with `recursive`; in that case a `src` ending with the `.` component (`data/.`)
/// copies the *content* of `src` into `dst`, creating `dst` if missing.
///
/// Symbolic links found inside a tree are recreated as links, unless `dereference` is set.
/// With `force` a destination file that can not be opened for writing is removed before copying.
/// With `preserve` permission bits and modification times are retained.
///
/// # Errors
/// Fails if `src` is missing, if `src` is a directory and `recursive` is not set, if a directory
/// would be copied inside itself, or for any error reported by the filesystem.
///
/// # Examples
/// ```no_run
/// use enginegen::fileutils::{cp, Options};
///
/// cp("data/.", "build/data", Options::new().recursive().force()).expect("Failed to copy");
/// ```
pub fn cp<S: AsRef<Path>, D: AsRef<Path>>(src: S, dst: D, options: Options) -> Result<(), Error> {
    let src = src.as_ref();
    let dst = dst.as_ref();
    options.echo("cp", &command_args(options.flag_string("rfpL"), &[src, dst]));
    if options.noop {
        return Ok(());
    }
    let metadata = fs::metadata(src).map_err(|e| annotate(e, src))?;
    if metadata.is_dir() {
        if !options.recursive {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("{} is a directory (not copied)", src.display()),
            ));
        }
        let target = if ends_with_current_dir(src) || !dst.is_dir() {
            dst.to_path_buf()
        } else {
            dst.join(base_name(src)?)
        };
        ensure_not_inside(src, &target)?;
        copy_tree(src, &target, options)
    } else {
        let target = if dst.is_dir() {
            dst.join(base_name(src)?)
        } else {
            dst.to_path_buf()
        };
        copy_file(src, &target, options)
    }
}

/// Same as [cp] with `recursive` set.
pub fn cp_r<S: AsRef<Path>, D: AsRef<Path>>(src: S, dst: D, options: Options) -> Result<(), Error> {
    cp(src, dst, options.recursive())
}

/// Copies every entry of `src` inside `dst`, creating `dst` if needed.
///
/// With `force`, a directory already present in `dst` is removed before the matching directory of
/// `src` is copied, instead of being merged.
pub fn copy_directory_contents<S: AsRef<Path>, D: AsRef<Path>>(
    src: S,
    dst: D,
    options: Options,
) -> Result<(), Error> {
    let src = src.as_ref();
    let dst = dst.as_ref();
    let args = command_args(
        options.flag_string("rfpL"),
        &[src.join("*"), dst.to_path_buf()],
    );
    options.echo("cp", &args);
    if options.noop {
        return Ok(());
    }
    ensure_not_inside(src, dst)?;
    fs::create_dir_all(dst).map_err(|e| annotate(e, dst))?;
    for entry in fs::read_dir(src).map_err(|e| annotate(e, src))? {
        let entry = entry?;
        let path = entry.path();
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_symlink() && !options.dereference {
            copy_symlink(&path, &target, options)?;
        } else if path.is_dir() {
            if options.force && target.is_dir() {
                fs::remove_dir_all(&target).map_err(|e| annotate(e, &target))?;
            }
            copy_tree(&path, &target, options)?;
        } else {
            copy_file(&path, &target, options)?;
        }
    }
    Ok(())
}

fn copy_tree(src: &Path, dst: &Path, options: Options) -> Result<(), Error> {
    match fs::symlink_metadata(dst) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!(
                    "cannot overwrite non-directory {} with directory {}",
                    dst.display(),
                    src.display()
                ),
            ))
        }
        Err(_) => fs::create_dir(dst).map_err(|e| annotate(e, dst))?,
    }
    for entry in fs::read_dir(src).map_err(|e| annotate(e, src))? {
        let entry = entry?;
        let path = entry.path();
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_symlink() && !options.dereference {
            copy_symlink(&path, &target, options)?;
        } else if fs::metadata(&path).map_err(|e| annotate(e, &path))?.is_dir() {
            copy_tree(&path, &target, options)?;
        } else {
            copy_file(&path, &target, options)?;
        }
    }
    if options.preserve {
        preserve_attributes(src, dst)?;
    }
    Ok(())
}

fn copy_file(src: &Path, dst: &Path, options: Options) -> Result<(), Error> {
    if same_file(src, dst) {
        return Err(same_file_error(src, dst));
    }
    if let Ok(metadata) = fs::symlink_metadata(dst) {
        if metadata.is_dir() {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!(
                    "cannot overwrite directory {} with non-directory {}",
                    dst.display(),
                    src.display()
                ),
            ));
        }
        if options.force
            && (metadata.file_type().is_symlink()
                || File::options().write(true).open(dst).is_err())
        {
            fs::remove_file(dst).map_err(|e| annotate(e, dst))?;
        }
    }
    fs::copy(src, dst).map_err(|e| annotate(e, src))?;
    if options.preserve {
        preserve_attributes(src, dst)?;
    }
    Ok(())
}

fn copy_symlink(src: &Path, dst: &Path, options: Options) -> Result<(), Error> {
    let link_target = fs::read_link(src).map_err(|e| annotate(e, src))?;
    if fs::symlink_metadata(dst).is_ok() {
        if options.force {
            fs::remove_file(dst).map_err(|e| annotate(e, dst))?;
        } else {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!("{} already exists", dst.display()),
            ));
        }
    }
    ln::make_symlink(&link_target, dst)
}

/// Copies modification time and permissions from `src` to `dst`.
pub(crate) fn preserve_attributes(src: &Path, dst: &Path) -> Result<(), Error> {
    let metadata = fs::metadata(src).map_err(|e| annotate(e, src))?;
    set_modified(dst, metadata.modified()?, metadata.is_dir())?;
    fs::set_permissions(dst, metadata.permissions()).map_err(|e| annotate(e, dst))
}

#[cfg(unix)]
fn set_modified(path: &Path, time: SystemTime, _is_dir: bool) -> Result<(), Error> {
    // a read handle is enough for the owner, and works for directories too
    File::open(path)?.set_modified(time)
}

#[cfg(not(unix))]
fn set_modified(path: &Path, time: SystemTime, is_dir: bool) -> Result<(), Error> {
    if is_dir {
        return Ok(());
    }
    let mut permissions = fs::metadata(path)?.permissions();
    if permissions.readonly() {
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }
    File::options().write(true).open(path)?.set_modified(time)
}

/// True if the last component of `path` is `.`, as in `data/.`.
pub(crate) fn ends_with_current_dir(path: &Path) -> bool {
    let text = path.to_string_lossy();
    text == "." || text.ends_with("/.") || (cfg!(windows) && text.ends_with("\\."))
}

fn ensure_not_inside(src: &Path, dst: &Path) -> Result<(), Error> {
    let src_abs = fs::canonicalize(src).map_err(|e| annotate(e, src))?;
    if resolve(dst)?.starts_with(&src_abs) {
        Err(Error::new(
            ErrorKind::InvalidInput,
            format!(
                "cannot copy directory {} into itself ({})",
                src.display(),
                dst.display()
            ),
        ))
    } else {
        Ok(())
    }
}

/// Canonicalises a path that may not exist yet, by resolving its deepest existing ancestor.
fn resolve(path: &Path) -> Result<PathBuf, Error> {
    if let Ok(resolved) = fs::canonicalize(path) {
        return Ok(resolved);
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut missing = Vec::new();
    let mut current = absolute.as_path();
    loop {
        if let Ok(resolved) = fs::canonicalize(current) {
            return Ok(missing.iter().rev().fold(resolved, |acc, c| acc.join(c)));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                current = parent;
            }
            _ => return Ok(absolute),
        }
    }
}
