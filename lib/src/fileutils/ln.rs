use super::options::command_args;
use super::{annotate, base_name, same_file, same_file_error, Options};
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::Path;

/// Creates a link named `dst` pointing to `src`.
///
/// The link is a hard link unless `symbolic` is set. Symbolic links store `src` verbatim, so a
/// relative `src` is resolved from the directory containing the link, and the link may dangle.
/// If `dst` is an existing directory, the link is created as `dst/basename(src)`; with `force`
/// a symbolic link to a directory is instead replaced, like `ln -sfn` does.
///
/// # Examples
/// ```no_run
/// use enginegen::fileutils::{ln, Options};
///
/// ln("../shaders", "build/shaders", Options::new().symbolic().force()).expect("Failed to link");
/// ```
pub fn ln<S: AsRef<Path>, D: AsRef<Path>>(src: S, dst: D, options: Options) -> Result<(), Error> {
    let src = src.as_ref();
    let dst = dst.as_ref();
    options.echo("ln", &command_args(options.flag_string("sf"), &[src, dst]));
    if options.noop {
        return Ok(());
    }
    let dst_is_link = fs::symlink_metadata(dst)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    let target = if dst.is_dir() && !(options.force && dst_is_link) {
        dst.join(base_name(src)?)
    } else {
        dst.to_path_buf()
    };
    if let Ok(metadata) = fs::symlink_metadata(&target) {
        let linked = match target.parent() {
            Some(parent) if options.symbolic && src.is_relative() => parent.join(src),
            _ => src.to_path_buf(),
        };
        if !metadata.file_type().is_symlink() && same_file(&linked, &target) {
            return Err(same_file_error(src, &target));
        }
        if !options.force {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!("{} already exists", target.display()),
            ));
        }
        if metadata.is_dir() {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!("cannot overwrite directory {}", target.display()),
            ));
        }
        remove_link(&target)?;
    }
    if options.symbolic {
        make_symlink(src, &target)
    } else {
        fs::hard_link(src, &target).map_err(|e| annotate(e, src))
    }
}

#[cfg(not(windows))]
fn remove_link(path: &Path) -> Result<(), Error> {
    fs::remove_file(path).map_err(|e| annotate(e, path))
}

#[cfg(windows)]
fn remove_link(path: &Path) -> Result<(), Error> {
    fs::remove_file(path)
        .or_else(|_| fs::remove_dir(path))
        .map_err(|e| annotate(e, path))
}

/// Creates a symbolic link at `link` whose content is `original`.
#[cfg(unix)]
pub(crate) fn make_symlink(original: &Path, link: &Path) -> Result<(), Error> {
    std::os::unix::fs::symlink(original, link).map_err(|e| annotate(e, link))
}

/// Creates a symbolic link at `link` whose content is `original`.
///
/// Windows needs to know the kind of the target: a relative target is resolved from the
/// directory of the link, and anything that is not an existing directory gets a file link.
#[cfg(windows)]
pub(crate) fn make_symlink(original: &Path, link: &Path) -> Result<(), Error> {
    let resolved = match link.parent() {
        Some(parent) if original.is_relative() => parent.join(original),
        _ => original.to_path_buf(),
    };
    let result = if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(original, link)
    } else {
        std::os::windows::fs::symlink_file(original, link)
    };
    result.map_err(|e| annotate(e, link))
}
