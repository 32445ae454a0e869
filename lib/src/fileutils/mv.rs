use super::options::command_args;
use super::{annotate, base_name, cp, same_file, same_file_error, Options};
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::Path;

/// Moves `src` to `dst`.
///
/// If `dst` is an existing directory, `src` is moved to `dst/basename(src)`. With `force` an
/// existing destination file is removed first. When the two paths live on different devices the
/// move falls back to a preserving recursive copy followed by the removal of `src`.
///
/// # Errors
/// Fails if `src` is missing, when replacing an existing non-empty directory, or for any other
/// error reported by the filesystem.
pub fn mv<S: AsRef<Path>, D: AsRef<Path>>(src: S, dst: D, options: Options) -> Result<(), Error> {
    let src = src.as_ref();
    let dst = dst.as_ref();
    options.echo("mv", &command_args(options.flag_string("f"), &[src, dst]));
    if options.noop {
        return Ok(());
    }
    let src_meta = fs::symlink_metadata(src).map_err(|e| annotate(e, src))?;
    let target = if dst.is_dir() && !same_file(src, dst) {
        dst.join(base_name(src)?)
    } else {
        dst.to_path_buf()
    };
    if !src_meta.is_dir() && same_file(src, &target) {
        return Err(same_file_error(src, &target));
    }
    if let Ok(target_meta) = fs::symlink_metadata(&target) {
        if target_meta.is_dir() {
            if !src_meta.is_dir() {
                return Err(Error::new(
                    ErrorKind::AlreadyExists,
                    format!(
                        "cannot overwrite directory {} with non-directory {}",
                        target.display(),
                        src.display()
                    ),
                ));
            }
            if fs::read_dir(&target)?.next().is_some() {
                return Err(Error::new(
                    ErrorKind::AlreadyExists,
                    format!("cannot move {}: {} is not empty", src.display(), target.display()),
                ));
            }
        } else if options.force {
            fs::remove_file(&target).map_err(|e| annotate(e, &target))?;
        }
    }
    match fs::rename(src, &target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            log::debug!(
                "{} and {} are on different devices, copying instead",
                src.display(),
                target.display()
            );
            move_by_copy(src, &target)
        }
        Err(e) => Err(annotate(e, src)),
    }
}

/// Moves `src` to `target` with a preserving recursive copy followed by the removal of `src`.
pub(crate) fn move_by_copy(src: &Path, target: &Path) -> Result<(), Error> {
    let copy_options = Options::new().recursive().preserve().force();
    if fs::symlink_metadata(src).map_err(|e| annotate(e, src))?.is_dir() {
        cp::cp(src.join("."), target, copy_options)?;
        fs::remove_dir_all(src).map_err(|e| annotate(e, src))
    } else {
        cp::cp(src, target, copy_options)?;
        fs::remove_file(src).map_err(|e| annotate(e, src))
    }
}
