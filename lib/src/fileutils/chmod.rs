use super::options::command_args;
use super::{annotate, Mode, Options, MODE_MASK};
use std::fs;
use std::io::Error;
use std::path::Path;

/// Changes the permissions of each path in `paths`.
///
/// Paths given explicitly are followed if they are symbolic links. With `recursive` the directory
/// trees are walked depth-first, changing each directory before its content; links found during
/// the walk are skipped.
///
/// On hosts without Unix permissions only the owner write bit is honoured, as the read-only
/// attribute.
///
/// # Examples
/// ```no_run
/// use enginegen::fileutils::{chmod, Mode, Options};
///
/// let mode = Mode::parse("u+x").unwrap();
/// chmod(&mode, &["build/build.sh"], Options::new()).expect("Failed to chmod");
/// ```
pub fn chmod<P: AsRef<Path>>(mode: &Mode, paths: &[P], options: Options) -> Result<(), Error> {
    let mut args = command_args(options.flag_string("R"), &[mode.to_string()]);
    args.extend(command_args(String::new(), paths));
    options.echo("chmod", &args);
    if options.noop {
        return Ok(());
    }
    for path in paths {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| annotate(e, path))?;
        change_mode(path, &metadata, mode).map_err(|e| annotate(e, path))?;
        if options.recursive && metadata.is_dir() {
            chmod_tree(path, mode)?;
        }
    }
    Ok(())
}

fn chmod_tree(dir: &Path, mode: &Mode) -> Result<(), Error> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = fs::symlink_metadata(&path)?;
        if metadata.file_type().is_symlink() {
            log::debug!("Skipping symbolic link {}", path.display());
            continue;
        }
        change_mode(&path, &metadata, mode)?;
        if metadata.is_dir() {
            chmod_tree(&path, mode)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn change_mode(path: &Path, metadata: &fs::Metadata, mode: &Mode) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;
    let current = mode_bits(metadata);
    let updated = mode.apply(current, metadata.is_dir());
    if updated != current {
        fs::set_permissions(path, fs::Permissions::from_mode(updated))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn change_mode(path: &Path, metadata: &fs::Metadata, mode: &Mode) -> Result<(), Error> {
    let mut permissions = metadata.permissions();
    let updated = mode.apply(mode_bits(metadata), metadata.is_dir());
    let readonly = updated & 0o200 == 0;
    if readonly != permissions.readonly() {
        permissions.set_readonly(readonly);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

/// Returns the permission bits of `path`, including the special bits.
///
/// On hosts without Unix permissions the bits are synthesised from the read-only attribute.
pub fn file_mode<P: AsRef<Path>>(path: P) -> Result<u32, Error> {
    let metadata = fs::metadata(path)?;
    Ok(mode_bits(&metadata))
}

#[cfg(unix)]
fn mode_bits(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & MODE_MASK
}

#[cfg(not(unix))]
fn mode_bits(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o555
    } else {
        0o755
    }
}
