use super::options::command_args;
use super::{annotate, Options};
use std::fs;
use std::io::Error;
use std::path::Path;

/// Creates each directory in `paths`.
///
/// With `parents` the missing ancestors are created as well, and an already existing directory is
/// not an error.
pub fn mkdir<P: AsRef<Path>>(paths: &[P], options: Options) -> Result<(), Error> {
    options.echo("mkdir", &command_args(options.flag_string("p"), paths));
    if options.noop {
        return Ok(());
    }
    for path in paths {
        let path = path.as_ref();
        let result = if options.parents {
            fs::create_dir_all(path)
        } else {
            fs::create_dir(path)
        };
        result.map_err(|e| annotate(e, path))?;
    }
    Ok(())
}

/// Same as `mkdir -p`, but reports whether the directory exists once done instead of failing.
pub fn create_directory<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    match fs::create_dir_all(path) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to create directory {}: {}", path.display(), e);
            path.is_dir()
        }
    }
}
