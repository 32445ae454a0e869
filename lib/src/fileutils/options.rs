use std::fmt::Display;
use std::io::{Error, ErrorKind};
use std::path::Path;

/// Flags controlling the behaviour of the file utilities.
///
/// Every utility reads only the flags meaningful to it and ignores the rest, in the same way the
/// shell commands ignore options they do not understand. The letters accepted by
/// [Options::from_flags] are:
///
/// | letter    | flag          |
/// |-----------|---------------|
/// | `f`       | `force`       |
/// | `r`, `R`  | `recursive`   |
/// | `v`       | `verbose`     |
/// | `n`       | `noop`        |
/// | `p`       | `preserve` and `parents` |
/// | `s`       | `symbolic`    |
/// | `L`       | `dereference` |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Ignore missing files and overwrite existing destinations.
    pub force: bool,
    /// Operate on whole directory trees.
    pub recursive: bool,
    /// Log the equivalent shell command before running it.
    pub verbose: bool,
    /// Log, but do not touch the filesystem.
    pub noop: bool,
    /// Keep permission bits and modification time when copying.
    pub preserve: bool,
    /// Create (or remove) the intermediate directories.
    pub parents: bool,
    /// Create symbolic links instead of hard links.
    pub symbolic: bool,
    /// Follow symbolic links found while copying a tree.
    pub dereference: bool,
}

impl Options {
    pub fn new() -> Options {
        Options::default()
    }

    pub fn force(mut self) -> Options {
        self.force = true;
        self
    }

    pub fn recursive(mut self) -> Options {
        self.recursive = true;
        self
    }

    pub fn verbose(mut self) -> Options {
        self.verbose = true;
        self
    }

    pub fn noop(mut self) -> Options {
        self.noop = true;
        self
    }

    pub fn preserve(mut self) -> Options {
        self.preserve = true;
        self
    }

    pub fn parents(mut self) -> Options {
        self.parents = true;
        self
    }

    pub fn symbolic(mut self) -> Options {
        self.symbolic = true;
        self
    }

    pub fn dereference(mut self) -> Options {
        self.dereference = true;
        self
    }

    /// Builds the options from a short flag string, like `-rf` or `pv`.
    ///
    /// # Errors
    /// Returns [ErrorKind::InvalidInput] if the string contains an unknown letter.
    ///
    /// # Examples
    /// ```
    /// use enginegen::fileutils::Options;
    ///
    /// let opts = Options::from_flags("-rf").unwrap();
    /// assert!(opts.recursive && opts.force);
    /// assert!(!opts.verbose);
    /// ```
    pub fn from_flags(flags: &str) -> Result<Options, Error> {
        let mut options = Options::default();
        for letter in flags.trim_start_matches('-').chars() {
            match letter {
                'f' => options.force = true,
                'r' | 'R' => options.recursive = true,
                'v' => options.verbose = true,
                'n' => options.noop = true,
                'p' => {
                    options.preserve = true;
                    options.parents = true;
                }
                's' => options.symbolic = true,
                'L' => options.dereference = true,
                _ => {
                    return Err(Error::new(
                        ErrorKind::InvalidInput,
                        format!("unknown option `{}` in `{}`", letter, flags),
                    ))
                }
            }
        }
        Ok(options)
    }

    /// Logs `command` followed by `args` if the options are verbose.
    pub(crate) fn echo<S: Display>(&self, command: &str, args: &[S]) {
        if self.verbose {
            let args = args
                .iter()
                .map(|arg| arg.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            log::info!("{} {}", command, args);
        }
    }

    /// Renders the subset of `letters` that are enabled, as a shell flag (`-rf`) or an empty
    /// string.
    pub(crate) fn flag_string(&self, letters: &str) -> String {
        let enabled = letters
            .chars()
            .filter(|letter| match letter {
                'f' => self.force,
                'r' | 'R' => self.recursive,
                'v' => self.verbose,
                'n' => self.noop,
                'p' => self.preserve || self.parents,
                's' => self.symbolic,
                'L' => self.dereference,
                _ => false,
            })
            .collect::<String>();
        if enabled.is_empty() {
            enabled
        } else {
            format!("-{}", enabled)
        }
    }
}

/// Joins the flags and paths of a command to be echoed, skipping empty flag strings.
pub(crate) fn command_args<P: AsRef<Path>>(flags: String, paths: &[P]) -> Vec<String> {
    let mut args = Vec::with_capacity(paths.len() + 1);
    if !flags.is_empty() {
        args.push(flags);
    }
    args.extend(paths.iter().map(|p| p.as_ref().display().to_string()));
    args
}

#[cfg(test)]
mod tests {
    use super::{command_args, Options};
    use std::io::ErrorKind;

    #[test]
    fn builder_sets_flags() {
        let opts = Options::new().force().recursive();
        assert!(opts.force);
        assert!(opts.recursive);
        assert!(!opts.noop);
        assert_eq!(opts, Options::from_flags("-fr").unwrap());
    }

    #[test]
    fn parse_flags_without_dash() {
        let opts = Options::from_flags("pvL").unwrap();
        assert!(opts.preserve);
        assert!(opts.parents);
        assert!(opts.verbose);
        assert!(opts.dereference);
        assert!(!opts.force);
    }

    #[test]
    fn parse_flags_unknown_letter() {
        let err = Options::from_flags("-rz").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn flag_string_only_enabled() {
        let opts = Options::new().recursive().verbose();
        assert_eq!(opts.flag_string("rf"), "-r");
        assert_eq!(opts.flag_string("f"), "");
        assert_eq!(
            command_args(opts.flag_string("f"), &["a", "b"]),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
