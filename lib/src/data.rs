//! Preparation of the engine data folder.
//!
//! The data folder is mirrored in the output folder, then every GLSL shader found in
//! `shaders/glsl` is paired with its SPIR-V counterpart in `shaders/spirv`. Compilation itself is
//! left to the caller, that receives the location of the compiler and the list of jobs.

use crate::fileutils::{cp_r, find_in, glob, mkdir, which, Options};
use crate::Environment;
use std::ffi::OsString;
use std::fs;
use std::io::Error;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// GLSL standard requested to the compiler if nothing else is specified.
pub const DEFAULT_GLSL_STD: &str = "450core";

/// Errors reported by [process_data].
#[derive(Debug, Error)]
pub enum DataError {
    #[error("input folder {} does not exist", .0.display())]
    MissingInput(PathBuf),
    #[error(transparent)]
    Io(#[from] Error),
}

/// A single GLSL to SPIR-V translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ShaderJob {
    /// The arguments of the compiler invocation, the compiler itself included.
    pub fn command(&self, compiler: &Path, std: &str) -> Vec<OsString> {
        vec![
            compiler.as_os_str().to_os_string(),
            OsString::from(format!("-std={}", std)),
            self.input.as_os_str().to_os_string(),
            OsString::from("-o"),
            self.output.as_os_str().to_os_string(),
        ]
    }

    /// Same as [ShaderJob::command], as a single printable line.
    pub fn command_line(&self, compiler: &Path, std: &str) -> String {
        self.command(compiler, std)
            .iter()
            .map(|arg| arg.to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of [process_data].
#[derive(Debug, Clone)]
pub struct DataPlan {
    /// The processed data folder.
    pub output: PathBuf,
    /// The shader compiler, if one was found.
    pub compiler: Option<PathBuf>,
    pub jobs: Vec<ShaderJob>,
}

/// Name of the GLSL compiler executable on this host.
pub fn shader_compiler_name() -> &'static str {
    if cfg!(windows) {
        "glslc.exe"
    } else {
        "glslc"
    }
}

/// Locates the GLSL compiler.
///
/// The compiler is searched in `PATH` first, then in the Vulkan SDKs installed in `C:\VulkanSDK`
/// (Windows only), in `$VULKAN_SDK/bin` and in the shader tools shipped with the Android NDK.
pub fn find_shader_compiler(env: &Environment) -> Option<PathBuf> {
    let name = shader_compiler_name();
    if let Some(found) = which(name, env) {
        return Some(found);
    }
    let mut search_paths = Vec::new();
    if cfg!(windows) {
        search_paths.extend(glob_dirs(r"C:\VulkanSDK\*").iter().map(|d| d.join("Bin")));
    }
    if let Some(sdk) = env.vulkan_sdk() {
        search_paths.push(sdk.join("bin"));
    }
    if let Some(ndk) = env.android_ndk_home() {
        let tools = ndk.join("shader-tools");
        let pattern = format!("{}/*", ::glob::Pattern::escape(&tools.to_string_lossy()));
        search_paths.extend(glob_dirs(&pattern));
    }
    search_paths.extend(env.search_path());
    let found = find_in(name, &search_paths);
    if found.is_none() {
        log::warn!("{} not found. Is the Vulkan SDK installed?", name);
    }
    found
}

fn glob_dirs(pattern: &str) -> Vec<PathBuf> {
    match glob(pattern) {
        Ok(matches) => matches.into_iter().filter(|m| m.is_dir()).collect(),
        Err(e) => {
            log::warn!("{}", e);
            Vec::new()
        }
    }
}

/// Lists the shaders of a data folder, sorted by name.
///
/// Every regular file in `<data>/shaders/glsl` produces a file with the same name in
/// `<data>/shaders/spirv`. A data folder without shaders yields no jobs.
pub fn collect_shader_jobs<P: AsRef<Path>>(data_dir: P) -> Result<Vec<ShaderJob>, Error> {
    shader_jobs(data_dir.as_ref(), data_dir.as_ref())
}

// shaders are listed from `source` but the jobs point inside `data_dir`
fn shader_jobs(source: &Path, data_dir: &Path) -> Result<Vec<ShaderJob>, Error> {
    let glsl_source = source.join("shaders").join("glsl");
    let shaders_dir = data_dir.join("shaders");
    let glsl_dir = shaders_dir.join("glsl");
    let spirv_dir = shaders_dir.join("spirv");
    if !glsl_source.is_dir() {
        log::debug!("No shaders in {}", glsl_source.display());
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(&glsl_source)? {
        let entry = entry?;
        if entry.path().is_file() {
            names.push(entry.file_name());
        }
    }
    names.sort();
    Ok(names
        .into_iter()
        .map(|name| ShaderJob {
            input: glsl_dir.join(&name),
            output: spirv_dir.join(&name),
        })
        .collect())
}

/// Completion percentage after `done` out of `total` items, rounded down.
pub fn progress_percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        100
    } else {
        (100 * done.min(total) / total) as u32
    }
}

/// Mirrors the data folder `input` into `output` and plans the compilation of its shaders.
///
/// Files already present in `output` are overwritten, other files are left untouched. With
/// `noop` nothing is copied and the jobs are planned from the shaders found in `input`.
///
/// # Errors
/// Fails if `input` does not exist or if the copy fails.
pub fn process_data<I: AsRef<Path>, O: AsRef<Path>>(
    input: I,
    output: O,
    env: &Environment,
    options: Options,
) -> Result<DataPlan, DataError> {
    let input = input.as_ref();
    let output = output.as_ref();
    if !input.is_dir() {
        return Err(DataError::MissingInput(input.to_path_buf()));
    }
    mkdir(&[output], options.parents())?;
    cp_r(input.join("."), output, options.force())?;
    mkdir(&[output.join("shaders").join("spirv")], options.parents())?;
    let listed = if options.noop { input } else { output };
    let jobs = shader_jobs(listed, output)?;
    Ok(DataPlan {
        output: output.to_path_buf(),
        compiler: find_shader_compiler(env),
        jobs,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        collect_shader_jobs, find_shader_compiler, process_data, progress_percent,
        shader_compiler_name, DataError, ShaderJob, DEFAULT_GLSL_STD,
    };
    use crate::fileutils::Options;
    use crate::Environment;
    use std::error::Error;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn make_executable(path: &Path) -> Result<(), Box<dyn Error>> {
        fs::create_dir_all(path.parent().unwrap())?;
        fs::write(path, "")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
        }
        Ok(())
    }

    #[test]
    fn percent() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 66);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 100);
    }

    #[test]
    fn job_command() {
        let job = ShaderJob {
            input: PathBuf::from("glsl/mesh.vert"),
            output: PathBuf::from("spirv/mesh.vert"),
        };
        assert_eq!(
            job.command_line(Path::new("glslc"), DEFAULT_GLSL_STD),
            "glslc -std=450core glsl/mesh.vert -o spirv/mesh.vert"
        );
        assert_eq!(job.command(Path::new("glslc"), "320es").len(), 5);
    }

    #[test]
    fn compiler_from_vulkan_sdk() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let compiler = dir.path().join("sdk").join("bin").join(shader_compiler_name());
        make_executable(&compiler)?;
        let env = Environment::new().with("VULKAN_SDK", dir.path().join("sdk"));
        assert_eq!(find_shader_compiler(&env), Some(compiler));
        assert_eq!(find_shader_compiler(&Environment::new()), None);
        Ok(())
    }

    #[test]
    fn compiler_from_android_ndk() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let compiler = dir
            .path()
            .join("ndk")
            .join("shader-tools")
            .join("linux-x86_64")
            .join(shader_compiler_name());
        make_executable(&compiler)?;
        let env = Environment::new().with("ANDROID_NDK_HOME", dir.path().join("ndk"));
        assert_eq!(find_shader_compiler(&env), Some(compiler));
        Ok(())
    }

    #[test]
    fn jobs_sorted_files_only() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let glsl = dir.path().join("shaders").join("glsl");
        fs::create_dir_all(glsl.join("include"))?;
        fs::write(glsl.join("mesh.vert"), "")?;
        fs::write(glsl.join("mesh.frag"), "")?;
        let jobs = collect_shader_jobs(dir.path())?;
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].input, glsl.join("mesh.frag"));
        assert_eq!(
            jobs[0].output,
            dir.path().join("shaders").join("spirv").join("mesh.frag")
        );
        assert!(collect_shader_jobs(dir.path().join("missing"))?.is_empty());
        Ok(())
    }

    #[test]
    fn process_mirrors_data() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let input = dir.path().join("data");
        let output = dir.path().join("out").join("data");
        fs::create_dir_all(input.join("shaders").join("glsl"))?;
        fs::create_dir_all(input.join("textures"))?;
        fs::write(input.join("shaders").join("glsl").join("sky.frag"), "new")?;
        fs::write(input.join("textures").join("sky.png"), "")?;
        fs::create_dir_all(output.join("shaders").join("glsl"))?;
        fs::write(output.join("shaders").join("glsl").join("sky.frag"), "old")?;
        fs::write(output.join("extra.bin"), "")?;
        let plan = process_data(&input, &output, &Environment::new(), Options::new())?;
        assert_eq!(plan.jobs.len(), 1);
        assert!(plan.compiler.is_none());
        assert_eq!(fs::read_to_string(&plan.jobs[0].input)?, "new");
        assert!(output.join("textures").join("sky.png").is_file());
        assert!(output.join("shaders").join("spirv").is_dir());
        assert!(output.join("extra.bin").is_file());
        Ok(())
    }

    #[test]
    fn process_missing_input() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let result = process_data(
            dir.path().join("missing"),
            dir.path().join("out"),
            &Environment::new(),
            Options::new(),
        );
        assert!(matches!(result, Err(DataError::MissingInput(_))));
        assert!(!dir.path().join("out").exists());
        Ok(())
    }

    #[test]
    fn process_dry_run() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let input = dir.path().join("data");
        let output = dir.path().join("out");
        fs::create_dir_all(input.join("shaders").join("glsl"))?;
        fs::write(input.join("shaders").join("glsl").join("sky.frag"), "")?;
        let plan = process_data(&input, &output, &Environment::new(), Options::new().noop())?;
        assert!(!output.exists());
        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(
            plan.jobs[0].output,
            output.join("shaders").join("spirv").join("sky.frag")
        );
        Ok(())
    }
}
