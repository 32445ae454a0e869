use super::{host_platforms, BuildType, GeneratorError, Platform};
use crate::fileutils::{
    chmod, copy_directory_contents, create_directory, mkdir, remove_directory_contents, which,
    Mode, Options,
};
use crate::Environment;
use std::fs;
use std::path::{Path, PathBuf};

/// Selection made by the user when generating a project.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// The application name.
    pub name: String,
    /// The application package id, for example `com.example.game`.
    pub package: String,
    pub platform: Platform,
    pub build_type: BuildType,
    /// Additional CMake definitions, in the form `KEY=VALUE`.
    pub cmake_args: Vec<String>,
    /// The engine root, containing the top level `CMakeLists.txt`.
    pub root_dir: PathBuf,
}

/// Prepares the build directory of a project and writes the script that builds it.
///
/// The build directory is `<root>/build/<platform>`. The generator never runs CMake or Gradle:
/// it only writes their invocation in `build.sh` (`build.bat` on Windows hosts).
pub struct Generator {
    config: GeneratorConfig,
    build_dir: PathBuf,
    file_config: Vec<(String, String)>,
    cmake_definitions: Vec<(String, String)>,
    env: Environment,
    options: Options,
}

impl Generator {
    /// Computes the configuration of the project.
    ///
    /// # Errors
    /// Fails if one of the CMake arguments is not in the form `KEY=VALUE`.
    pub fn new(config: GeneratorConfig, env: Environment) -> Result<Generator, GeneratorError> {
        let build_dir = config.root_dir.join("build").join(config.platform.to_str());
        let mut file_config = vec![
            ("APP_NAME".to_string(), config.name.clone()),
            ("APP_PACKAGE".to_string(), config.package.clone()),
            ("APP_PLATFORM".to_string(), config.platform.to_string()),
            ("APP_BUILD_TYPE".to_string(), config.build_type.to_string()),
            (
                "APP_ROOT_DIRECTORY".to_string(),
                config.root_dir.display().to_string(),
            ),
            (
                "APP_BUILD_DIRECTORY".to_string(),
                build_dir.display().to_string(),
            ),
        ];
        let mut cmake_definitions = file_config.clone();
        if config.platform == Platform::Ios {
            upsert(&mut cmake_definitions, "CMAKE_SYSTEM_NAME", "iOS");
        }
        for arg in &config.cmake_args {
            let (key, value) = arg
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| GeneratorError::InvalidCMakeArgument(arg.clone()))?;
            upsert(&mut cmake_definitions, key, value);
        }
        let rendered = render_definitions(&cmake_definitions);
        file_config.push(("CMAKE_ARGUMENTS".to_string(), rendered));
        Ok(Generator {
            config,
            build_dir,
            file_config,
            cmake_definitions,
            env,
            options: Options::new(),
        })
    }

    /// Sets the options used by the file operations, typically `verbose` or `noop`.
    pub fn with_options(mut self, options: Options) -> Generator {
        self.options = options;
        self
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// The project parameters, in the order they are defined.
    pub fn parameters(&self) -> &[(String, String)] {
        &self.file_config
    }

    /// The definitions passed to CMake, user overrides included.
    pub fn cmake_definitions(&self) -> &[(String, String)] {
        &self.cmake_definitions
    }

    /// The definitions rendered as command line arguments, like `-DAPP_NAME='Game'`.
    pub fn cmake_arguments(&self) -> String {
        render_definitions(&self.cmake_definitions)
    }

    /// Generates the project: prepares the build directory, applies the platform specific setup
    /// and writes the build script, whose path is returned.
    ///
    /// # Errors
    /// Fails if the platform can not be targeted from this host or if any file operation fails.
    pub fn run(&self) -> Result<PathBuf, GeneratorError> {
        self.run_with_steps(|_, _, _| {})
    }

    /// Same as [Generator::run], calling `step(index, total, description)` before each step.
    pub fn run_with_steps<F>(&self, mut step: F) -> Result<PathBuf, GeneratorError>
    where
        F: FnMut(usize, usize, &str),
    {
        if !host_platforms().contains(&self.config.platform) {
            return Err(GeneratorError::UnsupportedHost(self.config.platform));
        }
        log::info!("Parameters:");
        for (name, value) in &self.file_config {
            log::info!("    - {}: {}", name, value);
        }
        step(1, 3, "Preparing build directory");
        self.prepare_build_directory()?;
        step(2, 3, "Configuring platform");
        self.configure_platform()?;
        step(3, 3, "Creating build script");
        self.write_build_script()
    }

    /// Empties the build directory if it exists, creates it otherwise.
    pub fn prepare_build_directory(&self) -> Result<(), GeneratorError> {
        if self.build_dir.is_dir() {
            log::info!("Cleaning up build directory");
            remove_directory_contents(&self.build_dir, self.options)?;
        } else {
            log::info!("Creating build directory");
            if !self.options.noop && !create_directory(&self.build_dir) {
                return Err(GeneratorError::BuildDirectory(self.build_dir.clone()));
            }
        }
        Ok(())
    }

    /// Applies the setup required by the target platform. Only Android needs any.
    pub fn configure_platform(&self) -> Result<(), GeneratorError> {
        match self.config.platform {
            Platform::Android => self.configure_android(),
            _ => Ok(()),
        }
    }

    fn configure_android(&self) -> Result<(), GeneratorError> {
        let assets_dir = self.build_dir.join("assets");
        let jni_libs_dir = self.build_dir.join("jniLibs");
        let java_src_dir = self.build_dir.join("src");
        mkdir(&[&assets_dir, &jni_libs_dir], self.options.parents())?;
        let sdl_java_dir = self
            .config
            .root_dir
            .join("third_party")
            .join("sdl2")
            .join("android-project")
            .join("src");
        if sdl_java_dir.is_dir() {
            log::info!("Copying thirdparty Java files");
            copy_directory_contents(&sdl_java_dir, &java_src_dir, self.options.force())?;
        } else {
            log::warn!(
                "Thirdparty Java sources not found in {}",
                sdl_java_dir.display()
            );
        }
        self.write_local_properties()?;
        if self.config.build_type == BuildType::Debug {
            match self.env.android_ndk_home() {
                Some(ndk) => {
                    let layers_dir = ndk
                        .join("sources")
                        .join("third_party")
                        .join("vulkan")
                        .join("src")
                        .join("build-android")
                        .join("jniLibs");
                    if layers_dir.is_dir() {
                        log::info!("Copying Vulkan validation layers");
                        copy_directory_contents(&layers_dir, &jni_libs_dir, self.options.force())?;
                    } else {
                        log::warn!(
                            "Vulkan validation layers not found in {}. NDK r12 or later is required",
                            layers_dir.display()
                        );
                    }
                }
                None => log::warn!(
                    "Skipping Vulkan validation layers: ANDROID_NDK_HOME is not set"
                ),
            }
        }
        Ok(())
    }

    /// Points Gradle to the SDK and NDK found in the environment.
    fn write_local_properties(&self) -> Result<(), GeneratorError> {
        let entries = [
            ("sdk.dir", self.env.android_sdk_home()),
            ("ndk.dir", self.env.android_ndk_home()),
        ];
        let content = entries
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_ref()
                    .map(|path| format!("{}={}\n", key, escape_property(path)))
            })
            .collect::<String>();
        if content.is_empty() {
            log::warn!("ANDROID_HOME is not set, Gradle will look for the SDK on its own");
        } else if !self.options.noop {
            fs::write(self.build_dir.join("local.properties"), content)?;
        }
        Ok(())
    }

    /// The shell command building the project.
    pub fn build_command(&self) -> String {
        if self.config.platform == Platform::Android {
            let gradle = if cfg!(windows) {
                "gradlew.bat"
            } else {
                "gradlew"
            };
            format!(
                "{} assemble{}",
                quote(&self.build_dir.join(gradle)),
                self.config.build_type
            )
        } else {
            let cmake = which("cmake", &self.env)
                .map(|path| quote(&path))
                .unwrap_or_else(|| "cmake".to_string());
            let generator = if self.config.platform == Platform::Ios {
                " -G Xcode"
            } else {
                ""
            };
            format!(
                "{cmake} -S {root} -B {build}{generator} {args} && {cmake} --build {build}",
                cmake = cmake,
                root = quote(&self.config.root_dir),
                build = quote(&self.build_dir),
                generator = generator,
                args = self.cmake_arguments(),
            )
        }
    }

    /// Writes the build script in the build directory, replacing any existing one, and makes it
    /// executable.
    pub fn write_build_script(&self) -> Result<PathBuf, GeneratorError> {
        log::info!("Creating build script");
        let (name, header) = if cfg!(windows) {
            ("build.bat", "@echo off\r\nREM")
        } else {
            ("build.sh", "#!/bin/sh\n#")
        };
        let newline = if cfg!(windows) { "\r\n" } else { "\n" };
        let script = self.build_dir.join(name);
        if self.options.noop {
            return Ok(script);
        }
        if script.exists() {
            fs::remove_file(&script)?;
        }
        let content = format!(
            "{} File generated by enginegen. Do not modify it.{nl}{}{nl}",
            header,
            self.build_command(),
            nl = newline
        );
        fs::write(&script, content)?;
        chmod(&Mode::parse("u+x")?, &[&script], self.options)?;
        Ok(script)
    }
}

/// Inserts `key`, or replaces its value in place if already present.
fn upsert(list: &mut Vec<(String, String)>, key: &str, value: &str) {
    match list.iter_mut().find(|(k, _)| k == key) {
        Some((_, v)) => *v = value.to_string(),
        None => list.push((key.to_string(), value.to_string())),
    }
}

fn render_definitions(definitions: &[(String, String)]) -> String {
    definitions
        .iter()
        .map(|(key, value)| format!("-D{}='{}'", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

// Java properties treat `\` as escape and `:` as separator
fn escape_property(path: &Path) -> String {
    path.display()
        .to_string()
        .replace('\\', "\\\\")
        .replace(':', "\\:")
}
