use clap::{Parser, Subcommand};
use console::style;
use enginegen::data::{progress_percent, DEFAULT_GLSL_STD};
use enginegen::fileutils::{chmod, cp, ln, mkdir, mv, rm, rmdir, which, Mode, Options};
use enginegen::{
    host_platforms, normalize_sdk_layout, process_data, BuildType, Environment, Generator,
    GeneratorConfig, Platform,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::path::PathBuf;

macro_rules! error(
    ($msg: expr, $cause: expr) => {
        eprintln!("{}: {}. {}", style("Error").bold().red(), $msg, $cause)
    }
);

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Print the equivalent shell command of each file operation.
    #[clap(short, long, global = true)]
    verbose: bool,
    /// Print the file operations without executing them.
    #[clap(short = 'n', long = "dry-run", global = true)]
    dry_run: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the build directory of the application for a platform.
    Generate {
        /// The application name.
        #[clap(long)]
        name: String,
        /// The application package, for example com.example.game.
        #[clap(long)]
        package: String,
        /// The target platform (windows, linux, macosx, ios, android).
        #[clap(long)]
        platform: Option<Platform>,
        /// The build type (Release or Debug).
        #[clap(long = "build-type", default_value = "Debug")]
        build_type: BuildType,
        /// Additional CMake definitions.
        #[clap(long = "cmake-args", value_name = "CMAKE_ARG=VALUE", num_args = 0..)]
        cmake_args: Vec<String>,
        /// The engine root directory.
        #[clap(long, default_value = ".")]
        root: PathBuf,
    },
    /// Copy the engine data to the output folder and list the shaders to compile.
    ProcessData {
        input: PathBuf,
        output: PathBuf,
        /// GLSL standard passed to the shader compiler.
        #[clap(long, default_value = DEFAULT_GLSL_STD)]
        std: String,
    },
    /// Move the extracted Vulkan SDK out of its versioned folder.
    SdkLayout { output_dir: PathBuf },
    /// Copy a file or a directory.
    Cp {
        src: PathBuf,
        dst: PathBuf,
        #[clap(short = 'r', short_alias = 'R')]
        recursive: bool,
        #[clap(short)]
        force: bool,
        /// Preserve permissions and modification times.
        #[clap(short)]
        preserve: bool,
        /// Follow symbolic links.
        #[clap(short = 'L')]
        dereference: bool,
    },
    /// Move or rename a file or a directory.
    Mv {
        src: PathBuf,
        dst: PathBuf,
        #[clap(short)]
        force: bool,
    },
    /// Remove files and directories.
    Rm {
        #[clap(required = true)]
        paths: Vec<PathBuf>,
        #[clap(short = 'r', short_alias = 'R')]
        recursive: bool,
        #[clap(short)]
        force: bool,
    },
    /// Remove empty directories.
    Rmdir {
        #[clap(required = true)]
        paths: Vec<PathBuf>,
        /// Remove the ancestors too.
        #[clap(short)]
        parents: bool,
    },
    /// Create directories.
    Mkdir {
        #[clap(required = true)]
        paths: Vec<PathBuf>,
        /// Create the missing ancestors too.
        #[clap(short)]
        parents: bool,
    },
    /// Change the permissions of files and directories.
    Chmod {
        /// Octal (755) or symbolic (u+x,go-w) mode.
        mode: String,
        #[clap(required = true)]
        paths: Vec<PathBuf>,
        #[clap(short = 'R')]
        recursive: bool,
    },
    /// Create a link.
    Ln {
        src: PathBuf,
        dst: PathBuf,
        /// Create a symbolic link instead of a hard link.
        #[clap(short)]
        symbolic: bool,
        #[clap(short)]
        force: bool,
    },
    /// Locate an executable in PATH.
    Which { program: String },
}

fn main() {
    let args = Args::parse();
    let default_filter = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    let mut options = Options::new();
    if args.verbose {
        options = options.verbose();
    }
    if args.dry_run {
        options = options.noop();
    }
    let env = Environment::capture();
    let result: Result<(), (&str, Box<dyn Error>)> = match args.command {
        Command::Generate {
            name,
            package,
            platform,
            build_type,
            cmake_args,
            root,
        } => {
            let platform = platform.or_else(|| host_platforms().first().copied());
            match platform {
                Some(platform) => {
                    let config = GeneratorConfig {
                        name,
                        package,
                        platform,
                        build_type,
                        cmake_args,
                        root_dir: root,
                    };
                    generate(config, env, options).map_err(|e| ("Failed to generate project", e))
                }
                None => Err((
                    "Failed to generate project",
                    "no platform available on this host".into(),
                )),
            }
        }
        Command::ProcessData { input, output, std } => {
            data(input, output, &std, &env, options).map_err(|e| ("Failed to process data", e))
        }
        Command::SdkLayout { output_dir } => sdk_layout(output_dir, options)
            .map_err(|e| ("Failed to normalize the Vulkan SDK", e)),
        Command::Cp {
            src,
            dst,
            recursive,
            force,
            preserve,
            dereference,
        } => {
            let options = enable(options, recursive, Options::recursive);
            let options = enable(options, force, Options::force);
            let options = enable(options, preserve, Options::preserve);
            let options = enable(options, dereference, Options::dereference);
            cp(src, dst, options).map_err(|e| ("Failed to copy", e.into()))
        }
        Command::Mv { src, dst, force } => mv(src, dst, enable(options, force, Options::force))
            .map_err(|e| ("Failed to move", e.into())),
        Command::Rm {
            paths,
            recursive,
            force,
        } => {
            let options = enable(options, recursive, Options::recursive);
            rm(&paths, enable(options, force, Options::force))
                .map_err(|e| ("Failed to remove", e.into()))
        }
        Command::Rmdir { paths, parents } => {
            rmdir(&paths, enable(options, parents, Options::parents))
                .map_err(|e| ("Failed to remove directory", e.into()))
        }
        Command::Mkdir { paths, parents } => {
            mkdir(&paths, enable(options, parents, Options::parents))
                .map_err(|e| ("Failed to create directory", e.into()))
        }
        Command::Chmod {
            mode,
            paths,
            recursive,
        } => change_mode(&mode, &paths, enable(options, recursive, Options::recursive))
            .map_err(|e| ("Failed to change mode", e)),
        Command::Ln {
            src,
            dst,
            symbolic,
            force,
        } => {
            let options = enable(options, symbolic, Options::symbolic);
            ln(src, dst, enable(options, force, Options::force))
                .map_err(|e| ("Failed to link", e.into()))
        }
        Command::Which { program } => match which(&program, &env) {
            Some(path) => {
                println!("{}", path.display());
                Ok(())
            }
            None => Err(("Command not found", program.into())),
        },
    };
    if let Err((msg, cause)) = result {
        error!(msg, cause);
        std::process::exit(1);
    }
}

fn enable(options: Options, flag: bool, set: fn(Options) -> Options) -> Options {
    if flag {
        set(options)
    } else {
        options
    }
}

fn generate(
    config: GeneratorConfig,
    env: Environment,
    options: Options,
) -> Result<(), Box<dyn Error>> {
    let generator = Generator::new(config, env)?.with_options(options);
    let separator = "==================================================";
    println!("{}", separator);
    println!("Parameters:");
    for (name, value) in generator.parameters() {
        println!("    - {}: {}", name, value);
    }
    println!();
    println!("{}", separator);
    let script = generator.run_with_steps(|index, total, what| {
        let counter = format!("[{}/{}]", index, total);
        println!("{} {}...", style(counter).bold().dim(), what);
    })?;
    println!("{} {}", style("Done!").bold().green(), script.display());
    Ok(())
}

fn data(
    input: PathBuf,
    output: PathBuf,
    std: &str,
    env: &Environment,
    options: Options,
) -> Result<(), Box<dyn Error>> {
    println!("{} Copying engine data...", style("[1/2]").bold().dim());
    let plan = process_data(input, output, env, options.force())?;
    let compiler = plan
        .compiler
        .ok_or("glslc not found. Is the Vulkan SDK installed?")?;
    println!("{} Listing shaders...", style("[2/2]").bold().dim());
    let pb = ProgressBar::new(plan.jobs.len() as u64);
    let bar_style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>4}/{len:4}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(bar_style);
    let total = plan.jobs.len();
    for (index, job) in plan.jobs.iter().enumerate() {
        pb.println(format!(
            "[{:>3}%] {}",
            progress_percent(index + 1, total),
            job.command_line(&compiler, std)
        ));
        pb.inc(1);
    }
    pb.finish_and_clear();
    println!("{}", style("Done!").bold().green());
    Ok(())
}

fn sdk_layout(output_dir: PathBuf, options: Options) -> Result<(), Box<dyn Error>> {
    let info = normalize_sdk_layout(output_dir, options)?;
    println!(
        "{} Vulkan SDK {} in {}",
        style("Done!").bold().green(),
        info.version,
        info.location.display()
    );
    Ok(())
}

fn change_mode(mode: &str, paths: &[PathBuf], options: Options) -> Result<(), Box<dyn Error>> {
    let mode = Mode::parse(mode)?;
    chmod(&mode, paths, options)?;
    Ok(())
}
