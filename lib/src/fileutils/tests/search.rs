use crate::fileutils::{find_in, glob, join, which};
use crate::Environment;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn make_executable(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::write(path, "#!/bin/sh\n")?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}

#[test]
fn which_searches_path_in_order() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    fs::create_dir(&first)?;
    fs::create_dir(&second)?;
    let name = if cfg!(windows) { "tool.exe" } else { "tool" };
    make_executable(&second.join(name))?;
    let env = Environment::new().with("PATH", std::env::join_paths([&first, &second])?);
    assert_eq!(which("tool", &env), Some(second.join(name)));
    make_executable(&first.join(name))?;
    assert_eq!(which("tool", &env), Some(first.join(name)));
    assert_eq!(which("other", &env), None);
    Ok(())
}

#[cfg(unix)]
#[test]
fn which_ignores_non_executable() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("cmake"), "")?;
    let env = Environment::new().with("PATH", dir.path());
    assert_eq!(which("cmake", &env), None);
    Ok(())
}

#[test]
fn which_explicit_path() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let tool = dir.path().join(if cfg!(windows) { "tool.exe" } else { "tool" });
    make_executable(&tool)?;
    assert_eq!(which(&tool, &Environment::new()), Some(tool.clone()));
    Ok(())
}

#[test]
fn find_in_directories() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    make_executable(&dir.path().join("glslc"))?;
    let dirs = [dir.path().join("missing"), dir.path().to_path_buf()];
    assert_eq!(find_in("glslc", &dirs), Some(dir.path().join("glslc")));
    Ok(())
}

#[test]
fn glob_sorted() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    for version in ["1.3.250", "1.2.198", "1.3.204"] {
        fs::create_dir(dir.path().join(version))?;
    }
    fs::write(dir.path().join("readme"), "")?;
    let pattern = format!("{}/1.*", dir.path().display());
    let matches = glob(&pattern)?;
    let names = matches
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["1.2.198", "1.3.204", "1.3.250"]);
    assert!(glob("[").is_err());
    Ok(())
}

#[test]
fn join_parts() {
    let joined = join(["build", "android", "jniLibs"]);
    assert_eq!(joined, PathBuf::from("build").join("android").join("jniLibs"));
}
