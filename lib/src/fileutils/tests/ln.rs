use crate::fileutils::{ln, Options};
use std::error::Error;
use std::fs;
use std::io::ErrorKind;
use tempfile::tempdir;

#[test]
fn ln_hard() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let src = dir.path().join("a.txt");
    let dst = dir.path().join("b.txt");
    fs::write(&src, "hello")?;
    ln(&src, &dst, Options::new())?;
    fs::write(&src, "changed")?;
    assert_eq!(fs::read_to_string(&dst)?, "changed");
    Ok(())
}

#[test]
fn ln_existing_needs_force() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let src = dir.path().join("a.txt");
    let dst = dir.path().join("b.txt");
    fs::write(&src, "new")?;
    fs::write(&dst, "old")?;
    let err = ln(&src, &dst, Options::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    ln(&src, &dst, Options::new().force())?;
    assert_eq!(fs::read_to_string(&dst)?, "new");
    Ok(())
}

#[cfg(unix)]
#[test]
fn ln_symbolic_relative_and_dangling() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let link = dir.path().join("link");
    ln("missing.txt", &link, Options::new().symbolic())?;
    assert!(fs::symlink_metadata(&link)?.file_type().is_symlink());
    assert!(!link.exists());
    fs::write(dir.path().join("missing.txt"), "now here")?;
    assert_eq!(fs::read_to_string(&link)?, "now here");
    Ok(())
}

#[cfg(unix)]
#[test]
fn ln_symbolic_into_directory() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let target = dir.path().join("shaders");
    let out = dir.path().join("out");
    fs::create_dir(&target)?;
    fs::create_dir(&out)?;
    ln(&target, &out, Options::new().symbolic())?;
    assert_eq!(fs::read_link(out.join("shaders"))?, target);
    Ok(())
}

#[cfg(unix)]
#[test]
fn ln_force_replaces_directory_link() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    let link = dir.path().join("current");
    fs::create_dir(&first)?;
    fs::create_dir(&second)?;
    ln(&first, &link, Options::new().symbolic())?;
    ln(&second, &link, Options::new().symbolic().force())?;
    assert_eq!(fs::read_link(&link)?, second);
    assert!(!first.join("second").exists());
    Ok(())
}

#[test]
fn ln_force_onto_itself_keeps_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let src = dir.path().join("a.txt");
    fs::write(&src, "precious")?;
    let err = ln(&src, &src, Options::new().force()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    let link = dir.path().join("b.txt");
    ln(&src, &link, Options::new())?;
    if cfg!(unix) {
        assert!(ln(&src, &link, Options::new().force()).is_err());
    }
    assert_eq!(fs::read_to_string(&src)?, "precious");
    Ok(())
}
