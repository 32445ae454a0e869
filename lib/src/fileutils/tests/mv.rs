use crate::fileutils::mv::move_by_copy;
use crate::fileutils::{mv, Options};
use std::error::Error;
use std::fs;
use std::io::ErrorKind;
use tempfile::tempdir;

#[test]
fn mv_rename_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let src = dir.path().join("a.txt");
    let dst = dir.path().join("b.txt");
    fs::write(&src, "hello")?;
    mv(&src, &dst, Options::new())?;
    assert!(!src.exists());
    assert_eq!(fs::read_to_string(dst)?, "hello");
    Ok(())
}

#[test]
fn mv_into_directory() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let src = dir.path().join("MainActivity.java");
    let package = dir.path().join("com").join("example");
    fs::write(&src, "class MainActivity {}")?;
    fs::create_dir_all(&package)?;
    mv(&src, &package, Options::new())?;
    assert!(package.join("MainActivity.java").is_file());
    Ok(())
}

#[test]
fn mv_force_over_existing_file_in_directory() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let src = dir.path().join("a.txt");
    let out = dir.path().join("out");
    fs::write(&src, "new")?;
    fs::create_dir(&out)?;
    fs::write(out.join("a.txt"), "old")?;
    mv(&src, &out, Options::new().force())?;
    assert_eq!(fs::read_to_string(out.join("a.txt"))?, "new");
    Ok(())
}

#[test]
fn mv_directory() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let src = dir.path().join("VulkanSDK");
    fs::create_dir_all(src.join("1.3.250").join("bin"))?;
    let dst = dir.path().join("VulkanSDK_TMP");
    mv(&src, &dst, Options::new())?;
    assert!(!src.exists());
    assert!(dst.join("1.3.250").join("bin").is_dir());
    Ok(())
}

#[test]
fn mv_onto_non_empty_directory() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let src = dir.path().join("data");
    let out = dir.path().join("out");
    fs::create_dir(&src)?;
    fs::create_dir_all(out.join("data"))?;
    fs::write(out.join("data").join("keep.txt"), "keep")?;
    let err = mv(&src, &out, Options::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert!(src.is_dir());
    Ok(())
}

#[test]
fn mv_missing_source() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let err = mv(dir.path().join("nope"), dir.path().join("b"), Options::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

#[test]
fn mv_force_onto_itself() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let src = dir.path().join("a.txt");
    fs::write(&src, "precious")?;
    let err = mv(&src, &src, Options::new().force()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(fs::read_to_string(&src)?, "precious");
    Ok(())
}

#[cfg(unix)]
#[test]
fn move_by_copy_file_preserves() -> Result<(), Box<dyn Error>> {
    use std::os::unix::fs::PermissionsExt;
    use std::time::{Duration, SystemTime};
    let dir = tempdir()?;
    let src = dir.path().join("build.sh");
    let dst = dir.path().join("moved.sh");
    fs::write(&src, "#!/bin/sh")?;
    fs::set_permissions(&src, fs::Permissions::from_mode(0o750))?;
    let past = SystemTime::now() - Duration::from_secs(3600 * 24);
    fs::File::open(&src)?.set_modified(past)?;
    move_by_copy(&src, &dst)?;
    assert!(!src.exists());
    let metadata = fs::metadata(&dst)?;
    assert_eq!(metadata.permissions().mode() & 0o777, 0o750);
    let delta = metadata
        .modified()?
        .duration_since(past)
        .unwrap_or_else(|e| e.duration());
    assert!(delta < Duration::from_secs(1));
    Ok(())
}

#[test]
fn move_by_copy_tree() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let src = dir.path().join("VulkanSDK");
    let dst = dir.path().join("VulkanSDK_TMP");
    fs::create_dir_all(src.join("1.3.250").join("bin"))?;
    fs::write(src.join("1.3.250").join("bin").join("glslc"), "elf")?;
    move_by_copy(&src, &dst)?;
    assert!(!src.exists());
    assert_eq!(
        fs::read_to_string(dst.join("1.3.250").join("bin").join("glslc"))?,
        "elf"
    );
    Ok(())
}
