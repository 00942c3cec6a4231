//! Release archive extraction and binary replacement.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;

const EXECUTABLE_PREFIX: &str = "deploy";

/// Extract the first archive entry whose file name starts with `deploy`.
pub fn unzip_executable(archive_path: &Path, dest: &Path) -> anyhow::Result<PathBuf> {
    let file = File::open(archive_path)
        .with_context(|| format!("Can't open zip file {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Can't open zip file {}", archive_path.display()))?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }

        let Some(file_name) = Path::new(entry.name())
            .file_name()
            .map(|n| n.to_os_string())
        else {
            continue;
        };
        if !file_name.to_string_lossy().starts_with(EXECUTABLE_PREFIX) {
            continue;
        }

        let out_path = dest.join(&file_name);
        let mut out = File::create(&out_path)
            .with_context(|| format!("Failed to create {}", out_path.display()))?;
        let copied = std::io::copy(&mut entry, &mut out)
            .with_context(|| format!("Can't read zip entry {}", entry.name()))?;
        if copied != entry.size() {
            anyhow::bail!("Zip entry {} is corrupted", entry.name());
        }
        return Ok(out_path);
    }

    anyhow::bail!(
        "No deploy executable is found in {}",
        archive_path.display()
    )
}

/// Atomically swap `target` for `new_exe`.
///
/// The new binary is staged next to the target so the final rename stays on
/// one filesystem.
pub fn replace_executable(new_exe: &Path, target: &Path) -> anyhow::Result<()> {
    let dir = target
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Executable path has no parent: {}", target.display()))?;
    let staged = dir.join(format!(".{}.new", EXECUTABLE_PREFIX));

    std::fs::copy(new_exe, &staged)
        .with_context(|| format!("Failed to stage update at {}", staged.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&staged, std::fs::Permissions::from_mode(0o755))
            .with_context(|| format!("Failed to mark {} executable", staged.display()))?;
    }

    std::fs::rename(&staged, target)
        .with_context(|| format!("Failed to replace {}", target.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn extracts_deploy_binary() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("deploy_0.2.0_linux_amd64.zip");
        write_zip(
            &archive,
            &[("README.md", b"docs"), ("dist/deploy", b"#!/bin/sh\necho new\n")],
        );

        let out = TempDir::new().unwrap();
        let exe = unzip_executable(&archive, out.path()).unwrap();
        assert_eq!(exe, out.path().join("deploy"));
        assert_eq!(std::fs::read(&exe).unwrap(), b"#!/bin/sh\necho new\n");
    }

    #[test]
    fn missing_binary_errors() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("release.zip");
        write_zip(&archive, &[("README.md", b"docs")]);

        let err = unzip_executable(&archive, temp.path()).unwrap_err();
        assert!(err.to_string().contains("No deploy executable"));
    }

    #[test]
    fn replaces_target() {
        let temp = TempDir::new().unwrap();
        let new_exe = temp.path().join("downloaded");
        let target = temp.path().join("bin").join("deploy");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&new_exe, b"new").unwrap();
        std::fs::write(&target, b"old").unwrap();

        replace_executable(&new_exe, &target).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        assert!(!target.parent().unwrap().join(".deploy.new").exists());
    }
}
