//! Output path selection and atomic writes for encrypt/decrypt results.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use cvault_core::config::FilesConfig;
use cvault_core::naming;

/// Appended when decrypting a file that does not carry the encrypted suffix,
/// so the input is never the output.
const DECRYPTED_FALLBACK_SUFFIX: &str = ".decrypted";

/// Default destination for `cvault encrypt <input>`.
pub fn encrypt_target(files: &FilesConfig, input: &Path) -> Result<PathBuf> {
    let name = file_name(input)?;
    let out_name = naming::encrypted_name(&name, &files.encrypted_suffix);
    Ok(output_dir(files, input).join(out_name))
}

/// Default destination for `cvault decrypt <input>`.
pub fn decrypt_target(files: &FilesConfig, input: &Path) -> Result<PathBuf> {
    let name = file_name(input)?;
    let out_name = match naming::decrypted_name(&name, &files.encrypted_suffix) {
        Some(original) => original.to_string(),
        None => {
            tracing::warn!(
                input = %input.display(),
                suffix = %files.encrypted_suffix,
                "input does not carry the encrypted suffix"
            );
            format!("{name}{DECRYPTED_FALLBACK_SUFFIX}")
        }
    };
    Ok(output_dir(files, input).join(out_name))
}

fn file_name(input: &Path) -> Result<String> {
    input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .with_context(|| format!("path has no file name: {}", input.display()))
}

fn output_dir(files: &FilesConfig, input: &Path) -> PathBuf {
    files
        .output_dir
        .clone()
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Write `data` to `dest` via a sibling temp file and rename.
///
/// Nothing appears at `dest` unless the whole buffer was written, and the
/// temp file never outlives a failed call. Without `overwrite`, a file that
/// shows up at `dest` between the existence check and the final step is
/// left untouched.
pub async fn write_atomic(dest: &Path, data: &[u8], overwrite: bool) -> Result<()> {
    if !overwrite && tokio::fs::try_exists(dest).await.unwrap_or(false) {
        return Err(output_exists(dest));
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating dir: {}", parent.display()))?;
    }

    let tmp = tmp_path(dest);
    if let Err(e) = tokio::fs::write(&tmp, data).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e).with_context(|| format!("writing tmp: {}", tmp.display()));
    }

    if overwrite {
        if let Err(e) = tokio::fs::rename(&tmp, dest).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e).with_context(|| format!("renaming to: {}", dest.display()));
        }
        Ok(())
    } else {
        publish_new(&tmp, dest).await
    }
}

/// Move `tmp` to `dest` only if `dest` does not exist.
///
/// `hard_link` fails with `AlreadyExists` instead of replacing the target.
/// Filesystems without hard links fall back to check-then-rename.
async fn publish_new(tmp: &Path, dest: &Path) -> Result<()> {
    match tokio::fs::hard_link(tmp, dest).await {
        Ok(()) => {
            if let Err(e) = tokio::fs::remove_file(tmp).await {
                tracing::warn!(tmp = %tmp.display(), "could not remove temp file: {e}");
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            let _ = tokio::fs::remove_file(tmp).await;
            Err(output_exists(dest))
        }
        Err(e) => {
            tracing::debug!(dest = %dest.display(), "hard link unavailable ({e}), renaming");
            if tokio::fs::try_exists(dest).await.unwrap_or(false) {
                let _ = tokio::fs::remove_file(tmp).await;
                return Err(output_exists(dest));
            }
            if let Err(e) = tokio::fs::rename(tmp, dest).await {
                let _ = tokio::fs::remove_file(tmp).await;
                return Err(e).with_context(|| format!("renaming to: {}", dest.display()));
            }
            Ok(())
        }
    }
}

fn output_exists(dest: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "output exists: {} (use --force or set files.overwrite = true)",
        dest.display()
    )
}

fn tmp_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".cvault_tmp");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files() -> FilesConfig {
        FilesConfig::default()
    }

    #[test]
    fn test_encrypt_target_next_to_input() {
        let out = encrypt_target(&files(), Path::new("/data/report.pdf")).unwrap();
        assert_eq!(out, PathBuf::from("/data/report.pdf.encrypted"));
    }

    #[test]
    fn test_encrypt_target_output_dir() {
        let cfg = FilesConfig {
            output_dir: Some(PathBuf::from("/vault")),
            ..FilesConfig::default()
        };
        let out = encrypt_target(&cfg, Path::new("/data/report.pdf")).unwrap();
        assert_eq!(out, PathBuf::from("/vault/report.pdf.encrypted"));
    }

    #[test]
    fn test_decrypt_target_strips_suffix() {
        let out = decrypt_target(&files(), Path::new("/data/report.pdf.encrypted")).unwrap();
        assert_eq!(out, PathBuf::from("/data/report.pdf"));
    }

    #[test]
    fn test_decrypt_target_without_suffix() {
        let out = decrypt_target(&files(), Path::new("blob.bin")).unwrap();
        assert_eq!(out, PathBuf::from("blob.bin.decrypted"));
    }

    #[test]
    fn test_relative_input_without_parent() {
        let out = encrypt_target(&files(), Path::new("notes.txt")).unwrap();
        assert_eq!(out, PathBuf::from("notes.txt.encrypted"));
    }

    #[test]
    fn test_no_file_name() {
        assert!(encrypt_target(&files(), Path::new("/")).is_err());
    }

    #[tokio::test]
    async fn test_write_atomic_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/out.bin");

        write_atomic(&dest, b"payload", false).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
        assert!(!tmp_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_write_atomic_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        std::fs::write(&dest, b"original").unwrap();

        let err = write_atomic(&dest, b"new", false).await.unwrap_err();
        assert!(err.to_string().contains("output exists"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"original");

        write_atomic(&dest, b"new", true).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
        assert!(!tmp_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_publish_new_keeps_file_created_after_check() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let tmp = tmp_path(&dest);
        std::fs::write(&tmp, b"ours").unwrap();
        // Another writer lands first
        std::fs::write(&dest, b"theirs").unwrap();

        let err = publish_new(&tmp, &dest).await.unwrap_err();
        assert!(err.to_string().contains("output exists"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"theirs");
        assert!(!tmp.exists());
    }

    #[tokio::test]
    async fn test_publish_new_moves_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let tmp = tmp_path(&dest);
        std::fs::write(&tmp, b"ours").unwrap();

        publish_new(&tmp, &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"ours");
        assert!(!tmp.exists());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_write_failure_removes_tmp() {
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let tmp = tmp_path(&dest);
        // Writes through the link fail with ENOSPC
        std::os::unix::fs::symlink(full, &tmp).unwrap();

        let err = write_atomic(&dest, b"payload", false).await.unwrap_err();
        assert!(err.to_string().contains("writing tmp"));
        assert!(std::fs::symlink_metadata(&tmp).is_err());
        assert!(!dest.exists());
    }
}
