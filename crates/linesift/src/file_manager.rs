use anyhow::Result;
use directories::BaseDirs;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A command-line argument resolved to a file that can be sifted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub size: u64,
    pub is_readonly: bool,
}

pub struct FileManager {
    large_file_warning_bytes: u64,
}

impl FileManager {
    pub fn new(large_file_warning_bytes: u64) -> Self {
        Self {
            large_file_warning_bytes,
        }
    }

    /// Expand `~`, then check that the argument names a regular file.
    pub async fn resolve(&self, raw: &str) -> Result<ResolvedFile> {
        let path = expand_tilde(raw);

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                let error_msg = match e.kind() {
                    std::io::ErrorKind::NotFound => {
                        format!("File not found: {}", path.display())
                    }
                    std::io::ErrorKind::PermissionDenied => {
                        format!("Permission denied: {}", path.display())
                    }
                    _ => format!("Cannot read {}: {}", path.display(), e),
                };
                return Err(anyhow::anyhow!(error_msg));
            }
        };

        if !metadata.is_file() {
            return Err(anyhow::anyhow!("Not a regular file: {}", path.display()));
        }

        let size = metadata.len();
        if size > self.large_file_warning_bytes {
            log::warn!(
                "Large file detected ({} bytes): {}; indexing may take a while",
                size,
                path.display()
            );
        }

        let is_readonly = metadata.permissions().readonly();
        if is_readonly {
            log::warn!(
                "{} is read-only; marked lines can only be removed if its directory is writable",
                path.display()
            );
        }

        log::info!("Resolved {} ({} bytes)", path.display(), size);
        Ok(ResolvedFile {
            path,
            size,
            is_readonly,
        })
    }

    pub fn is_large(&self, file: &ResolvedFile) -> bool {
        file.size > self.large_file_warning_bytes
    }
}

/// `~` and `~/...` are resolved against the user's home directory. Anything
/// else, including `~user`, is taken literally.
pub fn expand_tilde(raw: &str) -> PathBuf {
    let home = || BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    if raw == "~" {
        if let Some(home) = home() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = home() {
            return home.join(rest);
        }
    }
    Path::new(raw).to_path_buf()
}

/// Short name for status lines: the file name, or the whole path if it has none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[tokio::test]
    async fn test_resolve_regular_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "echo hello").unwrap();

        let fm = FileManager::new(1024);
        let resolved = fm
            .resolve(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(resolved.path, temp_file.path());
        assert_eq!(resolved.size, 11);
        assert!(!fm.is_large(&resolved));
    }

    #[tokio::test]
    async fn test_resolve_flags_large_files() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", "x".repeat(64)).unwrap();

        let fm = FileManager::new(16);
        let resolved = fm
            .resolve(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert!(fm.is_large(&resolved));
    }

    #[tokio::test]
    async fn test_resolve_rejects_missing_and_directories() {
        let dir = TempDir::new().unwrap();
        let fm = FileManager::new(1024);

        let missing = dir.path().join("nope.txt");
        let err = fm.resolve(missing.to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("File not found"));

        let err = fm.resolve(dir.path().to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("Not a regular file"));
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/tmp/a"), PathBuf::from("/tmp/a"));
        assert_eq!(expand_tilde("~user/a"), PathBuf::from("~user/a"));
        if let Some(dirs) = BaseDirs::new() {
            assert_eq!(expand_tilde("~"), dirs.home_dir());
            assert_eq!(
                expand_tilde("~/.bash_history"),
                dirs.home_dir().join(".bash_history")
            );
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/home/u/.zsh_history")), ".zsh_history");
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
