use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::RngCore;
use tokio::{fs::File, io::AsyncWriteExt};

use crate::model::user::DEFAULT_IMAGE_FILE;

/// Profile pictures on local disk, served under `/static/profile_pics`.
#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
}

impl StorageService {
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create storage dir at {}", root.display()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` under a random 16-hex-digit name, keeping a cleaned
    /// version of the original extension. Returns the stored file name.
    pub async fn save_picture(&self, bytes: &[u8], original_name: Option<&str>) -> Result<String> {
        let ext = original_name
            .and_then(|name| Path::new(name).extension().and_then(|e| e.to_str()))
            .and_then(clean_extension);

        let stem = random_hex();
        let filename = match ext {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        };

        let path = self.root.join(&filename);

        let mut file = File::create(&path)
            .await
            .with_context(|| format!("Failed to create file {}", path.display()))?;

        file.write_all(bytes)
            .await
            .with_context(|| format!("Failed to write file {}", path.display()))?;

        Ok(filename)
    }

    /// Deletes a previously stored picture. The shared default image and
    /// names that are not plain file names are left alone.
    pub async fn remove_picture(&self, filename: &str) -> Result<()> {
        if filename == DEFAULT_IMAGE_FILE || !is_plain_file_name(filename) {
            return Ok(());
        }
        let path = self.root.join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}

fn random_hex() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

fn clean_extension(ext: &str) -> Option<String> {
    let filtered: String = ext.chars().filter(|c| c.is_ascii_alphanumeric()).collect();

    if filtered.is_empty() {
        None
    } else {
        Some(filtered.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saves_with_random_name_and_clean_extension() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path().join("pics")).await.unwrap();

        let name = storage.save_picture(b"img", Some("Me.J$PG")).await.unwrap();
        let (stem, ext) = name.split_once('.').unwrap();
        assert_eq!(stem.len(), 16);
        assert_eq!(ext, "jpg");
        assert_eq!(tokio::fs::read(storage.root().join(&name)).await.unwrap(), b"img");

        storage.remove_picture(&name).await.unwrap();
        assert!(!storage.root().join(&name).exists());
        storage.remove_picture(&name).await.unwrap();
    }

    #[tokio::test]
    async fn never_removes_default_or_paths() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path()).await.unwrap();
        tokio::fs::write(dir.path().join(DEFAULT_IMAGE_FILE), b"x").await.unwrap();

        storage.remove_picture(DEFAULT_IMAGE_FILE).await.unwrap();
        storage.remove_picture("../etc").await.unwrap();
        assert!(dir.path().join(DEFAULT_IMAGE_FILE).exists());
    }
}
