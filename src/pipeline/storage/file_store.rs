use std::path::{Component, PathBuf};

use uuid::Uuid;

use super::StorageError;
use crate::pipeline::extraction::{file_extension, sanitize_filename};

const URL_SCHEME: &str = "file://";

/// Where uploaded report files end up. Returns a URL the report row points at.
pub trait FileStore {
    fn store(&self, user_id: &Uuid, file_name: &str, bytes: &[u8]) -> Result<String, StorageError>;

    /// Remove a previously stored file (used to roll back a failed save).
    fn remove(&self, file_url: &str) -> Result<(), StorageError>;
}

/// Filesystem store laid out as `<root>/<user_id>/<unix_millis>-<id>.<ext>`.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a `file://` URL to a stored file. Only `<root>/<user_id>/<file>`
    /// is accepted; `..` or any other shape is refused.
    fn path_from_url(&self, file_url: &str) -> Result<PathBuf, StorageError> {
        let invalid = || StorageError::InvalidLocation(file_url.to_string());

        let path = file_url
            .strip_prefix(URL_SCHEME)
            .map(PathBuf::from)
            .ok_or_else(invalid)?;
        let relative = path.strip_prefix(&self.root).map_err(|_| invalid())?;

        let components: Vec<Component<'_>> = relative.components().collect();
        match components.as_slice() {
            [Component::Normal(user_dir), Component::Normal(_)]
                if user_dir.to_str().is_some_and(|d| Uuid::parse_str(d).is_ok()) =>
            {
                Ok(path)
            }
            _ => Err(invalid()),
        }
    }
}

impl FileStore for LocalFileStore {
    fn store(&self, user_id: &Uuid, file_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let user_dir = self.root.join(user_id.to_string());
        std::fs::create_dir_all(&user_dir)?;

        let clean_name = sanitize_filename(file_name);
        let ext = file_extension(&clean_name).unwrap_or_else(|| "bin".to_string());
        let stored_name = format!(
            "{}-{}.{ext}",
            chrono::Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        );
        let path = user_dir.join(stored_name);
        std::fs::write(&path, bytes)?;

        tracing::info!(
            user_id = %user_id,
            path = %path.display(),
            size = bytes.len(),
            "Stored report file"
        );

        Ok(format!("{URL_SCHEME}{}", path.display()))
    }

    fn remove(&self, file_url: &str) -> Result<(), StorageError> {
        let path = self.path_from_url(file_url)?;
        std::fs::remove_file(&path)?;
        tracing::info!(path = %path.display(), "Removed report file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_writes_under_user_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let user_id = Uuid::new_v4();

        let url = store.store(&user_id, "Lab Results.PDF", b"%PDF-1.4").unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with(".pdf"));

        let path = store.path_from_url(&url).unwrap();
        assert!(path.starts_with(dir.path().join(user_id.to_string())));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn missing_extension_defaults_to_bin() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let url = store.store(&Uuid::new_v4(), "scan", b"data").unwrap();
        assert!(url.ends_with(".bin"));
    }

    #[test]
    fn two_uploads_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let user_id = Uuid::new_v4();
        let a = store.store(&user_id, "a.txt", b"one").unwrap();
        let b = store.store(&user_id, "a.txt", b"two").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let url = store.store(&Uuid::new_v4(), "r.txt", b"x").unwrap();
        let path = store.path_from_url(&url).unwrap();

        store.remove(&url).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn remove_outside_root_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        assert!(matches!(
            store.remove("file:///etc/passwd"),
            Err(StorageError::InvalidLocation(_))
        ));
        assert!(matches!(
            store.remove("https://example.org/x.txt"),
            Err(StorageError::InvalidLocation(_))
        ));
    }

    #[test]
    fn remove_with_parent_components_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("reports");
        std::fs::create_dir_all(&root).unwrap();
        let victim = dir.path().join("victim.txt");
        std::fs::write(&victim, b"keep me").unwrap();
        let store = LocalFileStore::new(&root);

        let escapes = [
            format!("file://{}/../victim.txt", root.display()),
            format!("file://{}/{}/../../victim.txt", root.display(), Uuid::new_v4()),
        ];
        for url in &escapes {
            assert!(
                matches!(store.remove(url), Err(StorageError::InvalidLocation(_))),
                "expected {url} to be rejected"
            );
        }
        assert!(victim.exists());
    }

    #[test]
    fn remove_requires_user_directory_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let loose = dir.path().join("loose.txt");
        std::fs::write(&loose, b"x").unwrap();

        assert!(matches!(
            store.remove(&format!("file://{}", loose.display())),
            Err(StorageError::InvalidLocation(_))
        ));
        assert!(matches!(
            store.remove(&format!("file://{}/not-a-user/r.txt", dir.path().display())),
            Err(StorageError::InvalidLocation(_))
        ));
        assert!(loose.exists());
    }
}
