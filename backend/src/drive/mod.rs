//! Remote storage: the uploader capability and the folder upload driver.
//!
//! [`StorageUploader`] is the seam to the remote side; [`DriveClient`] is the
//! Google Drive implementation. [`upload_all`] walks a local folder and
//! uploads every file, one at a time, in lexicographic order.

pub mod client;

use async_trait::async_trait;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{DriveError, DriveResult};
use crate::logs::{log_error, log_success};

pub use client::{DriveClient, DriveConfig};

/// Remote storage able to hold folders and files.
///
/// Both calls return the remote id of what was created.
#[async_trait]
pub trait StorageUploader: Send + Sync {
    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> DriveResult<String>;

    async fn upload(
        &self,
        local_path: &Path,
        remote_name: &str,
        parent_id: Option<&str>,
    ) -> DriveResult<String>;
}

/// One file sent by [`upload_all`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedFile {
    pub local_path: PathBuf,
    pub name: String,
    pub remote_id: String,
}

/// Every regular file under `root`, sorted by file name within each directory.
pub fn collect_files(root: &Path) -> DriveResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(DriveError::IoError(io::Error::new(
            io::ErrorKind::NotFound,
            format!("not a folder: {}", root.display()),
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Upload every file under `local_folder` into `parent_id`.
///
/// Files keep their own name remotely. The first failure aborts the batch;
/// files already sent stay uploaded.
pub async fn upload_all<U>(
    local_folder: &Path,
    uploader: &U,
    parent_id: Option<&str>,
) -> DriveResult<Vec<UploadedFile>>
where
    U: StorageUploader + ?Sized,
{
    let files = collect_files(local_folder)?;
    let mut uploaded = Vec::with_capacity(files.len());

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let remote_id = match uploader.upload(&path, &name, parent_id).await {
            Ok(id) => id,
            Err(e) => {
                log_error(format!("Failed to upload {}: {}", name, e));
                return Err(e);
            }
        };
        log_success(format!("Uploaded {} to Google Drive.", name));

        uploaded.push(UploadedFile {
            local_path: path,
            name,
            remote_id,
        });
    }

    Ok(uploaded)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::logs::LOG_BROADCASTER;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;
    use tokio::sync::broadcast::error::TryRecvError;

    /// In-memory uploader recording every call.
    #[derive(Default)]
    pub(crate) struct FakeUploader {
        pub folders: Mutex<Vec<(String, Option<String>)>>,
        pub uploads: Mutex<Vec<(String, Option<String>)>>,
        pub fail_on: Option<String>,
    }

    #[async_trait]
    impl StorageUploader for FakeUploader {
        async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> DriveResult<String> {
            let mut folders = self.folders.lock().unwrap();
            folders.push((name.to_string(), parent_id.map(String::from)));
            Ok(format!("folder-{}", folders.len()))
        }

        async fn upload(
            &self,
            local_path: &Path,
            remote_name: &str,
            parent_id: Option<&str>,
        ) -> DriveResult<String> {
            if self.fail_on.as_deref() == Some(remote_name) {
                return Err(DriveError::ApiError {
                    status: 403,
                    message: "quota exceeded".into(),
                });
            }
            assert!(local_path.is_file());
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push((remote_name.to_string(), parent_id.map(String::from)));
            Ok(format!("file-{}", uploads.len()))
        }
    }

    fn output_folder() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "x").unwrap();
        fs::write(dir.path().join("a.jsonl"), "{}").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.txt"), "y").unwrap();
        dir
    }

    #[test]
    fn test_collect_files_is_sorted_and_recursive() {
        let dir = output_folder();
        let files = collect_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("a.jsonl"),
                PathBuf::from("b.csv"),
                PathBuf::from("sub").join("c.txt"),
            ]
        );
    }

    #[test]
    fn test_collect_files_missing_folder() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(collect_files(&missing), Err(DriveError::IoError(_))));
    }

    #[tokio::test]
    async fn test_upload_all_in_order() {
        let dir = output_folder();
        let uploader = FakeUploader::default();

        let uploaded = upload_all(dir.path(), &uploader, Some("parent")).await.unwrap();

        let names: Vec<_> = uploaded.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["a.jsonl", "b.csv", "c.txt"]);
        assert_eq!(uploaded[2].remote_id, "file-3");

        let calls = uploader.uploads.lock().unwrap();
        assert!(calls.iter().all(|(_, p)| p.as_deref() == Some("parent")));
    }

    #[tokio::test]
    async fn test_upload_all_logs_outcome() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("only.jsonl"), "{}").unwrap();
        let mut rx = LOG_BROADCASTER.subscribe();

        upload_all(dir.path(), &FakeUploader::default(), None).await.unwrap();

        let mut seen = false;
        loop {
            match rx.try_recv() {
                Ok(entry) => seen |= entry.message == "Uploaded only.jsonl to Google Drive.",
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        assert!(seen);
    }

    #[tokio::test]
    async fn test_first_failure_aborts_batch() {
        let dir = output_folder();
        let uploader = FakeUploader {
            fail_on: Some("b.csv".into()),
            ..Default::default()
        };

        let err = upload_all(dir.path(), &uploader, None).await.unwrap_err();

        assert!(matches!(err, DriveError::ApiError { status: 403, .. }));
        let calls = uploader.uploads.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "a.jsonl");
    }

    #[tokio::test]
    async fn test_empty_folder_uploads_nothing() {
        let dir = tempdir().unwrap();
        let uploaded = upload_all(dir.path(), &FakeUploader::default(), None).await.unwrap();
        assert!(uploaded.is_empty());
    }
}
