use std::num::NonZeroU32;
use std::path::PathBuf;

use thiserror::Error;

use crate::api::vk::{PhotoListing, PhotoSource};
use crate::api::yandex_disk::RemoteStorage;
use crate::models::manifest::{self, ManifestEntry};

pub const DEFAULT_FOLDER: &str = "VK_Photos";
pub const DEFAULT_MANIFEST_PATH: &str = "photos_info.json";

#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    Api(#[from] crate::api::Error),
    #[error("couldn't format capture date: {0}")]
    CaptureDate(#[from] time::Error),
    #[error("couldn't encode manifest: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("couldn't write manifest: {0}")]
    Write(#[from] std::io::Error),
}

#[derive(Clone, Debug)]
pub struct TransferJob {
    pub owner_id: String,
    pub album_id: String,
    pub folder_name: String,
    pub photo_count: NonZeroU32,
    pub manifest_path: PathBuf,
}

/// How a run ended when no transport or I/O error got in the way.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    FolderNotCreated {
        folder_name: String,
    },
    ListingFailed {
        message: String,
    },
    Completed {
        manifest: Vec<ManifestEntry>,
        skipped: usize,
    },
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::FolderNotCreated { folder_name } => {
                write!(f, "Failed to create folder {} on Yandex Disk.", folder_name)
            },
            Outcome::ListingFailed { message } => {
                write!(f, "Failed to get photos: {}", message)
            },
            Outcome::Completed { .. } => {
                write!(f, "Photos were uploaded to Yandex Disk.")
            },
        }
    }
}

/// Copies the photos listed by `source` into a new folder on `storage` and writes the manifest
/// of accepted uploads to `job.manifest_path`.
///
/// Failing to create the folder or to list the photos ends the run before the manifest is
/// touched. Rejected uploads are left out of the manifest and counted as skipped.
pub async fn save_photos_to_disk<S, R>(
    source: &S,
    storage: &R,
    job: &TransferJob,
) -> Result<Outcome, Error>
where
    S: PhotoSource + ?Sized,
    R: RemoteStorage + ?Sized,
{
    if !storage.create_folder(&job.folder_name).await? {
        tracing::error!(folder = %job.folder_name, "Couldn't create folder on Yandex Disk");
        return Ok(Outcome::FolderNotCreated {
            folder_name: job.folder_name.clone(),
        });
    }
    tracing::info!(folder = %job.folder_name, "Created folder on Yandex Disk");

    let photos = match source
        .list_photos(&job.owner_id, &job.album_id, job.photo_count)
        .await?
    {
        PhotoListing::Photos(photos) => photos,
        PhotoListing::Failed { code, message } => {
            tracing::error!(code, %message, "Couldn't get photos from VK");
            return Ok(Outcome::ListingFailed { message });
        },
    };

    let total = photos.len();
    let mut manifest: Vec<ManifestEntry> = Vec::with_capacity(total);
    let mut skipped = 0;

    for (index, photo) in photos.iter().enumerate() {
        tracing::info!("Uploading photo {}/{}", index + 1, total);

        let size = match manifest::largest_size(&photo.sizes) {
            Some(size) => size,
            None => {
                tracing::warn!(photo_id = photo.id, "Photo has no sizes, skipping");
                skipped += 1;
                continue;
            },
        };

        let file_name = manifest::file_name_for(photo, &manifest)?;
        if storage
            .upload_by_url(&size.url, &file_name, &job.folder_name)
            .await?
        {
            manifest.push(ManifestEntry {
                file_name,
                size_label: size.label.clone(),
            });
        } else {
            tracing::debug!(photo_id = photo.id, %file_name, "Upload was not accepted");
            skipped += 1;
        }
    }

    let data = manifest::to_json_pretty(&manifest)?;
    async_std::fs::write(&job.manifest_path, data).await?;
    tracing::info!(
        path = %job.manifest_path.display(),
        uploaded = manifest.len(),
        skipped,
        "Wrote manifest"
    );

    Ok(Outcome::Completed { manifest, skipped })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;
    use vk_photo_backup_api_structs::{Likes, Photo, Size};

    const JAN_1_2024: i64 = 1704067200;
    const JUN_1_2024: i64 = 1717200000;

    struct FakeSource {
        listing: PhotoListing,
        calls: Mutex<Vec<(String, String, u32)>>,
    }

    impl FakeSource {
        fn new(listing: PhotoListing) -> Self {
            FakeSource {
                listing,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, String, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl PhotoSource for FakeSource {
        async fn list_photos(
            &self,
            owner_id: &str,
            album_id: &str,
            count: NonZeroU32,
        ) -> Result<PhotoListing, crate::api::Error> {
            self.calls.lock().unwrap().push((
                owner_id.to_string(),
                album_id.to_string(),
                count.get(),
            ));
            Ok(self.listing.clone())
        }
    }

    /// Behaves like Yandex Disk: creating an existing folder fails.
    #[derive(Default)]
    struct FakeStorage {
        folders: Mutex<HashSet<String>>,
        rejected_urls: HashSet<String>,
        uploads: Mutex<Vec<(String, String)>>,
    }

    impl FakeStorage {
        fn rejecting(urls: &[&str]) -> Self {
            FakeStorage {
                rejected_urls: urls.iter().map(|u| u.to_string()).collect(),
                ..Default::default()
            }
        }

        fn uploads(&self) -> Vec<(String, String)> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl RemoteStorage for FakeStorage {
        async fn create_folder(&self, name: &str) -> Result<bool, crate::api::Error> {
            Ok(self.folders.lock().unwrap().insert(name.to_string()))
        }

        async fn upload_by_url(
            &self,
            source_url: &str,
            file_name: &str,
            folder_name: &str,
        ) -> Result<bool, crate::api::Error> {
            self.uploads
                .lock()
                .unwrap()
                .push((source_url.to_string(), format!("{}/{}", folder_name, file_name)));
            Ok(!self.rejected_urls.contains(source_url))
        }
    }

    fn photo(id: i64, likes: u64, date: i64) -> Photo {
        Photo {
            id,
            sizes: vec![
                Size {
                    label: "s".to_string(),
                    url: format!("https://example.com/{}/s.jpg", id),
                    width: 75,
                    height: 56,
                },
                Size {
                    label: "z".to_string(),
                    url: format!("https://example.com/{}/z.jpg", id),
                    width: 1280,
                    height: 960,
                },
            ],
            likes: Likes { count: likes },
            date,
        }
    }

    fn job(dir: &tempfile::TempDir) -> TransferJob {
        TransferJob {
            owner_id: "1".to_string(),
            album_id: "profile".to_string(),
            folder_name: DEFAULT_FOLDER.to_string(),
            photo_count: NonZeroU32::new(5).unwrap(),
            manifest_path: dir.path().join(DEFAULT_MANIFEST_PATH),
        }
    }

    fn read_manifest(job: &TransferJob) -> Vec<ManifestEntry> {
        let data = std::fs::read(&job.manifest_path).unwrap();
        serde_json::from_slice(&data).unwrap()
    }

    #[async_std::test]
    async fn uploads_largest_size_of_each_photo() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(&dir);
        let source = FakeSource::new(PhotoListing::Photos(vec![
            photo(1, 3, JAN_1_2024),
            photo(2, 7, JAN_1_2024),
        ]));
        let storage = FakeStorage::default();

        let outcome = save_photos_to_disk(&source, &storage, &job).await.unwrap();

        let expected = vec![
            ManifestEntry {
                file_name: "3.jpg".to_string(),
                size_label: "z".to_string(),
            },
            ManifestEntry {
                file_name: "7.jpg".to_string(),
                size_label: "z".to_string(),
            },
        ];
        assert_eq!(
            outcome,
            Outcome::Completed {
                manifest: expected.clone(),
                skipped: 0,
            }
        );
        assert_eq!(read_manifest(&job), expected);
        assert_eq!(
            storage.uploads(),
            vec![
                (
                    "https://example.com/1/z.jpg".to_string(),
                    "VK_Photos/3.jpg".to_string()
                ),
                (
                    "https://example.com/2/z.jpg".to_string(),
                    "VK_Photos/7.jpg".to_string()
                ),
            ]
        );
        assert_eq!(
            source.calls(),
            vec![("1".to_string(), "profile".to_string(), 5)]
        );
    }

    #[async_std::test]
    async fn empty_listing_writes_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(&dir);
        let source = FakeSource::new(PhotoListing::Photos(vec![]));
        let storage = FakeStorage::default();

        let outcome = save_photos_to_disk(&source, &storage, &job).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Completed {
                manifest: vec![],
                skipped: 0,
            }
        );
        assert_eq!(std::fs::read(&job.manifest_path).unwrap(), b"[]");
        assert_eq!(outcome.to_string(), "Photos were uploaded to Yandex Disk.");
    }

    #[async_std::test]
    async fn listing_error_leaves_manifest_alone() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(&dir);
        std::fs::write(&job.manifest_path, "previous run").unwrap();
        let source = FakeSource::new(PhotoListing::Failed {
            code: 5,
            message: "Invalid access_token".to_string(),
        });
        let storage = FakeStorage::default();

        let outcome = save_photos_to_disk(&source, &storage, &job).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::ListingFailed {
                message: "Invalid access_token".to_string(),
            }
        );
        assert_eq!(
            outcome.to_string(),
            "Failed to get photos: Invalid access_token"
        );
        assert_eq!(
            std::fs::read_to_string(&job.manifest_path).unwrap(),
            "previous run"
        );
        assert!(storage.uploads().is_empty());
    }

    #[async_std::test]
    async fn same_likes_get_capture_date() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(&dir);
        let source = FakeSource::new(PhotoListing::Photos(vec![
            photo(1, 10, JAN_1_2024),
            photo(2, 10, JUN_1_2024),
        ]));
        let storage = FakeStorage::default();

        save_photos_to_disk(&source, &storage, &job).await.unwrap();

        let names: Vec<String> = read_manifest(&job)
            .into_iter()
            .map(|entry| entry.file_name)
            .collect();
        assert_eq!(names, vec!["10.jpg", "10_2024-06-01.jpg"]);
    }

    #[async_std::test]
    async fn folder_failure_stops_before_listing() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(&dir);
        let source = FakeSource::new(PhotoListing::Photos(vec![photo(1, 3, JAN_1_2024)]));
        let storage = FakeStorage::default();
        storage
            .folders
            .lock()
            .unwrap()
            .insert(DEFAULT_FOLDER.to_string());

        let outcome = save_photos_to_disk(&source, &storage, &job).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::FolderNotCreated {
                folder_name: DEFAULT_FOLDER.to_string(),
            }
        );
        assert!(source.calls().is_empty());
        assert!(storage.uploads().is_empty());
        assert!(!job.manifest_path.exists());
    }

    #[async_std::test]
    async fn second_run_stops_on_existing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(&dir);
        let source = FakeSource::new(PhotoListing::Photos(vec![photo(1, 3, JAN_1_2024)]));
        let storage = FakeStorage::default();

        let first = save_photos_to_disk(&source, &storage, &job).await.unwrap();
        assert!(matches!(first, Outcome::Completed { .. }));
        let manifest_after_first = std::fs::read(&job.manifest_path).unwrap();

        let second = save_photos_to_disk(&source, &storage, &job).await.unwrap();
        assert!(matches!(second, Outcome::FolderNotCreated { .. }));
        assert_eq!(std::fs::read(&job.manifest_path).unwrap(), manifest_after_first);
        assert_eq!(source.calls().len(), 1);
        assert_eq!(storage.uploads().len(), 1);
    }

    #[async_std::test]
    async fn rejected_upload_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(&dir);
        let source = FakeSource::new(PhotoListing::Photos(vec![
            photo(1, 10, JAN_1_2024),
            photo(2, 10, JUN_1_2024),
            photo(3, 4, JAN_1_2024),
        ]));
        let storage = FakeStorage::rejecting(&["https://example.com/1/z.jpg"]);

        let outcome = save_photos_to_disk(&source, &storage, &job).await.unwrap();

        // The first photo never made it into the manifest, so the second one keeps the short name.
        let expected = vec![
            ManifestEntry {
                file_name: "10.jpg".to_string(),
                size_label: "z".to_string(),
            },
            ManifestEntry {
                file_name: "4.jpg".to_string(),
                size_label: "z".to_string(),
            },
        ];
        assert_eq!(
            outcome,
            Outcome::Completed {
                manifest: expected.clone(),
                skipped: 1,
            }
        );
        assert_eq!(read_manifest(&job), expected);
        assert_eq!(storage.uploads().len(), 3);
    }

    #[async_std::test]
    async fn photo_without_sizes_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(&dir);
        let mut bare = photo(1, 2, JAN_1_2024);
        bare.sizes.clear();
        let source = FakeSource::new(PhotoListing::Photos(vec![bare, photo(2, 5, JAN_1_2024)]));
        let storage = FakeStorage::default();

        let outcome = save_photos_to_disk(&source, &storage, &job).await.unwrap();

        match outcome {
            Outcome::Completed { manifest, skipped } => {
                assert_eq!(skipped, 1);
                assert_eq!(manifest.len(), 1);
                assert_eq!(manifest[0].file_name, "5.jpg");
            },
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(storage.uploads().len(), 1);
    }

    #[async_std::test]
    async fn manifest_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(&dir);
        std::fs::write(&job.manifest_path, "stale content that is longer than the new one").unwrap();
        let source = FakeSource::new(PhotoListing::Photos(vec![]));
        let storage = FakeStorage::default();

        save_photos_to_disk(&source, &storage, &job).await.unwrap();

        assert_eq!(std::fs::read_to_string(&job.manifest_path).unwrap(), "[]");
    }
}
