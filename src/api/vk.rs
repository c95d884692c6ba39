use std::num::NonZeroU32;

use url::Url;

use super::{endpoint_url, Error};
use vk_photo_backup_api_structs::{Photo, PhotosGetResponse};

pub const DEFAULT_ENDPOINT: &str = "https://api.vk.com";
pub const API_VERSION: &str = "5.131";
/// Album ID VK uses for a user's profile pictures.
pub const PROFILE_ALBUM: &str = "profile";

/// Result of a `photos.get` call. API-level failures are values, not errors.
#[derive(Clone, Debug, PartialEq)]
pub enum PhotoListing {
    Photos(Vec<Photo>),
    Failed { code: i32, message: String },
}

impl From<PhotosGetResponse> for PhotoListing {
    fn from(response: PhotosGetResponse) -> Self {
        match response {
            PhotosGetResponse::Response { response } => PhotoListing::Photos(response.items),
            PhotosGetResponse::Error { error } => PhotoListing::Failed {
                code: error.error_code,
                message: error.error_msg,
            },
        }
    }
}

#[async_trait::async_trait]
pub trait PhotoSource {
    /// Lists at most `count` photos of `album_id` owned by `owner_id`.
    ///
    /// `owner_id` is passed through as given; negative IDs address communities.
    async fn list_photos(
        &self,
        owner_id: &str,
        album_id: &str,
        count: NonZeroU32,
    ) -> Result<PhotoListing, Error>;
}

pub struct VkClient {
    endpoint: Url,
    access_token: String,
}

impl VkClient {
    pub fn new(endpoint: &str, access_token: impl Into<String>) -> Result<Self, Error> {
        Ok(VkClient {
            endpoint: Url::parse(endpoint)?,
            access_token: access_token.into(),
        })
    }

    fn photos_get_url(
        &self,
        owner_id: &str,
        album_id: &str,
        count: NonZeroU32,
    ) -> Result<Url, Error> {
        let mut url = endpoint_url(&self.endpoint, "/method/photos.get")?;
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token)
            .append_pair("v", API_VERSION)
            .append_pair("owner_id", owner_id)
            .append_pair("album_id", album_id)
            .append_pair("extended", "1")
            .append_pair("photo_sizes", "1")
            .append_pair("count", &count.to_string());
        Ok(url)
    }
}

impl std::fmt::Debug for VkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VkClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl PhotoSource for VkClient {
    async fn list_photos(
        &self,
        owner_id: &str,
        album_id: &str,
        count: NonZeroU32,
    ) -> Result<PhotoListing, Error> {
        let url = self.photos_get_url(owner_id, album_id, count)?;

        tracing::debug!(owner_id, album_id, count = count.get(), "Requesting photos.get");
        let mut res = surf::get(url).await?;
        tracing::debug!(status = %res.status(), "photos.get responded");

        let body: PhotosGetResponse = res.body_json().await?;
        Ok(body.into())
    }
}
