use surf::StatusCode;
use url::Url;

use super::{endpoint_url, Error};

pub const DEFAULT_ENDPOINT: &str = "https://cloud-api.yandex.net";

#[async_trait::async_trait]
pub trait RemoteStorage {
    /// Returns whether the folder was created by this call. An already existing folder is `false`.
    async fn create_folder(&self, name: &str) -> Result<bool, Error>;

    /// Asks the storage to fetch `source_url` into `folder_name/file_name`.
    ///
    /// Returns whether the request was accepted; the fetch itself completes asynchronously on the
    /// storage side and is not waited for.
    async fn upload_by_url(
        &self,
        source_url: &str,
        file_name: &str,
        folder_name: &str,
    ) -> Result<bool, Error>;
}

pub struct YandexDiskClient {
    endpoint: Url,
    auth_header: String,
}

impl YandexDiskClient {
    pub fn new(endpoint: &str, token: &str) -> Result<Self, Error> {
        Ok(YandexDiskClient {
            endpoint: Url::parse(endpoint)?,
            auth_header: format!("OAuth {}", token),
        })
    }

    fn resources_url(&self, folder_name: &str) -> Result<Url, Error> {
        let mut url = endpoint_url(&self.endpoint, "/v1/disk/resources")?;
        url.query_pairs_mut().append_pair("path", folder_name);
        Ok(url)
    }

    fn upload_url(
        &self,
        source_url: &str,
        file_name: &str,
        folder_name: &str,
    ) -> Result<Url, Error> {
        let mut url = endpoint_url(&self.endpoint, "/v1/disk/resources/upload")?;
        url.query_pairs_mut()
            .append_pair("url", source_url)
            .append_pair("path", &format!("{}/{}", folder_name, file_name));
        Ok(url)
    }
}

impl std::fmt::Debug for YandexDiskClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YandexDiskClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

async fn log_rejection(res: &mut surf::Response, what: &str) {
    let body = res.body_string().await.ok();
    tracing::debug!(status = %res.status(), body = ?body, "Yandex Disk rejected {}", what);
}

#[async_trait::async_trait]
impl RemoteStorage for YandexDiskClient {
    async fn create_folder(&self, name: &str) -> Result<bool, Error> {
        let url = self.resources_url(name)?;
        let mut res = surf::put(url)
            .header("Authorization", &self.auth_header)
            .await?;

        let created = res.status() == StatusCode::Created;
        if !created {
            log_rejection(&mut res, "folder creation").await;
        }
        Ok(created)
    }

    async fn upload_by_url(
        &self,
        source_url: &str,
        file_name: &str,
        folder_name: &str,
    ) -> Result<bool, Error> {
        let url = self.upload_url(source_url, file_name, folder_name)?;
        let mut res = surf::post(url)
            .header("Authorization", &self.auth_header)
            .await?;

        let accepted = res.status() == StatusCode::Accepted;
        if !accepted {
            log_rejection(&mut res, "upload").await;
        }
        Ok(accepted)
    }
}
