use thiserror::Error;
use url::Url;

pub mod vk;
pub mod yandex_disk;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(surf::Error),
    #[error("invalid endpoint URL")]
    Url(#[from] url::ParseError),
}

// surf::Error doesn't implement std::error::Error, so it can't be a #[from] source.
impl From<surf::Error> for Error {
    fn from(error: surf::Error) -> Self {
        Error::Http(error)
    }
}

/// Resolves `path` against the root of `base`, ignoring any path `base` carries.
fn endpoint_url(base: &Url, path: &str) -> Result<Url, Error> {
    Ok(base.join(path)?)
}
