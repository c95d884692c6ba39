//! Wire types of the VK `photos.get` method as requested with `extended=1` and
//! `photo_sizes=1`.

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Size {
    #[serde(rename = "type")]
    pub label: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Likes {
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Photo {
    #[serde(default)]
    pub id: i64,
    pub sizes: Vec<Size>,
    #[serde(default)]
    pub likes: Likes,
    /// Capture time in seconds since the Unix epoch.
    pub date: i64,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PhotoList {
    #[serde(default)]
    pub count: u32,
    pub items: Vec<Photo>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ApiError {
    #[serde(default)]
    pub error_code: i32,
    pub error_msg: String,
}

/// Body of a `photos.get` response, which carries either `response` or `error`.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum PhotosGetResponse {
    Error { error: ApiError },
    Response { response: PhotoList },
}
