use std::io;
use std::num::NonZeroU32;

use structopt::StructOpt;

pub mod api;
pub mod models;
pub mod prompt;
pub mod telemetry;
pub mod transfer;

use api::vk::VkClient;
use api::yandex_disk::YandexDiskClient;
use prompt::Credentials;
use transfer::{Outcome, TransferJob};

#[derive(Debug)]
pub enum Error {
    TelemetryInitError(anyhow::Error),
    PromptError(io::Error),
    TransferError(transfer::Error),
}

impl From<Error> for u8 {
    fn from(error: Error) -> u8 {
        match error {
            Error::TelemetryInitError(_) => 3,
            Error::PromptError(_) => 4,
            Error::TransferError(_) => 5,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TelemetryInitError(err) => {
                write!(f, "Failed to init telemetry: {}", err)
            },
            Error::PromptError(err) => {
                write!(f, "Failed to read input: {}", err)
            },
            Error::TransferError(err) => {
                write!(f, "Transfer failed: {}", err)
            },
        }
    }
}

#[derive(Debug, StructOpt)]
pub struct Args {
    /// VK access token. Asked for interactively when not given.
    #[structopt(long, env = "VK_TOKEN", hide_env_values = true)]
    pub vk_token: Option<String>,
    /// ID of the VK user whose photos are copied, negative for communities. Asked for
    /// interactively when not given.
    #[structopt(long, env = "VK_USER_ID", allow_hyphen_values = true)]
    pub vk_user_id: Option<String>,
    /// Yandex Disk OAuth token. Asked for interactively when not given.
    #[structopt(long, env = "YANDEX_DISK_TOKEN", hide_env_values = true)]
    pub yandex_disk_token: Option<String>,

    /// VK album to copy photos from.
    #[structopt(long, default_value = "profile", env = "VK_ALBUM_ID")]
    pub album_id: String,
    /// Yandex Disk folder to create and upload into.
    #[structopt(long, default_value = "VK_Photos", env = "VK_PHOTO_BACKUP_FOLDER")]
    pub folder_name: String,
    /// Maximum number of photos to copy.
    #[structopt(long, default_value = "5", env = "VK_PHOTO_BACKUP_COUNT")]
    pub photo_count: NonZeroU32,
    /// Where to write the manifest of uploaded photos.
    #[structopt(
        long,
        parse(from_os_str),
        default_value = "photos_info.json",
        env = "VK_PHOTO_BACKUP_MANIFEST"
    )]
    pub manifest_path: std::path::PathBuf,

    /// VK API base URL.
    #[structopt(long, default_value = "https://api.vk.com", env = "VK_API_ENDPOINT")]
    pub vk_endpoint: String,
    /// Yandex Disk API base URL.
    #[structopt(
        long,
        default_value = "https://cloud-api.yandex.net",
        env = "YANDEX_DISK_API_ENDPOINT"
    )]
    pub yandex_disk_endpoint: String,
}

/// Builds both API clients from the credentials and copies the photos.
pub async fn run(args: &Args, credentials: &Credentials) -> Result<Outcome, transfer::Error> {
    let vk = VkClient::new(&args.vk_endpoint, credentials.vk_token.as_str())?;
    let yandex_disk =
        YandexDiskClient::new(&args.yandex_disk_endpoint, &credentials.yandex_disk_token)?;

    let job = TransferJob {
        owner_id: credentials.vk_user_id.clone(),
        album_id: args.album_id.clone(),
        folder_name: args.folder_name.clone(),
        photo_count: args.photo_count,
        manifest_path: args.manifest_path.clone(),
    };

    transfer::save_photos_to_disk(&vk, &yandex_disk, &job).await
}

pub async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    let args = Args::from_args();

    telemetry::init().map_err(Error::TelemetryInitError)?;

    let credentials = {
        let stdin = io::stdin();
        let stdout = io::stdout();
        Credentials::resolve(&args, &mut stdin.lock(), &mut stdout.lock())
            .map_err(Error::PromptError)?
    };

    let outcome = run(&args, &credentials)
        .await
        .map_err(Error::TransferError)?;
    println!("{}", outcome);

    Ok(())
}
