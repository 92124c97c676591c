//! JSON-in, JSON-out handlers for the media routes.
//!
//! Every method of [`MediaService`] answers with an [`ApiResponse`]; errors
//! are turned into a failed response with a status code instead of being
//! returned. The HTTP framework in front of the service only has to decode
//! the request body and write out the response.
use crate::client::request::HeadRequest;
use crate::client::{ObjectClient, SdkClient};
use crate::config::Config;
use crate::download::{DownloadPlan, DownloadPlanner};
use crate::error::{Error, Result};
use crate::presign::{Operation, UrlSigner};
use crate::request::DeleteRequest;
use crate::response::ApiResponse;
use crate::upload::Uploader;
use crate::uri::{Key, KeyPrefix, ObjectUri};
use crate::{ByteSize, SendRequest, UploadBuilder};

use bytes::Bytes;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::time::Duration;
use uuid::Uuid;

mod post;
pub use post::{MAX_CONTENT_CHARS, MAX_PLAYLIST_TRACKS, PostRequest};

const MAX_DELETE_KEYS: usize = 1000;

/// The kinds of media the routes accept.
///
/// Each kind owns a key prefix in the bucket and a set of content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    /// Pictures attached to image posts and profiles.
    Image,
    /// Tracks of audio posts and playlists.
    Audio,
    /// Clips attached to video posts.
    Video,
    /// Crash reports uploaded by the apps.
    CrashLog,
}

impl MediaKind {
    /// Every kind.
    pub const ALL: [MediaKind; 4] = [Self::Image, Self::Audio, Self::Video, Self::CrashLog];

    /// The name of the kind, also the first segment of its keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::CrashLog => "crash-log",
        }
    }

    /// The prefix all keys of this kind live under.
    pub fn prefix(&self) -> KeyPrefix {
        KeyPrefix::from(self.as_str())
    }

    /// Content types an upload of this kind may have.
    pub fn content_types(&self) -> &'static [&'static str] {
        match self {
            Self::Image => &["image/jpeg", "image/png", "image/gif", "image/webp", "image/heic"],
            Self::Audio => &[
                "audio/mpeg",
                "audio/mp4",
                "audio/aac",
                "audio/wav",
                "audio/ogg",
                "audio/flac",
            ],
            Self::Video => &["video/mp4", "video/quicktime", "video/webm"],
            Self::CrashLog => &["text/plain", "application/json", "application/octet-stream"],
        }
    }

    /// Whether an upload of this kind may have `content_type`.
    ///
    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn accepts(&self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        self.content_types().contains(&essence.as_str())
    }

    /// The kind whose prefix `key` lives under, if any.
    pub fn of_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prefix().contains(key))
    }

    /// A fresh key for a file of this kind: `{kind}/{uuid}/{file_name}`.
    ///
    /// The UUID is time-ordered, so keys of one kind sort by upload time.
    pub fn new_key(&self, file_name: &str) -> Result<Key> {
        let name = sanitize_file_name(file_name)?;
        let key = self.prefix().to_key(&format!("{}/{name}", Uuid::now_v7()));
        Ok(key)
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn sanitize_file_name(file_name: &str) -> Result<String> {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        return Err(Error::invalid("fileName", "must name a file"));
    }
    let name = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(255)
        .collect();
    Ok(name)
}

/// Metadata sent alongside the bytes of a media upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMediaRequest {
    /// Decides the key prefix and the accepted content types.
    pub kind: MediaKind,
    /// Client-side name of the file.
    pub file_name: String,
    /// MIME type of the body.
    pub content_type: String,
}

/// Where an uploaded file ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    /// Key the file was stored under.
    pub key: Key,
    /// URL of the stored object.
    pub location: String,
    /// Entity tag reported by the store.
    pub etag: String,
}

/// Ask for a URL the client can upload a file to directly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignUploadRequest {
    /// Kind of file to be uploaded.
    pub kind: MediaKind,
    /// Client-side name of the file.
    pub file_name: String,
    /// MIME type the upload must be sent with.
    pub content_type: String,
    /// Seconds the URL stays valid, defaulting to the configured expiry.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// A write-signed URL and the key the upload will land at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    /// Key the upload will be stored under.
    pub key: Key,
    /// The signed URL.
    pub url: String,
    /// HTTP method to use with `url`.
    pub method: &'static str,
    /// Seconds until `url` expires.
    pub expires_in: u64,
}

/// Ask for a ranged download plan of a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignDownloadRequest {
    /// Key of the stored file.
    pub key: Key,
    /// Name the browser saves the file under, defaulting to the key's.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Size of a range, defaulting to the configured chunk size.
    #[serde(default)]
    pub chunk_size: Option<u64>,
}

/// Delete a batch of stored files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMediaRequest {
    /// Between 1 and 1000 media keys.
    pub keys: Vec<Key>,
}

/// How many files a delete removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedMedia {
    /// Number of keys removed.
    pub deleted: usize,
}

/// A post whose shape is valid and whose media all exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedPost {
    /// The post's `type` tag.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Author of the post.
    pub user_id: String,
    /// Referenced media, in the order the post lists them.
    pub media: Vec<VerifiedMedia>,
}

/// A stored object a post refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedMedia {
    /// Key of the object.
    pub key: Key,
    /// Size in bytes.
    pub size: u64,
    /// Stored content type, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Handlers for the media routes.
#[derive(Debug, Clone)]
pub struct MediaService {
    config: Config,
    client: ObjectClient,
    uploader: Uploader,
    signer: UrlSigner,
    downloads: DownloadPlanner,
}

impl MediaService {
    /// Create the service over `client` with `config`.
    ///
    /// The configuration is [normalized](Config::normalized) first. Uploads
    /// never replace an existing object.
    pub fn new<C>(client: C, config: Config) -> Self
    where
        C: SendRequest + 'static,
    {
        let config = config.normalized();
        let client = ObjectClient::new(client);
        let uploader = UploadBuilder::from_object_client(client.clone())
            .min_part_size(ByteSize::b(config.min_part_size))
            .max_parts(config.max_parts)
            .max_active_tasks(config.max_active_tasks)
            .overwrite(false)
            .build();
        let signer = UrlSigner::new(client.clone(), config.bucket.clone())
            .default_expiry(config.presign_expiry());
        let downloads = DownloadPlanner::new(client.clone(), signer.clone())
            .max_parts(config.max_download_parts);

        Self {
            config,
            client,
            uploader,
            signer,
            downloads,
        }
    }

    /// Create the service from the environment, both the AWS settings and
    /// the variables read by [`Config::from_env`].
    pub async fn from_env() -> Result<Self> {
        let config = Config::from_env()?;
        let client = SdkClient::from_env().await;
        Ok(Self::new(client, config))
    }

    /// Replace the uploader built from the configuration.
    ///
    /// For S3-compatible stores that accept parts smaller than S3's 5 MiB,
    /// which [`Config::normalized`] does not allow.
    pub fn with_uploader(self, uploader: Uploader) -> Self {
        Self { uploader, ..self }
    }

    /// The configuration the service runs with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Store an uploaded file under a fresh key of its kind.
    pub async fn upload_media(
        &self,
        req: UploadMediaRequest,
        body: Bytes,
    ) -> ApiResponse<UploadedMedia> {
        let res = self.try_upload_media(req, body).await;
        ApiResponse::from_result("media uploaded", res)
    }

    async fn try_upload_media(&self, req: UploadMediaRequest, body: Bytes) -> Result<UploadedMedia> {
        check_content_type(req.kind, &req.content_type)?;
        if body.is_empty() {
            return Err(Error::invalid("body", "file is empty"));
        }
        let key = req.kind.new_key(&req.file_name)?;
        debug!(%key, kind = %req.kind, size = body.len(), "uploading media");

        let uri = self.uri(key.clone());
        let res = self
            .uploader
            .upload(uri, body, Some(&req.content_type))
            .await?;

        Ok(UploadedMedia {
            key,
            location: res.location(),
            etag: res.etag.to_string(),
        })
    }

    /// Issue a URL the client can upload a file to without going through the
    /// service.
    ///
    /// The URL only accepts the requested content type.
    pub async fn presign_upload(&self, req: PresignUploadRequest) -> ApiResponse<PresignedUpload> {
        let res = self.try_presign_upload(req).await;
        ApiResponse::from_result("upload url issued", res)
    }

    async fn try_presign_upload(&self, req: PresignUploadRequest) -> Result<PresignedUpload> {
        check_content_type(req.kind, &req.content_type)?;
        let key = req.kind.new_key(&req.file_name)?;
        let expires_in = req.expires_in.map(Duration::from_secs);
        debug!(%key, kind = %req.kind, "issuing upload url");

        let url = self
            .signer
            .sign(
                key.clone(),
                Operation::Write,
                Some(&req.content_type),
                expires_in,
                None,
            )
            .await?;

        Ok(PresignedUpload {
            key,
            url: url.url,
            method: url.method,
            expires_in: url.expires_in,
        })
    }

    /// Plan a ranged download of a stored file.
    pub async fn presign_download(&self, req: PresignDownloadRequest) -> ApiResponse<DownloadPlan> {
        let res = self.try_presign_download(req).await;
        ApiResponse::from_result("download plan issued", res)
    }

    async fn try_presign_download(&self, req: PresignDownloadRequest) -> Result<DownloadPlan> {
        check_media_key("key", &req.key)?;
        let chunk_size = req.chunk_size.unwrap_or(self.config.download_chunk_size);
        let file_name = req.file_name.as_deref().map(sanitize_file_name).transpose()?;
        debug!(key = %req.key, chunk_size, "planning download");

        self.downloads
            .plan_object(req.key, chunk_size, file_name.as_deref())
            .await
    }

    /// Delete a batch of 1 to 1000 stored files.
    pub async fn delete_media(&self, req: DeleteMediaRequest) -> ApiResponse<DeletedMedia> {
        let res = self.try_delete_media(req).await;
        ApiResponse::from_result("media deleted", res)
    }

    async fn try_delete_media(&self, req: DeleteMediaRequest) -> Result<DeletedMedia> {
        if req.keys.is_empty() || req.keys.len() > MAX_DELETE_KEYS {
            return Err(Error::invalid(
                "keys",
                format!("must have 1 to {MAX_DELETE_KEYS} keys"),
            ));
        }
        req.keys
            .iter()
            .try_for_each(|key| check_media_key("keys", key))?;

        let deleted = req.keys.len();
        debug!(deleted, "deleting media");
        let del = DeleteRequest::new(self.config.bucket.clone(), req.keys);
        self.client.send_delete_objects_request(del).await?;

        Ok(DeletedMedia { deleted })
    }

    /// Check a post before it is stored.
    ///
    /// Besides its shape, every object the post refers to must exist.
    pub async fn verify_post(&self, post: PostRequest) -> ApiResponse<VerifiedPost> {
        let res = self.try_verify_post(post).await;
        ApiResponse::from_result("post verified", res)
    }

    async fn try_verify_post(&self, post: PostRequest) -> Result<VerifiedPost> {
        post.validate()?;
        trace!(kind = post.kind(), media = post.media_keys().len(), "verifying post");

        let heads = post.media_keys().into_iter().map(|key| {
            let req = HeadRequest::new(self.uri(key.clone()));
            async move {
                let head = self.client.send_head_object_request(req).await?;
                Ok::<_, Error>(VerifiedMedia {
                    key: head.uri.key,
                    size: head.size,
                    content_type: head.content_type,
                })
            }
        });
        let media = try_join_all(heads).await?;

        Ok(VerifiedPost {
            kind: post.kind(),
            user_id: post.user_id().to_string(),
            media,
        })
    }

    fn uri(&self, key: Key) -> ObjectUri {
        ObjectUri::new(self.config.bucket.clone(), key)
    }
}

fn check_content_type(kind: MediaKind, content_type: &str) -> Result<()> {
    if !kind.accepts(content_type) {
        return Err(Error::invalid(
            "contentType",
            format!("{content_type:?} is not accepted for {kind}"),
        ));
    }
    Ok(())
}

fn check_media_key(field: &'static str, key: &Key) -> Result<()> {
    if key.validate().is_err() || MediaKind::of_key(key).is_none() {
        return Err(Error::invalid(field, format!("'{key}' is not a media key")));
    }
    Ok(())
}
