//! Async Storage client over any [`AsyncSession`].

use super::request::{self, UploadMode};
use super::{BucketMetadata, ListObjectsResponse, ObjectMetadata, StorageConfig};
use crate::error::{Error, HttpError};
use crate::http::{AioSession, AsyncSession, Params, Payload};
use crate::shared::decode_json;

/// Async Storage client.
///
/// ```rust,ignore
/// let storage = Storage::new()?;
/// storage.upload("my-bucket", "reports/today.json", body.into(), "application/json").await?;
/// let bytes = storage.download("my-bucket", "reports/today.json").await?;
/// ```
pub struct Storage<S = AioSession> {
    config: StorageConfig,
    session: S,
}

impl Storage<AioSession> {
    pub fn new() -> Result<Self, Error> {
        let config = StorageConfig::builder().build()?;
        Ok(Self::with_session(config, AioSession::default()))
    }
}

impl<S: AsyncSession> Storage<S> {
    pub fn with_session(config: StorageConfig, session: S) -> Self {
        Self { config, session }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    // ── Buckets ──────────────────────────────────────────────────────────

    pub async fn get_bucket(&self, bucket: &str) -> Result<BucketMetadata, Error> {
        let url = request::bucket_url(&self.config, bucket)?;
        let headers = request::auth_headers(&self.config);
        let resp = self
            .session
            .get(&url, &headers, self.config.timeout, None)
            .await?;
        decode_json(&resp.bytes().await.map_err(HttpError::from)?)
    }

    /// One page of objects. `params` carries `prefix`, `delimiter`,
    /// `pageToken`, `maxResults` and friends.
    pub async fn list_objects(
        &self,
        bucket: &str,
        params: Option<&Params>,
    ) -> Result<ListObjectsResponse, Error> {
        let url = request::objects_url(&self.config, bucket)?;
        let headers = request::auth_headers(&self.config);
        let resp = self
            .session
            .get(&url, &headers, self.config.timeout, params)
            .await?;
        decode_json(&resp.bytes().await.map_err(HttpError::from)?)
    }

    // ── Objects ──────────────────────────────────────────────────────────

    pub async fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>, Error> {
        let url = request::object_url(&self.config, bucket, object)?;
        let headers = request::auth_headers(&self.config);
        let resp = self
            .session
            .get(&url, &headers, self.config.timeout, Some(&request::media_params()))
            .await?;
        let bytes = resp.bytes().await.map_err(HttpError::from)?;
        Ok(bytes.to_vec())
    }

    pub async fn download_metadata(&self, bucket: &str, object: &str) -> Result<ObjectMetadata, Error> {
        let url = request::object_url(&self.config, bucket, object)?;
        let headers = request::auth_headers(&self.config);
        let resp = self
            .session
            .get(&url, &headers, self.config.timeout, None)
            .await?;
        decode_json(&resp.bytes().await.map_err(HttpError::from)?)
    }

    /// Upload `data` as `object`, resumable once it exceeds
    /// [`RESUMABLE_UPLOAD_THRESHOLD`](super::RESUMABLE_UPLOAD_THRESHOLD).
    pub async fn upload(
        &self,
        bucket: &str,
        object: &str,
        data: Payload,
        content_type: &str,
    ) -> Result<ObjectMetadata, Error> {
        let mode = UploadMode::for_len(data.len());
        tracing::debug!(bucket, object, len = data.len(), ?mode, "uploading object");
        match mode {
            UploadMode::Simple => self.upload_simple(bucket, object, data, content_type).await,
            UploadMode::Resumable => {
                self.upload_resumable(bucket, object, data, content_type)
                    .await
            }
        }
    }

    /// Open a resumable session and send `data` in one PUT to its `Location`.
    pub async fn upload_resumable(
        &self,
        bucket: &str,
        object: &str,
        data: Payload,
        content_type: &str,
    ) -> Result<ObjectMetadata, Error> {
        let url = request::upload_url(&self.config, bucket)?;
        let params = request::upload_params(UploadMode::Resumable, object)?;
        let headers = request::resumable_start_headers(&self.config, content_type, data.len());
        let resp = self
            .session
            .post(
                &url,
                &headers,
                request::resumable_start_body(object)?,
                self.config.timeout,
                Some(&params),
            )
            .await?;
        let session_uri = request::session_uri(resp.headers().get(reqwest::header::LOCATION))?;

        let headers = request::content_headers(&self.config, content_type);
        let resp = self
            .session
            .put(&session_uri, &headers, data, self.config.timeout)
            .await?;
        decode_json(&resp.bytes().await.map_err(HttpError::from)?)
    }

    pub async fn delete(&self, bucket: &str, object: &str, params: Option<&Params>) -> Result<(), Error> {
        let url = request::object_url(&self.config, bucket, object)?;
        let headers = request::auth_headers(&self.config);
        self.session
            .delete(&url, &headers, params, self.config.timeout)
            .await?;
        Ok(())
    }

    async fn upload_simple(
        &self,
        bucket: &str,
        object: &str,
        data: Payload,
        content_type: &str,
    ) -> Result<ObjectMetadata, Error> {
        let url = request::upload_url(&self.config, bucket)?;
        let params = request::upload_params(UploadMode::Simple, object)?;
        let headers = request::content_headers(&self.config, content_type);
        let resp = self
            .session
            .post(&url, &headers, data, self.config.timeout, Some(&params))
            .await?;
        decode_json(&resp.bytes().await.map_err(HttpError::from)?)
    }
}
