//! Blocking Storage client over any [`Session`].

use super::request::{self, UploadMode};
use super::{BucketMetadata, ListObjectsResponse, ObjectMetadata, StorageConfig};
use crate::error::{Error, HttpError};
use crate::http::{Params, Payload, Session, SyncSession};
use crate::shared::decode_json;

/// Blocking Storage client; mirrors [`client::Storage`](super::client::Storage).
pub struct Storage<S = SyncSession> {
    config: StorageConfig,
    session: S,
}

impl Storage<SyncSession> {
    pub fn new() -> Result<Self, Error> {
        let config = StorageConfig::builder().build()?;
        Ok(Self::with_session(config, SyncSession::new()))
    }
}

impl<S: Session> Storage<S> {
    pub fn with_session(config: StorageConfig, session: S) -> Self {
        Self { config, session }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn get_bucket(&self, bucket: &str) -> Result<BucketMetadata, Error> {
        let url = request::bucket_url(&self.config, bucket)?;
        let headers = request::auth_headers(&self.config);
        let resp = self.session.get(&url, &headers, self.config.timeout, None)?;
        decode_json(&resp.bytes().map_err(HttpError::from)?)
    }

    pub fn list_objects(&self, bucket: &str, params: Option<&Params>) -> Result<ListObjectsResponse, Error> {
        let url = request::objects_url(&self.config, bucket)?;
        let headers = request::auth_headers(&self.config);
        let resp = self.session.get(&url, &headers, self.config.timeout, params)?;
        decode_json(&resp.bytes().map_err(HttpError::from)?)
    }

    pub fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>, Error> {
        let url = request::object_url(&self.config, bucket, object)?;
        let headers = request::auth_headers(&self.config);
        let resp = self
            .session
            .get(&url, &headers, self.config.timeout, Some(&request::media_params()))?;
        Ok(resp.bytes().map_err(HttpError::from)?.to_vec())
    }

    pub fn download_metadata(&self, bucket: &str, object: &str) -> Result<ObjectMetadata, Error> {
        let url = request::object_url(&self.config, bucket, object)?;
        let headers = request::auth_headers(&self.config);
        let resp = self.session.get(&url, &headers, self.config.timeout, None)?;
        decode_json(&resp.bytes().map_err(HttpError::from)?)
    }

    pub fn upload(
        &self,
        bucket: &str,
        object: &str,
        data: Payload,
        content_type: &str,
    ) -> Result<ObjectMetadata, Error> {
        let mode = UploadMode::for_len(data.len());
        tracing::debug!(bucket, object, len = data.len(), ?mode, "uploading object");
        match mode {
            UploadMode::Simple => {
                let url = request::upload_url(&self.config, bucket)?;
                let params = request::upload_params(UploadMode::Simple, object)?;
                let headers = request::content_headers(&self.config, content_type);
                let resp = self
                    .session
                    .post(&url, &headers, data, self.config.timeout, Some(&params))?;
                decode_json(&resp.bytes().map_err(HttpError::from)?)
            }
            UploadMode::Resumable => self.upload_resumable(bucket, object, data, content_type),
        }
    }

    pub fn upload_resumable(
        &self,
        bucket: &str,
        object: &str,
        data: Payload,
        content_type: &str,
    ) -> Result<ObjectMetadata, Error> {
        let url = request::upload_url(&self.config, bucket)?;
        let params = request::upload_params(UploadMode::Resumable, object)?;
        let headers = request::resumable_start_headers(&self.config, content_type, data.len());
        let resp = self.session.post(
            &url,
            &headers,
            request::resumable_start_body(object)?,
            self.config.timeout,
            Some(&params),
        )?;
        let session_uri = request::session_uri(resp.headers().get(reqwest::header::LOCATION))?;

        let headers = request::content_headers(&self.config, content_type);
        let resp = self
            .session
            .put(&session_uri, &headers, data, self.config.timeout)?;
        decode_json(&resp.bytes().map_err(HttpError::from)?)
    }

    pub fn delete(&self, bucket: &str, object: &str, params: Option<&Params>) -> Result<(), Error> {
        let url = request::object_url(&self.config, bucket, object)?;
        let headers = request::auth_headers(&self.config);
        self.session
            .delete(&url, &headers, params, self.config.timeout)?;
        Ok(())
    }
}
