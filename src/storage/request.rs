//! URLs, query parameters and headers shared by both Storage clients.

use super::{StorageConfig, RESUMABLE_UPLOAD_THRESHOLD};
use crate::auth;
use crate::error::Error;
use crate::http::{Headers, Params, Payload};
use crate::shared::encode_segment;

/// How an upload is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// Single `uploadType=media` POST.
    Simple,
    /// `uploadType=resumable` session, then one PUT.
    Resumable,
}

impl UploadMode {
    pub fn for_len(len: usize) -> Self {
        if len > RESUMABLE_UPLOAD_THRESHOLD {
            UploadMode::Resumable
        } else {
            UploadMode::Simple
        }
    }
}

fn require(what: &str, value: &str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::Validation(format!("{} cannot be empty", what)));
    }
    Ok(())
}

/// `{api_root}/b/{bucket}`
pub(crate) fn bucket_url(config: &StorageConfig, bucket: &str) -> Result<String, Error> {
    require("bucket", bucket)?;
    Ok(format!("{}/b/{}", config.api_root, encode_segment(bucket)))
}

/// `{api_root}/b/{bucket}/o`
pub(crate) fn objects_url(config: &StorageConfig, bucket: &str) -> Result<String, Error> {
    Ok(format!("{}/o", bucket_url(config, bucket)?))
}

/// `{api_root}/b/{bucket}/o/{object}`, the object name as one encoded segment.
pub(crate) fn object_url(config: &StorageConfig, bucket: &str, object: &str) -> Result<String, Error> {
    require("object name", object)?;
    Ok(format!("{}/{}", objects_url(config, bucket)?, encode_segment(object)))
}

/// `{upload_root}/b/{bucket}/o`
pub(crate) fn upload_url(config: &StorageConfig, bucket: &str) -> Result<String, Error> {
    require("bucket", bucket)?;
    Ok(format!("{}/b/{}/o", config.upload_root, encode_segment(bucket)))
}

pub(crate) fn media_params() -> Params {
    Params::from([("alt".to_string(), "media".to_string())])
}

pub(crate) fn upload_params(mode: UploadMode, object: &str) -> Result<Params, Error> {
    require("object name", object)?;
    let upload_type = match mode {
        UploadMode::Simple => "media",
        UploadMode::Resumable => "resumable",
    };
    Ok(Params::from([
        ("uploadType".to_string(), upload_type.to_string()),
        ("name".to_string(), object.to_string()),
    ]))
}

/// Bearer header only, for media downloads and deletes.
pub(crate) fn auth_headers(config: &StorageConfig) -> Headers {
    let mut headers = Headers::new();
    auth::insert_bearer(&mut headers, config.token.as_ref());
    headers
}

/// Headers for the media body of a simple upload or a resumable PUT.
pub(crate) fn content_headers(config: &StorageConfig, content_type: &str) -> Headers {
    let mut headers = auth_headers(config);
    headers.insert("Content-Type".to_string(), content_type.to_string());
    headers
}

/// Headers that open a resumable session; the body is the JSON metadata.
pub(crate) fn resumable_start_headers(config: &StorageConfig, content_type: &str, len: usize) -> Headers {
    let mut headers = auth::json_headers(config.token.as_ref());
    headers.insert("X-Upload-Content-Type".to_string(), content_type.to_string());
    headers.insert("X-Upload-Content-Length".to_string(), len.to_string());
    headers
}

/// JSON metadata sent when opening a resumable session.
pub(crate) fn resumable_start_body(object: &str) -> Result<Payload, Error> {
    Ok(Payload::json(&serde_json::json!({ "name": object }))?)
}

/// Session URI from the `Location` header of a resumable start response.
pub(crate) fn session_uri(location: Option<&reqwest::header::HeaderValue>) -> Result<String, Error> {
    location
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Decode("resumable upload response has no Location header".to_string()))
}
