//! Service URL constants and emulator discovery.

/// Datastore REST API root.
pub const DATASTORE_API_ROOT: &str = "https://datastore.googleapis.com/v1";

/// Cloud Storage JSON API root.
pub const STORAGE_API_ROOT: &str = "https://www.googleapis.com/storage/v1";

/// Cloud Storage media upload root.
pub const STORAGE_UPLOAD_ROOT: &str = "https://www.googleapis.com/upload/storage/v1";

/// `host:port` of a local Datastore emulator.
pub const DATASTORE_EMULATOR_HOST: &str = "DATASTORE_EMULATOR_HOST";

/// Base URL (or `host:port`) of a local Storage emulator.
pub const STORAGE_EMULATOR_HOST: &str = "STORAGE_EMULATOR_HOST";

/// Datastore API root for an emulator at `host`.
pub fn datastore_emulator_root(host: &str) -> String {
    format!("{}/v1", with_scheme(host))
}

/// Storage `(api_root, upload_root)` for an emulator at `host`.
pub fn storage_emulator_roots(host: &str) -> (String, String) {
    let base = with_scheme(host);
    (
        format!("{}/storage/v1", base),
        format!("{}/upload/storage/v1", base),
    )
}

/// Reads an emulator host variable, ignoring empty values.
pub(crate) fn emulator_host(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn with_scheme(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}
