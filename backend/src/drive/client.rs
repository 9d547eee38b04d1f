//! Google Drive v3 REST client.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use codelab::drive::{DriveClient, StorageUploader};
//!
//! let client = DriveClient::from_env()?;
//! let folder = client.create_folder("Class 4B", None).await?;
//! let id = client.upload(Path::new("out/students.jsonl"), "students.jsonl", Some(&folder)).await?;
//! ```

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;
use std::path::Path;

use super::StorageUploader;
use crate::error::{DriveError, DriveResult};

const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";
const DEFAULT_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Mime type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

const BOUNDARY_PREFIX: &str = "codelab_upload_";
const BOUNDARY_RANDOM_LEN: usize = 24;

/// Drive settings read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// OAuth access token (`GOOGLE_DRIVE_ACCESS_TOKEN`)
    pub access_token: String,
    /// Default parent folder (`GOOGLE_DRIVE_PARENT_ID`)
    pub parent_id: Option<String>,
}

impl DriveConfig {
    pub fn from_env() -> DriveResult<Self> {
        let _ = dotenvy::dotenv();

        let access_token = env::var("GOOGLE_DRIVE_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(DriveError::MissingToken)?;
        let parent_id = env::var("GOOGLE_DRIVE_PARENT_ID")
            .ok()
            .filter(|p| !p.trim().is_empty());

        Ok(Self {
            access_token,
            parent_id,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DriveErrorBody {
    error: DriveErrorDetail,
}

#[derive(Debug, Deserialize)]
struct DriveErrorDetail {
    message: String,
}

/// Google Drive client
#[derive(Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    access_token: String,
    api_base: String,
    upload_base: String,
}

impl DriveClient {
    pub fn new(access_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token,
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
        }
    }

    pub fn from_config(config: &DriveConfig) -> Self {
        Self::new(config.access_token.clone())
    }

    /// Create a client from `GOOGLE_DRIVE_ACCESS_TOKEN`
    pub fn from_env() -> DriveResult<Self> {
        Ok(Self::from_config(&DriveConfig::from_env()?))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> DriveResult<String> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DriveError::HttpError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DriveError::HttpError(e.to_string()))?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        parse_id(&body)
    }
}

#[async_trait]
impl StorageUploader for DriveClient {
    async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> DriveResult<String> {
        let metadata = file_metadata(name, Some(FOLDER_MIME_TYPE), parent_id);
        let request = self
            .http
            .post(format!("{}/files", self.api_base))
            .query(&[("fields", "id")])
            .json(&metadata);

        self.send(request).await
    }

    async fn upload(
        &self,
        local_path: &Path,
        remote_name: &str,
        parent_id: Option<&str>,
    ) -> DriveResult<String> {
        let content = tokio::fs::read(local_path).await?;
        let metadata = file_metadata(remote_name, None, parent_id);
        let boundary = pick_boundary(&mut rand::thread_rng(), &content);
        let body = multipart_related_body(&boundary, &metadata, mime_for(local_path), &content);

        let request = self
            .http
            .post(format!("{}/files", self.upload_base))
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body);

        self.send(request).await
    }
}

/// Drive file metadata. `parents` is omitted for the root folder.
fn file_metadata(name: &str, mime_type: Option<&str>, parent_id: Option<&str>) -> Value {
    let mut metadata = json!({ "name": name });
    if let Some(mime) = mime_type {
        metadata["mimeType"] = json!(mime);
    }
    if let Some(parent) = parent_id {
        metadata["parents"] = json!([parent]);
    }
    metadata
}

/// Random multipart boundary that does not occur in `content`.
fn pick_boundary<R: Rng>(rng: &mut R, content: &[u8]) -> String {
    loop {
        let suffix: String = (0..BOUNDARY_RANDOM_LEN)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect();
        let boundary = format!("{}{}", BOUNDARY_PREFIX, suffix);
        if !contains(content, boundary.as_bytes()) {
            return boundary;
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Body for `uploadType=multipart`: a JSON metadata part then the media part.
fn multipart_related_body(boundary: &str, metadata: &Value, mime: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 256);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{m}\r\n--{b}\r\nContent-Type: {t}\r\n\r\n",
            b = boundary,
            m = metadata,
            t = mime
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jsonl") | Some("ndjson") => "application/x-ndjson",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn parse_id(body: &str) -> DriveResult<String> {
    serde_json::from_str::<CreatedFile>(body)
        .map(|f| f.id)
        .map_err(|e| DriveError::InvalidResponse(format!("{}: {}", e, truncate(body))))
}

fn api_error(status: u16, body: &str) -> DriveError {
    let message = serde_json::from_str::<DriveErrorBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| truncate(body).to_string());
    DriveError::ApiError { status, message }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(500) {
        Some((i, _)) => &body[..i],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_folder_metadata() {
        let metadata = file_metadata("Class 4B", Some(FOLDER_MIME_TYPE), Some("root-id"));
        assert_eq!(metadata["name"], "Class 4B");
        assert_eq!(metadata["mimeType"], FOLDER_MIME_TYPE);
        assert_eq!(metadata["parents"][0], "root-id");
    }

    #[test]
    fn test_metadata_without_parent() {
        let metadata = file_metadata("a.csv", None, None);
        assert!(metadata.get("parents").is_none());
        assert!(metadata.get("mimeType").is_none());
    }

    #[test]
    fn test_multipart_body_layout() {
        let metadata = file_metadata("a.jsonl", None, Some("p"));
        let body = multipart_related_body("xyz", &metadata, "application/x-ndjson", b"{\"id\":0}\n");
        let text = String::from_utf8(body).unwrap();

        assert!(text.starts_with("--xyz\r\nContent-Type: application/json"));
        assert!(text.contains(r#""name":"a.jsonl""#));
        assert!(text.contains("Content-Type: application/x-ndjson\r\n\r\n{\"id\":0}\n\r\n"));
        assert!(text.ends_with("--xyz--\r\n"));
    }

    #[test]
    fn test_boundary_absent_from_content() {
        let content = b"line one\r\n--codelab_upload_boundary--\r\nhidden tail";
        let mut rng = StdRng::seed_from_u64(7);
        let boundary = pick_boundary(&mut rng, content);

        assert!(boundary.starts_with(BOUNDARY_PREFIX));
        assert!(!contains(content, boundary.as_bytes()));

        let metadata = file_metadata("notes.txt", None, None);
        let body = multipart_related_body(&boundary, &metadata, "text/plain", content);
        let text = String::from_utf8(body).unwrap();
        let delimiter = format!("\r\n--{}", boundary);
        let parts: Vec<_> = text.split(delimiter.as_str()).collect();

        // metadata, media, closing "--\r\n"
        assert_eq!(parts.len(), 3);
        assert!(parts[1].ends_with("line one\r\n--codelab_upload_boundary--\r\nhidden tail"));
        assert_eq!(parts[2], "--\r\n");
    }

    #[test]
    fn test_boundaries_differ_per_request() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_ne!(pick_boundary(&mut rng, b""), pick_boundary(&mut rng, b""));
    }

    #[test]
    fn test_contains() {
        assert!(contains(b"abc--xyz--", b"--xyz"));
        assert!(!contains(b"abc", b"abcd"));
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for(Path::new("out/students.jsonl")), "application/x-ndjson");
        assert_eq!(mime_for(Path::new("roster.CSV")), "text/csv");
        assert_eq!(mime_for(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(r#"{"id":"abc123"}"#).unwrap(), "abc123");
        assert!(matches!(parse_id("{}"), Err(DriveError::InvalidResponse(_))));
    }

    #[test]
    fn test_api_error_message_extracted() {
        let body = r#"{"error":{"code":401,"message":"Invalid Credentials"}}"#;
        match api_error(401, body) {
            DriveError::ApiError { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid Credentials");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_api_error_raw_body_fallback() {
        match api_error(502, "Bad Gateway") {
            DriveError::ApiError { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
