//! Multipart document upload.
//!
//! Accepts the bytes, names them, writes them under the upload directory
//! and records the document through the exchange service. The stored
//! filename doubles as the document's storage reference.

use std::path::Path as FsPath;
use std::str::FromStr;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use chrono::{DateTime, Local};
use satchel::store::Store;
use satchel::{DocumentId, IdentityId, MediaKind};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::extract::Authed;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: DocumentId,
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// POST /api/upload
///
/// Multipart fields: `file` (required), `type` (required media kind),
/// `recipientId` (optional). Naming a recipient grants them access and
/// pushes a delivery notice; it also switches the stored filename to the
/// `{sender}_to_{recipient}_{timestamp}` scheme.
pub async fn upload<S: Store>(
    State(state): State<AppState<S>>,
    Authed(session): Authed,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut file: Option<(String, Bytes)> = None;
    let mut kind: Option<String> = None;
    let mut recipient: Option<IdentityId> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name() {
            Some("file") => {
                let original = field.file_name().unwrap_or("upload.bin").to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((original, bytes));
            }
            Some("type") => kind = Some(field.text().await.map_err(bad_multipart)?),
            Some("recipientId") => {
                let raw = field.text().await.map_err(bad_multipart)?;
                let id = raw.parse::<i64>().map_err(|_| {
                    ApiError::BadRequest(format!("invalid recipientId: {}", raw))
                })?;
                recipient = Some(IdentityId::new(id));
            }
            _ => {}
        }
    }

    let Some((original, bytes)) = file else {
        return Err(ApiError::BadRequest("No file uploaded.".to_string()));
    };
    let kind = kind.ok_or_else(|| ApiError::BadRequest("missing media type".to_string()))?;
    let kind = MediaKind::from_str(&kind).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    // Resolve names before any bytes hit the disk so an unknown
    // recipient leaves nothing behind.
    let filename = match recipient {
        Some(recipient_id) => {
            let sender = state.service.identity(session.identity_id).await?;
            let target = state.service.identity(recipient_id).await?;
            recipient_filename(&sender.username, &target.username, &original, Local::now())
        }
        None => deposit_filename(&original),
    };

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(write_failed)?;
    tokio::fs::write(state.upload_dir.join(&filename), &bytes)
        .await
        .map_err(write_failed)?;

    let document = state
        .service
        .submit(session.identity_id, kind, &filename, recipient)
        .await?;

    info!(
        owner = %session.username,
        document = document.id.as_i64(),
        filename = %filename,
        "document stored"
    );
    Ok(Json(UploadResponse {
        id: document.id,
        filename,
        kind,
    }))
}

/// `{sender}_to_{recipient}_{YYYYMMDD_HHMM}{ext}` with both usernames
/// reduced to `[A-Za-z0-9_]`.
fn recipient_filename(
    sender: &str,
    recipient: &str,
    original: &str,
    at: DateTime<Local>,
) -> String {
    format!(
        "{}_to_{}_{}{}",
        sanitize(sender),
        sanitize(recipient),
        at.format("%Y%m%d_%H%M"),
        extension(original)
    )
}

/// `{unix_millis}-{random}-{stem}{ext}` for deposits without a recipient.
/// The client-picked stem gets the same `[A-Za-z0-9_]` reduction as the
/// usernames; path fragments in it never reach the disk.
fn deposit_filename(original: &str) -> String {
    use rand::Rng;
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let stem = FsPath::new(original)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "{}-{}-{}{}",
        now_millis(),
        suffix,
        sanitize(&stem),
        extension(original)
    )
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn extension(original: &str) -> String {
    match FsPath::new(original).extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => String::new(),
    }
}

fn bad_multipart(err: MultipartError) -> ApiError {
    ApiError::BadRequest(format!("malformed multipart body: {}", err))
}

fn write_failed(err: std::io::Error) -> ApiError {
    ApiError::Internal(format!("upload write failed: {}", err))
}

/// Get current time in milliseconds.
fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as u64
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_recipient_filename_scheme() {
        let at = Local.with_ymd_and_hms(2026, 3, 9, 14, 5, 0).unwrap();
        let name = recipient_filename("Ana Maria", "bob!", "map of site.png", at);
        assert_eq!(name, "Ana_Maria_to_bob__20260309_1405.png");
    }

    #[test]
    fn test_recipient_filename_without_extension() {
        let at = Local.with_ymd_and_hms(2026, 3, 9, 14, 5, 0).unwrap();
        let name = recipient_filename("ana", "bob", "README", at);
        assert_eq!(name, "ana_to_bob_20260309_1405");
    }

    #[test]
    fn test_deposit_filename_keeps_original_name() {
        let name = deposit_filename("notes.txt");
        assert!(name.ends_with("-notes.txt"));
        let mut parts = name.splitn(3, '-');
        assert!(parts.next().unwrap().parse::<u64>().is_ok());
        assert!(parts.next().unwrap().parse::<u32>().is_ok());
        assert_eq!(parts.next().unwrap(), "notes.txt");
    }

    #[test]
    fn test_deposit_filename_confines_client_names() {
        let name = deposit_filename("../../etc/passwd");
        assert!(!name.contains('/'));
        assert!(name.ends_with("-passwd"));

        let name = deposit_filename("map of site.png");
        assert!(name.ends_with("-map_of_site.png"));
    }

    #[test]
    fn test_sanitize_replaces_non_alphanumerics() {
        assert_eq!(sanitize("a b/c.d"), "a_b_c_d");
        assert_eq!(sanitize("Rook42"), "Rook42");
    }
}
