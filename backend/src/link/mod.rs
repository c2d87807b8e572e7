//! Shareable link → direct download URL.
//!
//! Google Drive share links embed the file identifier somewhere in the path or
//! query (`/file/d/<id>/view`, `open?id=<id>`). Any run of 25 or more word
//! characters or hyphens is taken as the identifier; the first one wins.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::LinkError;

const DOWNLOAD_BASE: &str = "https://drive.google.com/uc?export=download&id=";

static FILE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\w]{25,}").expect("valid file id pattern"));

/// A resolved link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveLink {
    pub file_id: String,
    pub download_url: String,
}

/// Extract the file identifier from `input` and build its download URL.
pub fn resolve_link(input: &str) -> Result<DriveLink, LinkError> {
    let file_id = FILE_ID
        .find(input)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| LinkError::NoIdentifier(input.to_string()))?;

    Ok(DriveLink {
        download_url: format!("{}{}", DOWNLOAD_BASE, file_id),
        file_id,
    })
}
