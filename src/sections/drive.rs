//! Drive section: links to each client's document folder
//!
//! Links are built from the stored folder id and a configured base URL; no
//! call is made to the storage product.

use crate::sync::ViewState;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveLink {
    pub client_id: String,
    pub client_name: String,
    pub folder_id: String,
    pub url: String,
}

/// Links for clients with a folder, plus the clients still missing one
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveIndex {
    pub links: Vec<DriveLink>,
    /// `(client_id, name)` of clients without a folder
    pub missing: Vec<(String, String)>,
}

pub fn folder_url(base_url: &str, folder_id: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), folder_id.trim())
}

/// Folder id from a pasted folder URL, or the input itself when it already
/// looks like an id
pub fn extract_folder_id(input: &str) -> Option<String> {
    static FOLDER_URL: OnceLock<Regex> = OnceLock::new();
    static BARE_ID: OnceLock<Regex> = OnceLock::new();

    let input = input.trim();
    let folder_url =
        FOLDER_URL.get_or_init(|| Regex::new(r"/folders/([A-Za-z0-9_-]+)").expect("valid regex"));
    if let Some(captures) = folder_url.captures(input) {
        return Some(captures[1].to_string());
    }

    let bare_id = BARE_ID.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"));
    bare_id.is_match(input).then(|| input.to_string())
}

pub fn index(view: &ViewState, base_url: &str) -> DriveIndex {
    let mut index = DriveIndex::default();
    for client in &view.clients {
        match client.drive_folder_id.as_deref().map(str::trim) {
            Some(folder_id) if !folder_id.is_empty() => index.links.push(DriveLink {
                client_id: client.id.clone(),
                client_name: client.name.clone(),
                folder_id: folder_id.to_string(),
                url: folder_url(base_url, folder_id),
            }),
            _ => index.missing.push((client.id.clone(), client.name.clone())),
        }
    }
    index
}
