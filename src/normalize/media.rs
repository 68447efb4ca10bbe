//! Screenshot and permission normalization

use serde_json::Value as JsonValue;

use super::rules::{self, Record};
use crate::domain::{Permission, Screenshots};

/// Screenshot URL from a bare string or an object carrying a URL field
fn screenshot_url(item: &JsonValue) -> Option<String> {
    match item {
        JsonValue::String(url) if !url.trim().is_empty() => Some(url.clone()),
        JsonValue::Object(obj) => rules::SCREENSHOT_URL.text(obj),
        _ => None,
    }
}

fn screenshot_urls(list: Option<&JsonValue>) -> Vec<String> {
    list.and_then(JsonValue::as_array)
        .map(|items| items.iter().filter_map(screenshot_url).collect())
        .unwrap_or_default()
}

/// Normalize a screenshot declaration
///
/// A flat list is treated as phone screenshots; an object may carry `iphone` and `ipad` lists.
pub fn screenshots(value: Option<&JsonValue>) -> Screenshots {
    match value {
        Some(JsonValue::Array(_)) => Screenshots {
            phone_images: screenshot_urls(value),
            tablet_images: Vec::new(),
        },
        Some(JsonValue::Object(obj)) => Screenshots {
            phone_images: screenshot_urls(obj.get("iphone")),
            tablet_images: screenshot_urls(obj.get("ipad")),
        },
        _ => Screenshots::default(),
    }
}

/// Permission entries from a list of objects or a name → description map
fn permission_entries(value: &JsonValue) -> Vec<Permission> {
    match value {
        JsonValue::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                JsonValue::Object(obj) => {
                    let name = rules::PERMISSION_NAME.text(obj)?;
                    let text = rules::PERMISSION_TEXT.text(obj).unwrap_or_default();
                    Some(Permission { name, text })
                }
                JsonValue::String(name) if !name.trim().is_empty() => Some(Permission {
                    name: name.clone(),
                    text: String::new(),
                }),
                _ => None,
            })
            .collect(),
        JsonValue::Object(map) => map
            .iter()
            .filter_map(|(name, text)| {
                text.as_str().map(|text| Permission {
                    name: name.clone(),
                    text: text.to_string(),
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn non_empty(entries: Vec<Permission>) -> Option<Vec<Permission>> {
    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}

/// Privacy permissions declared by a record
///
/// Reads the `privacy` sub-object when present, otherwise the declaration itself. Nothing
/// declared yields `None`.
pub fn permissions(record: &Record) -> Option<Vec<Permission>> {
    let declaration = rules::PERMISSIONS.value(record)?;
    let privacy = declaration
        .get("privacy")
        .filter(|v| !v.is_null())
        .unwrap_or(declaration);
    non_empty(permission_entries(privacy))
}

/// Entitlements declared under the permission declaration's `entitlements` key
pub fn entitlements(record: &Record) -> Option<Vec<Permission>> {
    let declaration = rules::PERMISSIONS.value(record)?;
    non_empty(permission_entries(declaration.get("entitlements")?))
}
