//! Cross-bucket presentation inheritance
//!
//! When one bundle identifier ends up in several buckets, the records stay separate but
//! should look the same: every record gets the best known icon and screenshots, and all of
//! them share one icon fallback list.

use super::bucket::push_unique;
use crate::domain::App;

/// Share icon and screenshots across the records of one bundle identifier
pub fn share_presentation(records: &mut [App]) {
    if records.len() < 2 {
        return;
    }

    let best_icon = records
        .iter()
        .map(|r| r.icon.as_str())
        .find(|icon| !icon.is_empty())
        .map(ToString::to_string);
    let best_screenshots = records
        .iter()
        .map(|r| &r.screenshots)
        .find(|shots| !shots.is_empty())
        .cloned();

    let mut shared_icons: Vec<String> = Vec::new();
    for record in records.iter() {
        for url in &record.icon_urls {
            push_unique(&mut shared_icons, url);
        }
        push_unique(&mut shared_icons, &record.icon);
    }

    for record in records.iter_mut() {
        if record.icon.is_empty() {
            if let Some(icon) = &best_icon {
                record.icon.clone_from(icon);
            }
        }
        if record.screenshots.is_empty() {
            if let Some(shots) = &best_screenshots {
                record.screenshots = shots.clone();
            }
        }
        record.icon_urls.clone_from(&shared_icons);
    }
}
