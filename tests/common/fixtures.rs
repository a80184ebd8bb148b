#![allow(dead_code)]

use cuestore::model::MediaItem;

pub fn media_item(id: &str) -> MediaItem {
    MediaItem::new(id)
        .with_title(format!("Track {id}"))
        .with_artist("Test Artist")
}

pub fn media_items(count: usize) -> Vec<MediaItem> {
    (0..count).map(|i| media_item(&format!("media-{i:03}"))).collect()
}
