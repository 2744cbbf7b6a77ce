//! Course content blocks as they travel over the wire and sit in the store.
//!
//! A course's content is an ordered list of [`CourseContent`] values, each an
//! adjacently tagged `{ "type": ..., "data": ... }` object. The set of kinds is
//! closed; anything else is rejected at deserialization time.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const EMBED_BASE: &str = "https://www.youtube.com/embed/";
const VIDEO_ID_LEN: usize = 11;

// youtu.be/<id>, /v/<id>, /u/<c>/<id>, /embed/<id>, watch?v=<id>, &v=<id>
static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Video,
    Document,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ContentKind::Text => "text",
            ContentKind::Video => "video",
            ContentKind::Document => "document",
        })
    }
}

/// One persisted content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum CourseContent {
    Text(String),
    Video(VideoContent),
    Document(DocumentContent),
}

impl CourseContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            CourseContent::Text(_) => ContentKind::Text,
            CourseContent::Video(_) => ContentKind::Video,
            CourseContent::Document(_) => ContentKind::Document,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContent {
    pub url: String,
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContent {
    pub name: String,
    /// Empty while the upload is still pending.
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
}

/// Pull the 11 character video id out of a YouTube URL.
///
/// Returns `None` when the URL is not in a recognised form or the captured id
/// has the wrong length.
pub fn extract_video_id(url: &str) -> Option<String> {
    let caps = VIDEO_URL.captures(url)?;
    let id = caps.get(2)?.as_str();
    (id.chars().count() == VIDEO_ID_LEN).then(|| id.to_string())
}

pub fn embed_url(video_id: &str) -> String {
    format!("{EMBED_BASE}{video_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_id_from_common_url_forms() {
        for url in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ?start=10",
            "https://www.youtube.com/v/dQw4w9WgXcQ#t=3",
        ] {
            assert_eq!(extract_video_id(url).as_deref(), Some("dQw4w9WgXcQ"), "{url}");
        }
    }

    #[test]
    fn rejects_unrecognised_or_short_ids() {
        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id("https://youtu.be/short"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn wire_shape_is_type_and_data() {
        let items = vec![
            CourseContent::Text("Intro".into()),
            CourseContent::Video(VideoContent {
                url: "https://youtu.be/dQw4w9WgXcQ".into(),
                video_id: Some("dQw4w9WgXcQ".into()),
            }),
        ];
        let value = serde_json::to_value(&items).unwrap();
        assert_eq!(
            value,
            json!([
                { "type": "text", "data": "Intro" },
                { "type": "video", "data": { "url": "https://youtu.be/dQw4w9WgXcQ", "videoId": "dQw4w9WgXcQ" } }
            ])
        );
    }

    #[test]
    fn document_defaults_missing_url_and_type() {
        let doc: CourseContent =
            serde_json::from_value(json!({ "type": "document", "data": { "name": "syllabus.pdf" } }))
                .unwrap();
        assert_eq!(
            doc,
            CourseContent::Document(DocumentContent {
                name: "syllabus.pdf".into(),
                url: String::new(),
                mime_type: String::new(),
            })
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let res: Result<CourseContent, _> =
            serde_json::from_value(json!({ "type": "quiz", "data": {} }));
        assert!(res.is_err());
    }
}
