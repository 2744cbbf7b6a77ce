use serde::{Deserialize, Serialize};

use super::editor::{ContentBlock, CourseDraft};
use crate::content::{CourseContent, DocumentContent, VideoContent};

/// The normalized create payload. Built once per submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSubmission {
    pub title: String,
    pub description: String,
    pub content: Vec<CourseContent>,
}

impl From<&ContentBlock> for CourseContent {
    fn from(block: &ContentBlock) -> Self {
        match block {
            ContentBlock::Text(body) => CourseContent::Text(body.clone()),
            ContentBlock::Video(v) => CourseContent::Video(VideoContent {
                url: v.source_url.clone(),
                video_id: v.extracted_id.clone(),
            }),
            ContentBlock::Document(f) => CourseContent::Document(DocumentContent {
                name: f.name.clone(),
                url: f.url.clone().unwrap_or_default(),
                mime_type: f.mime_type.clone(),
            }),
        }
    }
}

pub fn format(draft: &CourseDraft) -> CourseSubmission {
    CourseSubmission {
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        content: draft.blocks().iter().map(CourseContent::from).collect(),
    }
}
