//! In-progress course drafts and the content-list editor around them.
//!
//! [`CourseDraft`] owns the ordered block list. [`DraftEditor`] adds the
//! single input buffer an authoring UI works through: one block is added or
//! edited at a time, and starting a new add/edit discards whatever was
//! pending.

use thiserror::Error;

use crate::content::{embed_url, extract_video_id, ContentKind};

use super::submission::{self, CourseSubmission};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("nothing to add: the input is empty")]
    EmptyInput,
    #[error("block {index} does not exist (draft has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("cannot turn a {expected} block into {found}")]
    KindMismatch {
        expected: ContentKind,
        found: ContentKind,
    },
    #[error("not a recognised YouTube URL")]
    InvalidVideoUrl,
    #[error("no block is being added or edited")]
    NothingPending,
    #[error("title and description are required")]
    MissingFields,
}

/// A file picked for a document block. `url` stays empty until uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub name: String,
    pub url: Option<String>,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoBlock {
    pub source_url: String,
    pub extracted_id: Option<String>,
    pub embed_url: Option<String>,
}

impl VideoBlock {
    /// The only place a video id is derived; the result is cached here.
    pub fn from_url(url: impl Into<String>) -> Self {
        let source_url = url.into();
        let extracted_id = extract_video_id(&source_url);
        let embed_url = extracted_id.as_deref().map(embed_url);
        Self {
            source_url,
            extracted_id,
            embed_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Text(String),
    Video(VideoBlock),
    Document(DocumentFile),
}

/// Raw user input for one block; the variant selects the block kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentInput {
    Text(String),
    Video(String),
    Document(DocumentFile),
}

impl ContentInput {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentInput::Text(_) => ContentKind::Text,
            ContentInput::Video(_) => ContentKind::Video,
            ContentInput::Document(_) => ContentKind::Document,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            ContentInput::Text(s) | ContentInput::Video(s) => s.trim().is_empty(),
            ContentInput::Document(f) => f.name.trim().is_empty(),
        }
    }
}

impl ContentBlock {
    pub fn from_input(input: ContentInput) -> Result<Self, EditorError> {
        if input.is_empty() {
            return Err(EditorError::EmptyInput);
        }
        Ok(match input {
            ContentInput::Text(body) => ContentBlock::Text(body),
            ContentInput::Video(url) => ContentBlock::Video(VideoBlock::from_url(url.trim())),
            ContentInput::Document(file) => ContentBlock::Document(file),
        })
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentBlock::Text(_) => ContentKind::Text,
            ContentBlock::Video(_) => ContentKind::Video,
            ContentBlock::Document(_) => ContentKind::Document,
        }
    }

    /// Inverse of [`ContentBlock::from_input`], used to preload an edit.
    pub fn to_input(&self) -> ContentInput {
        match self {
            ContentBlock::Text(body) => ContentInput::Text(body.clone()),
            ContentBlock::Video(v) => ContentInput::Video(v.source_url.clone()),
            ContentBlock::Document(f) => ContentInput::Document(f.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    blocks: Vec<ContentBlock>,
}

impl CourseDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Append a block built from `input`; returns its index.
    ///
    /// A video URL without a recognisable id still produces a block, with
    /// `extracted_id` left empty.
    pub fn add_block(&mut self, input: ContentInput) -> Result<usize, EditorError> {
        let block = ContentBlock::from_input(input)?;
        Ok(self.push_block(block))
    }

    fn push_block(&mut self, block: ContentBlock) -> usize {
        self.blocks.push(block);
        self.blocks.len() - 1
    }

    /// Replace the payload at `index`. Kind and position never change.
    pub fn edit_block(&mut self, index: usize, input: ContentInput) -> Result<(), EditorError> {
        let block = ContentBlock::from_input(input)?;
        self.replace_block(index, block)
    }

    fn replace_block(&mut self, index: usize, block: ContentBlock) -> Result<(), EditorError> {
        let len = self.blocks.len();
        let slot = self
            .blocks
            .get_mut(index)
            .ok_or(EditorError::IndexOutOfRange { index, len })?;
        if slot.kind() != block.kind() {
            return Err(EditorError::KindMismatch {
                expected: slot.kind(),
                found: block.kind(),
            });
        }
        *slot = block;
        Ok(())
    }

    pub fn delete_block(&mut self, index: usize) -> Result<ContentBlock, EditorError> {
        if index >= self.blocks.len() {
            return Err(EditorError::IndexOutOfRange {
                index,
                len: self.blocks.len(),
            });
        }
        Ok(self.blocks.remove(index))
    }

    pub fn has_required_fields(&self) -> bool {
        !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }
}

/// The pending add/edit.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InputBuffer {
    kind: ContentKind,
    current_text: String,
    current_file: Option<DocumentFile>,
    editing_index: Option<usize>,
}

impl InputBuffer {
    fn empty(kind: ContentKind, editing_index: Option<usize>) -> Self {
        Self {
            kind,
            current_text: String::new(),
            current_file: None,
            editing_index,
        }
    }

    fn to_input(&self) -> Option<ContentInput> {
        match self.kind {
            ContentKind::Text => Some(ContentInput::Text(self.current_text.clone())),
            ContentKind::Video => Some(ContentInput::Video(self.current_text.clone())),
            ContentKind::Document => self.current_file.clone().map(ContentInput::Document),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DraftEditor {
    draft: CourseDraft,
    buffer: Option<InputBuffer>,
}

impl DraftEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &CourseDraft {
        &self.draft
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    pub fn pending_kind(&self) -> Option<ContentKind> {
        self.buffer.as_ref().map(|b| b.kind)
    }

    pub fn editing_index(&self) -> Option<usize> {
        self.buffer.as_ref().and_then(|b| b.editing_index)
    }

    pub fn current_text(&self) -> Option<&str> {
        self.buffer.as_ref().map(|b| b.current_text.as_str())
    }

    pub fn current_file(&self) -> Option<&DocumentFile> {
        self.buffer.as_ref().and_then(|b| b.current_file.as_ref())
    }

    /// Append a block directly, bypassing the input buffer. A pending edit
    /// keeps pointing at its block since appends never shift indices.
    pub fn add_block(&mut self, input: ContentInput) -> Result<usize, EditorError> {
        self.draft.add_block(input)
    }

    /// Start adding a block of `kind`, dropping any pending add/edit.
    pub fn begin_add(&mut self, kind: ContentKind) {
        self.buffer = Some(InputBuffer::empty(kind, None));
    }

    /// Start editing `index`, preloading the buffer from the block.
    pub fn begin_edit(&mut self, index: usize) -> Result<(), EditorError> {
        self.buffer = None;
        let block = self
            .draft
            .blocks
            .get(index)
            .ok_or(EditorError::IndexOutOfRange {
                index,
                len: self.draft.blocks.len(),
            })?;

        let mut buffer = InputBuffer::empty(block.kind(), Some(index));
        match block.to_input() {
            ContentInput::Text(s) | ContentInput::Video(s) => buffer.current_text = s,
            ContentInput::Document(f) => buffer.current_file = Some(f),
        }
        self.buffer = Some(buffer);
        Ok(())
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), EditorError> {
        let buffer = self.buffer.as_mut().ok_or(EditorError::NothingPending)?;
        buffer.current_text = text.into();
        Ok(())
    }

    pub fn set_file(&mut self, file: DocumentFile) -> Result<(), EditorError> {
        let buffer = self.buffer.as_mut().ok_or(EditorError::NothingPending)?;
        buffer.current_file = Some(file);
        Ok(())
    }

    /// Whether [`DraftEditor::commit`] would accept the buffer.
    pub fn can_commit(&self) -> bool {
        self.check_buffer().is_ok()
    }

    /// Build the block the buffer would commit.
    fn check_buffer(&self) -> Result<ContentBlock, EditorError> {
        let buffer = self.buffer.as_ref().ok_or(EditorError::NothingPending)?;
        let input = buffer.to_input().ok_or(EditorError::EmptyInput)?;
        let block = ContentBlock::from_input(input)?;
        if let ContentBlock::Video(VideoBlock {
            extracted_id: None, ..
        }) = &block
        {
            return Err(EditorError::InvalidVideoUrl);
        }
        Ok(block)
    }

    /// Apply the buffer as an add or an edit and clear it. Returns the index
    /// of the affected block. On error the buffer is left as it was.
    pub fn commit(&mut self) -> Result<usize, EditorError> {
        let block = self.check_buffer()?;
        let index = match self.editing_index() {
            Some(index) => {
                self.draft.replace_block(index, block)?;
                index
            }
            None => self.draft.push_block(block),
        };
        self.buffer = None;
        Ok(index)
    }

    pub fn cancel(&mut self) {
        self.buffer = None;
    }

    /// Delete `index`. A pending edit of that block is cancelled and a pending
    /// edit further down follows its block to the new index.
    pub fn delete_block(&mut self, index: usize) -> Result<ContentBlock, EditorError> {
        let removed = self.draft.delete_block(index)?;
        match self.editing_index() {
            Some(i) if i == index => self.buffer = None,
            Some(i) if i > index => {
                if let Some(buffer) = self.buffer.as_mut() {
                    buffer.editing_index = Some(i - 1);
                }
            }
            _ => {}
        }
        Ok(removed)
    }

    /// Build the payload for `POST /courses`, refusing an incomplete draft.
    pub fn submission(&self) -> Result<CourseSubmission, EditorError> {
        if !self.draft.has_required_fields() {
            return Err(EditorError::MissingFields);
        }
        Ok(submission::format(&self.draft))
    }
}
