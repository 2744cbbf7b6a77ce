//! Course persistence.
//!
//! Handlers talk to a [`CourseStore`]; the Postgres implementation is used in
//! production and [`MemoryCourseStore`] backs tests and database-less runs.

mod memory;
mod postgres;

pub use memory::MemoryCourseStore;
pub use postgres::PgCourseStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Course, CourseListItem, NewCourse, UpdateCourseReq};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("a course with this title already exists")]
    DuplicateTitle,
    #[error("course {0} not found")]
    NotFound(Uuid),
    #[error("corrupt course record: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Listing filter; `search` is matched case-insensitively against title or
/// description.
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub search: Option<String>,
    pub offset: u64,
    pub limit: u64,
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Persist a new draft course. Title uniqueness is enforced here.
    async fn insert(&self, course: NewCourse) -> StoreResult<Course>;

    async fn find(&self, id: Uuid) -> StoreResult<Option<Course>>;

    /// One page of matching courses plus the total match count.
    async fn list(&self, filter: &CourseFilter) -> StoreResult<(Vec<CourseListItem>, u64)>;

    /// Replace the provided fields. Returns `NotFound` if the course vanished.
    async fn update(&self, id: Uuid, changes: UpdateCourseReq) -> StoreResult<Course>;

    /// Add `student` to the course's enrolled set; a repeat is a no-op.
    async fn enroll(&self, id: Uuid, student: Uuid) -> StoreResult<Course>;
}

pub(crate) fn matches_search(haystacks: [&str; 2], needle: &str) -> bool {
    let needle = needle.to_lowercase();
    haystacks.iter().any(|h| h.to_lowercase().contains(&needle))
}
