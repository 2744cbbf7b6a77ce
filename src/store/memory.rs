use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{matches_search, CourseFilter, CourseStore, StoreError, StoreResult};
use crate::models::{Course, CourseListItem, CreatorSummary, NewCourse, UpdateCourseReq, User};

#[derive(Default)]
struct Inner {
    // insertion order doubles as creation order
    courses: Vec<Course>,
    users: HashMap<Uuid, User>,
}

/// Process-local store with the same contract as the Postgres one.
#[derive(Default)]
pub struct MemoryCourseStore {
    inner: Mutex<Inner>,
}

impl MemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a user resolvable as a course creator.
    pub fn add_user(&self, user: User) {
        let mut inner = self.lock();
        inner.users.insert(user.id, user);
    }

    pub fn len(&self) -> usize {
        self.lock().courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // a panicked writer leaves whole records behind, never half of one
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn title_taken(courses: &[Course], title: &str, except: Option<Uuid>) -> bool {
    courses
        .iter()
        .any(|c| c.title == title && Some(c.id) != except)
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    async fn insert(&self, course: NewCourse) -> StoreResult<Course> {
        let mut inner = self.lock();
        if title_taken(&inner.courses, &course.title, None) {
            return Err(StoreError::DuplicateTitle);
        }
        let now = Utc::now();
        let record = Course {
            id: Uuid::new_v4(),
            title: course.title,
            description: course.description,
            content: course.content,
            creator: course.creator,
            enrollment_status: Default::default(),
            enrolled_students: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        inner.courses.push(record.clone());
        Ok(record)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Course>> {
        Ok(self.lock().courses.iter().find(|c| c.id == id).cloned())
    }

    async fn list(&self, filter: &CourseFilter) -> StoreResult<(Vec<CourseListItem>, u64)> {
        let inner = self.lock();
        let matching: Vec<&Course> = inner
            .courses
            .iter()
            .filter(|c| match filter.search.as_deref() {
                Some(term) => matches_search([c.title.as_str(), c.description.as_str()], term),
                None => true,
            })
            .collect();
        let total = matching.len() as u64;

        let items = matching
            .into_iter()
            .skip(usize::try_from(filter.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(filter.limit).unwrap_or(usize::MAX))
            .map(|c| CourseListItem {
                id: c.id,
                title: c.title.clone(),
                description: c.description.clone(),
                content: c.content.clone(),
                creator: inner.users.get(&c.creator).map(|u| CreatorSummary {
                    name: u.name.clone(),
                    email: u.email.clone(),
                }),
                enrollment_status: c.enrollment_status,
                enrolled_students: c.enrolled_students.clone(),
                created_at: c.created_at,
                updated_at: c.updated_at,
            })
            .collect();

        Ok((items, total))
    }

    async fn update(&self, id: Uuid, changes: UpdateCourseReq) -> StoreResult<Course> {
        let mut inner = self.lock();
        if let Some(title) = changes.title.as_deref() {
            if title_taken(&inner.courses, title, Some(id)) {
                return Err(StoreError::DuplicateTitle);
            }
        }
        let course = inner
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if let Some(title) = changes.title {
            course.title = title;
        }
        if let Some(description) = changes.description {
            course.description = description;
        }
        if let Some(content) = changes.content {
            course.content = content;
        }
        if let Some(status) = changes.enrollment_status {
            course.enrollment_status = status;
        }
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    async fn enroll(&self, id: Uuid, student: Uuid) -> StoreResult<Course> {
        let mut inner = self.lock();
        let course = inner
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if !course.enrolled_students.contains(&student) {
            course.enrolled_students.push(student);
            course.updated_at = Utc::now();
        }
        Ok(course.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnrollmentStatus;

    fn new_course(title: &str, description: &str, creator: Uuid) -> NewCourse {
        NewCourse {
            title: title.into(),
            description: description.into(),
            content: Vec::new(),
            creator,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_draft_status() {
        let store = MemoryCourseStore::new();
        let creator = Uuid::new_v4();
        let course = store.insert(new_course("Rust 101", "Ownership", creator)).await.unwrap();
        assert_eq!(course.creator, creator);
        assert_eq!(course.enrollment_status, EnrollmentStatus::Draft);
        assert_eq!(course.created_at, course.updated_at);
        assert_eq!(store.find(course.id).await.unwrap(), Some(course));
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected_on_insert_and_update() {
        let store = MemoryCourseStore::new();
        let creator = Uuid::new_v4();
        store.insert(new_course("Rust 101", "a", creator)).await.unwrap();
        let other = store.insert(new_course("Go 101", "b", creator)).await.unwrap();

        assert!(matches!(
            store.insert(new_course("Rust 101", "c", creator)).await,
            Err(StoreError::DuplicateTitle)
        ));
        let rename = UpdateCourseReq {
            title: Some("Rust 101".into()),
            ..Default::default()
        };
        assert!(matches!(store.update(other.id, rename).await, Err(StoreError::DuplicateTitle)));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn keeping_own_title_is_not_a_conflict() {
        let store = MemoryCourseStore::new();
        let course = store.insert(new_course("Rust 101", "a", Uuid::new_v4())).await.unwrap();
        let same = UpdateCourseReq {
            title: Some("Rust 101".into()),
            enrollment_status: Some(EnrollmentStatus::Open),
            ..Default::default()
        };
        let updated = store.update(course.id, same).await.unwrap();
        assert_eq!(updated.enrollment_status, EnrollmentStatus::Open);
    }

    #[tokio::test]
    async fn list_filters_case_insensitively_and_resolves_creator() {
        let store = MemoryCourseStore::new();
        let creator = Uuid::new_v4();
        store.add_user(User {
            id: creator,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: "teacher".into(),
        });
        store.insert(new_course("Intro to RUST", "basics", creator)).await.unwrap();
        store.insert(new_course("Cooking", "rusty pans", Uuid::new_v4())).await.unwrap();
        store.insert(new_course("Painting", "colour", creator)).await.unwrap();

        let filter = CourseFilter {
            search: Some("rust".into()),
            offset: 0,
            limit: 10,
        };
        let (items, total) = store.list(&filter).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(items[0].title, "Intro to RUST");
        assert_eq!(
            items[0].creator,
            Some(CreatorSummary { name: "Ada".into(), email: "ada@example.com".into() })
        );
        assert_eq!(items[1].creator, None);
    }

    #[tokio::test]
    async fn enroll_is_idempotent() {
        let store = MemoryCourseStore::new();
        let course = store.insert(new_course("Rust 101", "a", Uuid::new_v4())).await.unwrap();
        let student = Uuid::new_v4();
        store.enroll(course.id, student).await.unwrap();
        let again = store.enroll(course.id, student).await.unwrap();
        assert_eq!(again.enrolled_students, vec![student]);

        let missing = Uuid::new_v4();
        assert!(matches!(store.enroll(missing, student).await, Err(StoreError::NotFound(id)) if id == missing));
    }
}
