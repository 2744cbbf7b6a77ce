//! Course create / list / update / enroll, independent of HTTP.
//!
//! Every function validates before it touches the store, so a rejected request
//! never produces a write.

use uuid::Uuid;

use crate::auth::Principal;
use crate::error::{AppError, AppResult, Forbidden};
use crate::models::{
    Course, CoursePage, CreateCourseReq, ListCoursesQuery, NewCourse, UpdateCourseReq,
};
use crate::store::{CourseFilter, CourseStore};

const MISSING_FIELDS: &str = "Title and description are required";

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub async fn create(
    store: &dyn CourseStore,
    principal: &Principal,
    req: CreateCourseReq,
) -> AppResult<Course> {
    let (Some(title), Some(description)) = (non_blank(req.title), non_blank(req.description))
    else {
        return Err(AppError::Validation(MISSING_FIELDS.into()));
    };

    let course = store
        .insert(NewCourse {
            title,
            description,
            content: req.content.unwrap_or_default(),
            creator: principal.id,
        })
        .await?;

    tracing::info!(course_id = %course.id, creator = %course.creator, "course created");
    Ok(course)
}

pub async fn list(store: &dyn CourseStore, query: &ListCoursesQuery) -> AppResult<CoursePage> {
    let page = query.page();
    let limit = query.limit();
    let filter = CourseFilter {
        search: query.search().map(str::to_owned),
        offset: u64::from(page - 1) * u64::from(limit),
        limit: u64::from(limit),
    };

    let (courses, total) = store.list(&filter).await?;
    tracing::debug!(page, limit, total, search = ?filter.search, "listed courses");

    Ok(CoursePage {
        courses,
        current_page: page,
        total_pages: total.div_ceil(u64::from(limit)),
        total,
    })
}

pub async fn update(
    store: &dyn CourseStore,
    principal: &Principal,
    id: Uuid,
    mut req: UpdateCourseReq,
) -> AppResult<Course> {
    let course = store.find(id).await?.ok_or(AppError::NotFound("Course"))?;

    if course.creator != principal.id && !principal.is_admin() {
        tracing::info!(course_id = %id, user_id = %principal.id, "update refused: not the creator");
        return Err(Forbidden::NotOwner.into());
    }

    for field in [&req.title, &req.description] {
        if field.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(AppError::Validation(MISSING_FIELDS.into()));
        }
    }
    req.title = req.title.map(|t| t.trim().to_string());
    req.description = req.description.map(|d| d.trim().to_string());

    let updated = store.update(id, req).await?;
    tracing::info!(course_id = %id, user_id = %principal.id, "course updated");
    Ok(updated)
}

pub async fn enroll(store: &dyn CourseStore, principal: &Principal, id: Uuid) -> AppResult<Course> {
    let course = store.enroll(id, principal.id).await?;
    tracing::info!(course_id = %id, user_id = %principal.id, "enrolled");
    Ok(course)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::content::{CourseContent, VideoContent};
    use crate::models::EnrollmentStatus;
    use crate::store::MemoryCourseStore;

    fn teacher() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            role: Role::Teacher,
        }
    }

    fn req(title: &str, description: &str) -> CreateCourseReq {
        CreateCourseReq {
            title: Some(title.into()),
            description: Some(description.into()),
            content: None,
        }
    }

    #[tokio::test]
    async fn create_sets_creator_and_draft_status() {
        let store = MemoryCourseStore::new();
        let me = teacher();
        let mut body = req("Rust 101", "Ownership and borrowing");
        body.content = Some(vec![CourseContent::Video(VideoContent {
            url: "https://youtu.be/dQw4w9WgXcQ".into(),
            video_id: Some("dQw4w9WgXcQ".into()),
        })]);

        let course = create(&store, &me, body).await.unwrap();
        assert_eq!(course.creator, me.id);
        assert_eq!(course.enrollment_status, EnrollmentStatus::Draft);
        assert_eq!(course.content.len(), 1);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_without_a_write() {
        let store = MemoryCourseStore::new();
        let me = teacher();
        for body in [
            req("", "something"),
            req("Title", "   "),
            CreateCourseReq::default(),
        ] {
            let err = create(&store, &me, body).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn second_create_with_same_title_is_a_duplicate() {
        let store = MemoryCourseStore::new();
        let me = teacher();
        create(&store, &me, req("Rust 101", "first")).await.unwrap();
        let err = create(&store, &me, req("Rust 101", "second")).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn second_page_of_twenty_five() {
        let store = MemoryCourseStore::new();
        let me = teacher();
        for i in 0..25 {
            create(&store, &me, req(&format!("Course {i:02}"), "matching")).await.unwrap();
        }
        let query = ListCoursesQuery {
            search: None,
            page: Some(2),
            limit: Some(10),
        };
        let page = list(&store, &query).await.unwrap();
        assert_eq!(page.courses.len(), 10);
        assert_eq!(page.courses[0].title, "Course 10");
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total, 25);
    }

    #[tokio::test]
    async fn empty_store_has_zero_pages() {
        let store = MemoryCourseStore::new();
        let page = list(&store, &ListCoursesQuery::default()).await.unwrap();
        assert!(page.courses.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
    }

    #[tokio::test]
    async fn update_by_non_creator_is_forbidden_and_changes_nothing() {
        let store = MemoryCourseStore::new();
        let owner = teacher();
        let course = create(&store, &owner, req("Rust 101", "first")).await.unwrap();

        let change = UpdateCourseReq {
            title: Some("Hijacked".into()),
            ..Default::default()
        };
        let err = update(&store, &teacher(), course.id, change).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(Forbidden::NotOwner)));
        assert_eq!(store.find(course.id).await.unwrap(), Some(course));
    }

    #[tokio::test]
    async fn owner_and_admin_may_update() {
        let store = MemoryCourseStore::new();
        let owner = teacher();
        let course = create(&store, &owner, req("Rust 101", "first")).await.unwrap();

        let change = UpdateCourseReq {
            description: Some("revised".into()),
            enrollment_status: Some(EnrollmentStatus::Open),
            ..Default::default()
        };
        let updated = update(&store, &owner, course.id, change).await.unwrap();
        assert_eq!(updated.description, "revised");
        assert_eq!(updated.title, "Rust 101");
        assert_eq!(updated.creator, owner.id);
        assert_eq!(updated.enrollment_status, EnrollmentStatus::Open);

        let admin = Principal {
            id: Uuid::new_v4(),
            role: Role::Admin,
        };
        let change = UpdateCourseReq {
            enrollment_status: Some(EnrollmentStatus::Closed),
            ..Default::default()
        };
        let updated = update(&store, &admin, course.id, change).await.unwrap();
        assert_eq!(updated.enrollment_status, EnrollmentStatus::Closed);
        assert_eq!(updated.creator, owner.id);
    }

    #[tokio::test]
    async fn update_rejects_blank_title_and_unknown_id() {
        let store = MemoryCourseStore::new();
        let owner = teacher();
        let course = create(&store, &owner, req("Rust 101", "first")).await.unwrap();

        let blank = UpdateCourseReq {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert!(matches!(
            update(&store, &owner, course.id, blank).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            update(&store, &owner, Uuid::new_v4(), UpdateCourseReq::default()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn enroll_unknown_course_is_not_found() {
        let store = MemoryCourseStore::new();
        let student = Principal {
            id: Uuid::new_v4(),
            role: Role::Student,
        };
        assert!(matches!(
            enroll(&store, &student, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
