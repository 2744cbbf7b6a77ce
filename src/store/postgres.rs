use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::{CourseFilter, CourseStore, StoreError, StoreResult};
use crate::content::CourseContent;
use crate::db::Db;
use crate::models::{
    Course, CourseListItem, CreatorSummary, EnrollmentStatus, NewCourse, UpdateCourseReq,
};

const COURSE_COLUMNS: &str = "id, title, description, content, creator, enrollment_status, \
                              enrolled_students, created_at, updated_at";

// $1 is the search term or NULL
const SEARCH_CLAUSE: &str = "($1::text IS NULL \
                             OR strpos(lower(c.title), lower($1)) > 0 \
                             OR strpos(lower(c.description), lower($1)) > 0)";

pub struct PgCourseStore {
    db: Db,
}

impl PgCourseStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[derive(sqlx::FromRow, Debug)]
struct CourseRow {
    id: Uuid,
    title: String,
    description: String,
    content: Json<Vec<CourseContent>>,
    creator: Uuid,
    enrollment_status: String,
    enrolled_students: Vec<Uuid>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow, Debug)]
struct ListRow {
    #[sqlx(flatten)]
    course: CourseRow,
    creator_name: Option<String>,
    creator_email: Option<String>,
}

impl TryFrom<CourseRow> for Course {
    type Error = StoreError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let enrollment_status = row
            .enrollment_status
            .parse::<EnrollmentStatus>()
            .map_err(StoreError::Corrupt)?;
        Ok(Course {
            id: row.id,
            title: row.title,
            description: row.description,
            content: row.content.0,
            creator: row.creator,
            enrollment_status,
            enrolled_students: row.enrolled_students,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<ListRow> for CourseListItem {
    type Error = StoreError;

    fn try_from(row: ListRow) -> Result<Self, Self::Error> {
        let creator = match (row.creator_name, row.creator_email) {
            (Some(name), Some(email)) => Some(CreatorSummary { name, email }),
            _ => None,
        };
        let c = Course::try_from(row.course)?;
        Ok(CourseListItem {
            id: c.id,
            title: c.title,
            description: c.description,
            content: c.content,
            creator,
            enrollment_status: c.enrollment_status,
            enrolled_students: c.enrolled_students,
            created_at: c.created_at,
            updated_at: c.updated_at,
        })
    }
}

fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        // unique_violation
        if db_err.code().as_deref() == Some("23505")
            && db_err.constraint().map_or(true, |c| c == "uq_courses_title")
        {
            return StoreError::DuplicateTitle;
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl CourseStore for PgCourseStore {
    async fn insert(&self, course: NewCourse) -> StoreResult<Course> {
        let sql = format!(
            "INSERT INTO courses (id, title, description, content, creator, enrollment_status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COURSE_COLUMNS}"
        );
        let row: CourseRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&course.title)
            .bind(&course.description)
            .bind(Json(&course.content))
            .bind(course.creator)
            .bind(EnrollmentStatus::Draft.as_str())
            .fetch_one(&self.db)
            .await
            .map_err(classify)?;
        row.try_into()
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        let row: Option<CourseRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        row.map(Course::try_from).transpose()
    }

    async fn list(&self, filter: &CourseFilter) -> StoreResult<(Vec<CourseListItem>, u64)> {
        let offset = i64::try_from(filter.offset).unwrap_or(i64::MAX);
        let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);

        let sql = format!(
            "SELECT c.id, c.title, c.description, c.content, c.creator, c.enrollment_status, \
                    c.enrolled_students, c.created_at, c.updated_at, \
                    u.name AS creator_name, u.email AS creator_email \
             FROM courses c \
             LEFT JOIN users u ON u.id = c.creator \
             WHERE {SEARCH_CLAUSE} \
             ORDER BY c.created_at, c.id \
             OFFSET $2 LIMIT $3"
        );
        let rows: Vec<ListRow> = sqlx::query_as(&sql)
            .bind(filter.search.as_deref())
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM courses c WHERE {SEARCH_CLAUSE}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filter.search.as_deref())
            .fetch_one(&self.db)
            .await?;

        let items = rows
            .into_iter()
            .map(CourseListItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, u64::try_from(total).unwrap_or_default()))
    }

    async fn update(&self, id: Uuid, changes: UpdateCourseReq) -> StoreResult<Course> {
        let sql = format!(
            "UPDATE courses SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 content = COALESCE($4, content), \
                 enrollment_status = COALESCE($5, enrollment_status), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {COURSE_COLUMNS}"
        );
        let row: Option<CourseRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.content.map(Json))
            .bind(changes.enrollment_status.map(|s| s.as_str()))
            .fetch_optional(&self.db)
            .await
            .map_err(classify)?;
        row.ok_or(StoreError::NotFound(id))?.try_into()
    }

    async fn enroll(&self, id: Uuid, student: Uuid) -> StoreResult<Course> {
        let sql = format!(
            "UPDATE courses SET \
                 enrolled_students = CASE WHEN $2 = ANY(enrolled_students) \
                     THEN enrolled_students ELSE array_append(enrolled_students, $2) END, \
                 updated_at = CASE WHEN $2 = ANY(enrolled_students) \
                     THEN updated_at ELSE now() END \
             WHERE id = $1 \
             RETURNING {COURSE_COLUMNS}"
        );
        let row: Option<CourseRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(student)
            .fetch_optional(&self.db)
            .await?;
        row.ok_or(StoreError::NotFound(id))?.try_into()
    }
}
