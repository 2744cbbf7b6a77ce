use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError, DisplayFromStr};
use uuid::Uuid;

use crate::content::CourseContent;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    #[default]
    Draft,
    Open,
    Closed,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Draft => "draft",
            EnrollmentStatus::Open => "open",
            EnrollmentStatus::Closed => "closed",
        }
    }
}

impl std::str::FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(EnrollmentStatus::Draft),
            "open" => Ok(EnrollmentStatus::Open),
            "closed" => Ok(EnrollmentStatus::Closed),
            other => Err(format!("unknown enrollment status {other:?}")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub content: Vec<CourseContent>,
    pub creator: Uuid,
    pub enrollment_status: EnrollmentStatus,
    pub enrolled_students: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Display-safe projection of the user who created a course.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreatorSummary {
    pub name: String,
    pub email: String,
}

/// A course as it appears in listings, with the creator resolved.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseListItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub content: Vec<CourseContent>,
    pub creator: Option<CreatorSummary>,
    pub enrollment_status: EnrollmentStatus,
    pub enrolled_students: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoursePage {
    pub courses: Vec<CourseListItem>,
    pub current_page: u32,
    pub total_pages: u64,
    pub total: u64,
}

/// A user row referenced by courses. Users are managed elsewhere.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Body of `POST /api/courses`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CreateCourseReq {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<Vec<CourseContent>>,
}

/// Body of `PUT /api/courses/:id`. Only the provided fields are replaced.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseReq {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<CourseContent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_status: Option<EnrollmentStatus>,
}

/// Validated fields for a new course, ready for the store.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub content: Vec<CourseContent>,
    pub creator: Uuid,
}

/// `?search=&page=&limit=`; unparsable numbers fall back to the defaults.
#[serde_as]
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ListCoursesQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    #[serde(default)]
    pub page: Option<i64>,
    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ListCoursesQuery {
    pub fn page(&self) -> u32 {
        match self.page {
            Some(p) if p >= 1 => u32::try_from(p).unwrap_or(u32::MAX),
            _ => DEFAULT_PAGE,
        }
    }

    pub fn limit(&self) -> u32 {
        match self.limit {
            Some(l) if l >= 1 => u32::try_from(l).unwrap_or(MAX_LIMIT).min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        }
    }

    /// Trimmed search term, `None` when blank.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(raw: &str) -> ListCoursesQuery {
        let uri: axum::http::Uri = format!("/api/courses?{raw}").parse().unwrap();
        axum::extract::Query::<ListCoursesQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn defaults_apply_when_missing() {
        let q = query("");
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.search(), None);
    }

    #[test]
    fn garbage_and_non_positive_numbers_fall_back() {
        let q = query("page=abc&limit=0");
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);

        let q = query("page=-2&limit=-5");
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
    }

    #[test]
    fn limit_is_capped() {
        let q = query("page=3&limit=5000&search=%20rust%20");
        assert_eq!(q.page(), 3);
        assert_eq!(q.limit(), MAX_LIMIT);
        assert_eq!(q.search(), Some("rust"));
    }

    #[test]
    fn enrollment_status_round_trips_through_str() {
        for s in [EnrollmentStatus::Draft, EnrollmentStatus::Open, EnrollmentStatus::Closed] {
            assert_eq!(s.as_str().parse::<EnrollmentStatus>().unwrap(), s);
        }
        assert!("archived".parse::<EnrollmentStatus>().is_err());
    }
}
