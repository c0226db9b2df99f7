use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::time::iso_millis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub goals: String,
    pub banner: String,
    pub owner_id: String,
    pub category: ProjectCategory,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<FileInfo>,
    #[serde(default)]
    pub videos: Vec<FileInfo>,
    #[serde(default)]
    pub collaborators: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    #[serde(default)]
    pub views: u32,
    #[serde(default)]
    pub likes: u32,
}

impl Project {
    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let total: u32 = self.ratings.iter().map(|r| u32::from(r.value)).sum();
        Some(f64::from(total) / self.ratings.len() as f64)
    }

    pub fn rating_by(&self, user_id: &str) -> Option<u8> {
        self.ratings
            .iter()
            .find(|r| r.user_id == user_id)
            .map(|r| r.value)
    }
}

/// The two portal tracks. Stored strings outside the closed set are kept
/// verbatim so foreign data round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectCategory {
    DeveloppementDigital,
    InfrastructureDigitale,
    Other(String),
}

impl ProjectCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectCategory::DeveloppementDigital => "Développement Digital",
            ProjectCategory::InfrastructureDigitale => "Infrastructure Digitale",
            ProjectCategory::Other(raw) => raw,
        }
    }
}

impl From<String> for ProjectCategory {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Développement Digital" => ProjectCategory::DeveloppementDigital,
            "Infrastructure Digitale" => ProjectCategory::InfrastructureDigitale,
            _ => ProjectCategory::Other(raw),
        }
    }
}

impl From<ProjectCategory> for String {
    fn from(category: ProjectCategory) -> Self {
        match category {
            ProjectCategory::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub url: String,
    #[serde(with = "iso_millis")]
    pub uploaded_at: DateTime<Utc>,
}

impl FileInfo {
    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub text: String,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub user_id: String,
    pub value: u8,
}

/// Project as returned by the API, with its computed average rating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: Project,
    pub average_rating: Option<f64>,
}

impl From<Project> for ProjectDetails {
    fn from(project: Project) -> Self {
        let average_rating = project.average_rating();
        Self {
            project,
            average_rating,
        }
    }
}

/// Uploaded file as sent by the creation form (no id or timestamp yet)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    pub description: String,
    pub goals: String,
    pub category: String,
    pub banner: Option<String>,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct RateProjectRequest {
    pub value: u8,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjectsQuery {
    pub owner_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_unknown_values() {
        let known: ProjectCategory = serde_json::from_str(r#""Infrastructure Digitale""#).unwrap();
        assert_eq!(known, ProjectCategory::InfrastructureDigitale);

        let other: ProjectCategory = serde_json::from_str(r#""Développement Mobile""#).unwrap();
        assert_eq!(
            serde_json::to_string(&other).unwrap(),
            r#""Développement Mobile""#
        );
    }

    #[test]
    fn test_file_info_uses_type_key() {
        let json = r##"{"id":"f1","name":"doc.pdf","size":1024,"type":"application/pdf","url":"#","uploadedAt":"2025-06-10T12:00:00.000Z"}"##;
        let file: FileInfo = serde_json::from_str(json).unwrap();
        assert_eq!(file.mime_type, "application/pdf");
        assert!(!file.is_video());
        assert_eq!(serde_json::to_string(&file).unwrap(), json);
    }

    #[test]
    fn test_average_rating() {
        let json = r#"{"id":"p","title":"t","description":"d","goals":"g","banner":"b",
            "ownerId":"user-1","category":"Infrastructure Digitale",
            "createdAt":"2025-06-10T12:00:00.000Z"}"#;
        let mut project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.average_rating(), None);

        project.ratings = vec![
            Rating { user_id: "a".into(), value: 4 },
            Rating { user_id: "b".into(), value: 5 },
        ];
        assert_eq!(project.average_rating(), Some(4.5));
        assert_eq!(project.rating_by("b"), Some(5));

        let details = serde_json::to_value(ProjectDetails::from(project)).unwrap();
        assert_eq!(details["averageRating"], 4.5);
        assert_eq!(details["ownerId"], "user-1");
    }
}
