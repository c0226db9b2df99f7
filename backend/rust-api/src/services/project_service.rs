use std::sync::Arc;

use chrono::Utc;

use crate::metrics::record_event;
use crate::models::project::{CreateProjectRequest, UploadedFile};
use crate::models::{
    Comment, FileInfo, NewNotification, NotificationKind, Project, ProjectCategory, Rating, User,
};
use crate::services::error::{require, PortalError};
use crate::services::portal_store::PortalStore;
use crate::storage::Update;
use crate::utils::time::time_based_id;

pub const FIRST_PROJECT_POINTS: u32 = 100;
pub const FIRST_PROJECT_BADGE: &str = "Premier Projet";
const DEFAULT_BANNER: &str = "/placeholder.svg?height=400&width=800";

pub struct ProjectService {
    store: Arc<PortalStore>,
}

impl ProjectService {
    pub fn new(store: Arc<PortalStore>) -> Self {
        Self { store }
    }

    /// Publishes a project for `owner` and awards the creation points and badge.
    pub fn create_project(
        &self,
        owner: &User,
        req: CreateProjectRequest,
    ) -> Result<Project, PortalError> {
        require(&req.title, "title")?;
        require(&req.description, "description")?;
        require(&req.goals, "goals")?;
        require(&req.category, "category")?;

        let now = Utc::now();
        let (videos, files): (Vec<FileInfo>, Vec<FileInfo>) = req
            .files
            .into_iter()
            .map(|file| uploaded_to_file_info(file, now))
            .partition(FileInfo::is_video);

        let project = Project {
            id: time_based_id("proj"),
            title: req.title,
            description: req.description,
            goals: req.goals,
            banner: req
                .banner
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BANNER.to_string()),
            owner_id: owner.id.clone(),
            category: ProjectCategory::from(req.category),
            created_at: now,
            files,
            videos,
            collaborators: vec![owner.id.clone()],
            comments: Vec::new(),
            ratings: Vec::new(),
            views: 0,
            likes: 0,
        };

        self.store.projects().modify(|projects| {
            projects.push(project.clone());
            Update::Changed(())
        });
        self.store
            .award(&owner.id, FIRST_PROJECT_POINTS, Some(FIRST_PROJECT_BADGE));
        record_event("project_created", true);

        tracing::info!("Project {} created by {}", project.id, owner.id);
        Ok(project)
    }

    pub fn get_project(&self, project_id: &str) -> Option<Project> {
        self.store
            .projects()
            .read(|projects| projects.iter().find(|p| p.id == project_id).cloned())
    }

    pub fn list_projects(&self, owner_id: Option<&str>) -> Vec<Project> {
        self.store.projects().read(|projects| {
            projects
                .iter()
                .filter(|p| owner_id.is_none_or(|owner| p.owner_id == owner))
                .cloned()
                .collect()
        })
    }

    /// Appends a comment and notifies the owner when someone else wrote it.
    pub fn add_comment(
        &self,
        author: &User,
        project_id: &str,
        text: &str,
    ) -> Result<Comment, PortalError> {
        require(text, "text")?;

        let comment = Comment {
            id: time_based_id("comment"),
            user_id: author.id.clone(),
            text: text.trim().to_string(),
            created_at: Utc::now(),
        };

        let project = self.store.projects().modify(|projects| {
            match projects.iter_mut().find(|p| p.id == project_id) {
                Some(project) => {
                    project.comments.push(comment.clone());
                    Update::Changed(Some(project.clone()))
                }
                None => Update::Unchanged(None),
            }
        });
        let project = project.ok_or_else(|| PortalError::not_found("project", project_id))?;

        if project.owner_id != author.id {
            self.store.add_notification(NewNotification {
                user_id: project.owner_id.clone(),
                kind: NotificationKind::NewComment,
                message: format!(
                    "{} a commenté votre projet \"{}\"",
                    author.name, project.title
                ),
                link: Some(format!("/projects/{}", project.id)),
            });
        }

        Ok(comment)
    }

    /// Records `rater`'s rating, replacing any earlier one from the same user.
    pub fn rate_project(
        &self,
        rater: &User,
        project_id: &str,
        value: u8,
    ) -> Result<Project, PortalError> {
        if !(1..=5).contains(&value) {
            return Err(PortalError::InvalidRating(value));
        }

        let project = self.store.projects().modify(|projects| {
            let Some(project) = projects.iter_mut().find(|p| p.id == project_id) else {
                return Update::Unchanged(None);
            };
            match project.ratings.iter_mut().find(|r| r.user_id == rater.id) {
                Some(existing) => existing.value = value,
                None => project.ratings.push(Rating {
                    user_id: rater.id.clone(),
                    value,
                }),
            }
            Update::Changed(Some(project.clone()))
        });
        let project = project.ok_or_else(|| PortalError::not_found("project", project_id))?;

        if project.owner_id != rater.id {
            self.store.add_notification(NewNotification {
                user_id: project.owner_id.clone(),
                kind: NotificationKind::ProjectRated,
                message: format!(
                    "{} a noté votre projet \"{}\" {}/5",
                    rater.name, project.title, value
                ),
                link: Some(format!("/projects/{}", project.id)),
            });
        }

        Ok(project)
    }

    pub fn delete_project(&self, project_id: &str) -> Result<(), PortalError> {
        if self.store.delete_project(project_id) {
            tracing::info!("Project {} deleted", project_id);
            Ok(())
        } else {
            Err(PortalError::not_found("project", project_id))
        }
    }
}

fn uploaded_to_file_info(file: UploadedFile, uploaded_at: chrono::DateTime<Utc>) -> FileInfo {
    FileInfo {
        id: time_based_id("file"),
        name: file.name,
        size: file.size,
        mime_type: file.mime_type,
        url: file.url,
        uploaded_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn seeded() -> (Arc<PortalStore>, ProjectService) {
        let store = Arc::new(PortalStore::open(Arc::new(MemoryStorage::new())));
        store.seed_fixtures();
        (store.clone(), ProjectService::new(store))
    }

    fn draft(title: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            title: title.to_string(),
            description: "Une application".to_string(),
            goals: "Apprendre".to_string(),
            category: "Développement Digital".to_string(),
            banner: None,
            files: vec![
                UploadedFile {
                    name: "demo.mp4".into(),
                    size: 2048,
                    mime_type: "video/mp4".into(),
                    url: "/uploads/demo.mp4".into(),
                },
                UploadedFile {
                    name: "rapport.pdf".into(),
                    size: 512,
                    mime_type: "application/pdf".into(),
                    url: "/uploads/rapport.pdf".into(),
                },
            ],
        }
    }

    #[test]
    fn test_create_project_awards_owner() {
        let (store, service) = seeded();
        let owner = store.find_user("user-3").unwrap();
        let before = owner.points;

        let project = service.create_project(&owner, draft("Mon projet")).unwrap();

        assert_eq!(project.collaborators, vec!["user-3".to_string()]);
        assert_eq!(project.videos.len(), 1);
        assert_eq!(project.files.len(), 1);
        assert_eq!(project.banner, DEFAULT_BANNER);
        assert_eq!(project.category, ProjectCategory::DeveloppementDigital);

        let owner = store.find_user("user-3").unwrap();
        assert_eq!(owner.points, before + FIRST_PROJECT_POINTS);
        assert!(owner.has_badge(FIRST_PROJECT_BADGE));
        assert!(service.get_project(&project.id).is_some());
    }

    #[test]
    fn test_create_project_requires_fields() {
        let (store, service) = seeded();
        let owner = store.find_user("user-1").unwrap();

        let mut req = draft("  ");
        assert_eq!(
            service.create_project(&owner, req.clone()).unwrap_err(),
            PortalError::MissingField("title")
        );
        req.title = "ok".into();
        req.goals = String::new();
        assert_eq!(
            service.create_project(&owner, req).unwrap_err(),
            PortalError::MissingField("goals")
        );
    }

    #[test]
    fn test_second_rating_replaces_first() {
        let (store, service) = seeded();
        let rater = store.find_user("user-2").unwrap();

        service.rate_project(&rater, "proj-1", 2).unwrap();
        let project = service.rate_project(&rater, "proj-1", 5).unwrap();

        let by_rater: Vec<_> = project
            .ratings
            .iter()
            .filter(|r| r.user_id == rater.id)
            .collect();
        assert_eq!(by_rater.len(), 1);
        assert_eq!(project.rating_by(&rater.id), Some(5));
    }

    #[test]
    fn test_rating_out_of_range() {
        let (store, service) = seeded();
        let rater = store.find_user("user-2").unwrap();
        assert_eq!(
            service.rate_project(&rater, "proj-1", 6).unwrap_err(),
            PortalError::InvalidRating(6)
        );
        assert_eq!(
            service.rate_project(&rater, "proj-1", 0).unwrap_err(),
            PortalError::InvalidRating(0)
        );
    }

    #[test]
    fn test_comment_notifies_owner_only_for_others() {
        let (store, service) = seeded();
        let project = service.get_project("proj-1").unwrap();
        let owner = store.find_user(&project.owner_id).unwrap();
        let other = store.find_user("user-2").unwrap();
        let before = store.notifications().read(Vec::len);

        service.add_comment(&owner, "proj-1", "Merci").unwrap();
        assert_eq!(store.notifications().read(Vec::len), before);

        service.add_comment(&other, "proj-1", "Bravo").unwrap();
        let latest = store.notifications().read(|n| n[0].clone());
        assert_eq!(latest.user_id, owner.id);
        assert_eq!(latest.kind, NotificationKind::NewComment);
        assert_eq!(latest.link.as_deref(), Some("/projects/proj-1"));
    }

    #[test]
    fn test_comment_on_missing_project() {
        let (store, service) = seeded();
        let user = store.find_user("user-1").unwrap();
        assert!(matches!(
            service.add_comment(&user, "proj-missing", "hi"),
            Err(PortalError::NotFound { .. })
        ));
        assert_eq!(
            service.add_comment(&user, "proj-1", "   ").unwrap_err(),
            PortalError::MissingField("text")
        );
    }

    #[test]
    fn test_list_by_owner() {
        let (_, service) = seeded();
        let all = service.list_projects(None);
        let owned = service.list_projects(Some("user-1"));
        assert!(owned.len() < all.len());
        assert!(owned.iter().all(|p| p.owner_id == "user-1"));
    }
}
