use chrono::Utc;

use crate::metrics::record_event;
use crate::models::{
    ContactSubmission, NewNotification, Notification, Project, Quiz, QuizAttempt, SignUpData, Task,
    Team, User,
};
use crate::services::fixtures;
use crate::storage::{LoadOutcome, PersistedCell, SharedStorage, Update};
use crate::utils::time::time_based_id;

/// Storage keys, shared with any other client of the same storage.
pub mod keys {
    pub const USERS: &str = "users";
    pub const PROJECTS: &str = "projects";
    pub const TASKS: &str = "tasks";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const CURRENT_USER: &str = "currentUser";
    pub const QUIZZES: &str = "quizzes";
    pub const QUIZ_ATTEMPTS: &str = "quizAttempts";
    pub const TEAMS: &str = "teams";
    pub const CONTACT_SUBMISSIONS: &str = "contactSubmissions";
}

/// Session and domain state of the portal: one [`PersistedCell`] per storage key.
///
/// Cells are written independently. An operation touching two cells (for
/// example `update_user` on the session user) performs two writes, and a
/// crash between them leaves the cells out of step.
#[derive(Debug)]
pub struct PortalStore {
    users: PersistedCell<Vec<User>>,
    projects: PersistedCell<Vec<Project>>,
    tasks: PersistedCell<Vec<Task>>,
    notifications: PersistedCell<Vec<Notification>>,
    current_user: PersistedCell<Option<User>>,
    quizzes: PersistedCell<Vec<Quiz>>,
    quiz_attempts: PersistedCell<Vec<QuizAttempt>>,
    teams: PersistedCell<Vec<Team>>,
    contact_submissions: PersistedCell<Vec<ContactSubmission>>,
}

impl PortalStore {
    pub fn open(storage: SharedStorage) -> Self {
        let store = Self {
            users: PersistedCell::open(storage.clone(), keys::USERS, Vec::new()),
            projects: PersistedCell::open(storage.clone(), keys::PROJECTS, Vec::new()),
            tasks: PersistedCell::open(storage.clone(), keys::TASKS, Vec::new()),
            notifications: PersistedCell::open(storage.clone(), keys::NOTIFICATIONS, Vec::new()),
            current_user: PersistedCell::open(storage.clone(), keys::CURRENT_USER, None),
            quizzes: PersistedCell::open(storage.clone(), keys::QUIZZES, Vec::new()),
            quiz_attempts: PersistedCell::open(storage.clone(), keys::QUIZ_ATTEMPTS, Vec::new()),
            teams: PersistedCell::open(storage.clone(), keys::TEAMS, Vec::new()),
            contact_submissions: PersistedCell::open(storage, keys::CONTACT_SUBMISSIONS, Vec::new()),
        };

        for (key, outcome) in store.load_report() {
            match outcome {
                LoadOutcome::Fallback { reason } => {
                    tracing::warn!("Key {} reset to its default: {}", key, reason)
                }
                other => tracing::debug!("Key {} loaded: {:?}", key, other),
            }
        }

        store
    }

    pub fn load_report(&self) -> Vec<(&str, &LoadOutcome)> {
        vec![
            (self.users.key(), self.users.load_outcome()),
            (self.projects.key(), self.projects.load_outcome()),
            (self.tasks.key(), self.tasks.load_outcome()),
            (self.notifications.key(), self.notifications.load_outcome()),
            (self.current_user.key(), self.current_user.load_outcome()),
            (self.quizzes.key(), self.quizzes.load_outcome()),
            (self.quiz_attempts.key(), self.quiz_attempts.load_outcome()),
            (self.teams.key(), self.teams.load_outcome()),
            (
                self.contact_submissions.key(),
                self.contact_submissions.load_outcome(),
            ),
        ]
    }

    /// Fills each empty demo collection with bundled fixtures. Returns the keys seeded.
    pub fn seed_fixtures(&self) -> Vec<&'static str> {
        let now = Utc::now();
        let mut seeded = Vec::new();

        if seed_if_empty(&self.users, fixtures::initial_users) {
            seeded.push(keys::USERS);
        }
        if seed_if_empty(&self.projects, || fixtures::initial_projects(now)) {
            seeded.push(keys::PROJECTS);
        }
        if seed_if_empty(&self.tasks, fixtures::initial_tasks) {
            seeded.push(keys::TASKS);
        }
        if seed_if_empty(&self.quizzes, || fixtures::initial_quizzes(now)) {
            seeded.push(keys::QUIZZES);
        }
        if seed_if_empty(&self.quiz_attempts, || fixtures::initial_quiz_attempts(now)) {
            seeded.push(keys::QUIZ_ATTEMPTS);
        }

        if !seeded.is_empty() {
            tracing::info!("Seeded fixture data for {:?}", seeded);
        }
        seeded
    }

    /// Nothing is buffered: every change has already been written.
    pub fn close(self) {
        tracing::info!(
            "Portal store closed ({} users, {} projects)",
            self.users.read(Vec::len),
            self.projects.read(Vec::len)
        );
    }

    // Session

    /// Exact email and plaintext password match. The user becomes the session user.
    pub fn login(&self, email: &str, password: &str) -> Option<User> {
        let found = self.users.read(|users| {
            users
                .iter()
                .find(|u| u.email == email && u.password.as_deref() == Some(password))
                .cloned()
        });

        record_event("login", found.is_some());
        let user = found?;
        self.current_user.set(Some(user.clone()));
        tracing::info!("User logged in: {}", user.id);
        Some(user)
    }

    pub fn logout(&self) {
        self.current_user.set(None);
    }

    /// Appends a new account unless its email or username is already taken.
    /// Does not log the new user in.
    pub fn signup(&self, data: SignUpData) -> Option<User> {
        let created = self.users.modify(|users| {
            let taken = users
                .iter()
                .any(|u| u.email == data.email || u.username == data.username);
            if taken {
                return Update::Unchanged(None);
            }
            let user = data.into_user(time_based_id("user"));
            users.push(user.clone());
            Update::Changed(Some(user))
        });

        record_event("signup", created.is_some());
        if let Some(user) = &created {
            tracing::info!("User registered: {} ({})", user.id, user.email);
        }
        created
    }

    /// Replaces the user with the same id; the session copy follows if it is that user.
    pub fn update_user(&self, updated: User) {
        let replaced = self.users.modify(|users| {
            match users.iter_mut().find(|u| u.id == updated.id) {
                Some(slot) => {
                    *slot = updated.clone();
                    Update::Changed(true)
                }
                None => Update::Unchanged(false),
            }
        });
        if !replaced {
            tracing::debug!("update_user: no user with id {}", updated.id);
        }
        self.sync_current_user(updated);
    }

    /// Adds points and, if not already held, a badge. Returns the updated user.
    pub fn award(&self, user_id: &str, points: u32, badge: Option<&str>) -> Option<User> {
        let updated = self.users.modify(|users| {
            match users.iter_mut().find(|u| u.id == user_id) {
                Some(user) => {
                    user.points = user.points.saturating_add(points);
                    if let Some(badge) = badge {
                        if !user.has_badge(badge) {
                            user.badges.push(badge.to_string());
                        }
                    }
                    Update::Changed(Some(user.clone()))
                }
                None => Update::Unchanged(None),
            }
        })?;

        tracing::debug!(
            "Awarded {} points to {} (total {})",
            points,
            updated.id,
            updated.points
        );
        self.sync_current_user(updated.clone());
        Some(updated)
    }

    fn sync_current_user(&self, updated: User) {
        self.current_user.modify(|current| {
            let is_session_user = current.as_ref().is_some_and(|c| c.id == updated.id);
            if is_session_user {
                *current = Some(updated);
                Update::Changed(())
            } else {
                Update::Unchanged(())
            }
        });
    }

    pub fn current_user(&self) -> Option<User> {
        self.current_user.get()
    }

    pub fn find_user(&self, user_id: &str) -> Option<User> {
        self.users
            .read(|users| users.iter().find(|u| u.id == user_id).cloned())
    }

    // Projects and notifications

    /// Returns whether a project was removed.
    pub fn delete_project(&self, project_id: &str) -> bool {
        self.projects.modify(|projects| {
            let before = projects.len();
            projects.retain(|p| p.id != project_id);
            if projects.len() == before {
                Update::Unchanged(false)
            } else {
                Update::Changed(true)
            }
        })
    }

    /// Prepends an unread notification stamped with a fresh id and the current time.
    pub fn add_notification(&self, new: NewNotification) -> Notification {
        let notification = Notification {
            id: time_based_id("notif"),
            user_id: new.user_id,
            kind: new.kind,
            message: new.message,
            link: new.link,
            is_read: false,
            created_at: Utc::now(),
        };
        self.notifications.modify(|all| {
            all.insert(0, notification.clone());
            Update::Changed(())
        });
        notification
    }

    // Cells, for functional updates by the domain services

    pub fn users(&self) -> &PersistedCell<Vec<User>> {
        &self.users
    }

    pub fn projects(&self) -> &PersistedCell<Vec<Project>> {
        &self.projects
    }

    pub fn tasks(&self) -> &PersistedCell<Vec<Task>> {
        &self.tasks
    }

    pub fn notifications(&self) -> &PersistedCell<Vec<Notification>> {
        &self.notifications
    }

    pub fn quizzes(&self) -> &PersistedCell<Vec<Quiz>> {
        &self.quizzes
    }

    pub fn quiz_attempts(&self) -> &PersistedCell<Vec<QuizAttempt>> {
        &self.quiz_attempts
    }

    pub fn teams(&self) -> &PersistedCell<Vec<Team>> {
        &self.teams
    }

    pub fn contact_submissions(&self) -> &PersistedCell<Vec<ContactSubmission>> {
        &self.contact_submissions
    }
}

fn seed_if_empty<T>(cell: &PersistedCell<Vec<T>>, fixtures: impl FnOnce() -> Vec<T>) -> bool
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    cell.modify(|items| {
        if items.is_empty() {
            *items = fixtures();
            Update::Changed(true)
        } else {
            Update::Unchanged(false)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NotificationKind, UserRole};
    use crate::storage::{KeyValueStorage, MemoryStorage};
    use std::sync::Arc;

    fn signup_data(email: &str, username: &str) -> SignUpData {
        SignUpData {
            name: "Test".to_string(),
            email: email.to_string(),
            password: "p".to_string(),
            username: username.to_string(),
            logo: None,
            filiere_id: "DEV".to_string(),
            role: UserRole::Stagiaire,
        }
    }

    fn empty_store() -> (Arc<MemoryStorage>, PortalStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = PortalStore::open(storage.clone());
        (storage, store)
    }

    #[test]
    fn test_signup_then_duplicate_email() {
        let (_, store) = empty_store();

        let created = store.signup(signup_data("a@b.com", "a")).unwrap();
        assert_eq!(created.points, 0);
        assert!(created.badges.is_empty());
        assert!(created.id.starts_with("user-"));
        assert_eq!(store.users().read(Vec::len), 1);

        assert!(store.signup(signup_data("a@b.com", "other")).is_none());
        assert_eq!(store.users().read(Vec::len), 1);
    }

    #[test]
    fn test_signup_rejects_duplicate_username() {
        let (_, store) = empty_store();
        store.signup(signup_data("a@b.com", "a")).unwrap();

        assert!(store.signup(signup_data("other@b.com", "a")).is_none());
        assert_eq!(store.users().read(Vec::len), 1);
    }

    #[test]
    fn test_signup_does_not_start_a_session() {
        let (_, store) = empty_store();
        store.signup(signup_data("a@b.com", "a")).unwrap();
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_login_requires_exact_match() {
        let (_, store) = empty_store();
        store.signup(signup_data("a@b.com", "a")).unwrap();

        assert!(store.login("a@b.com", "wrong").is_none());
        assert!(store.login("A@b.com", "p").is_none());
        assert!(store.current_user().is_none());

        let user = store.login("a@b.com", "p").unwrap();
        assert_eq!(store.current_user().map(|u| u.id), Some(user.id));

        store.logout();
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_update_user_syncs_session_user() {
        let (storage, store) = empty_store();
        store.signup(signup_data("a@b.com", "a")).unwrap();
        let mut user = store.login("a@b.com", "p").unwrap();

        user.name = "Renamed".to_string();
        store.update_user(user.clone());

        assert_eq!(store.find_user(&user.id).unwrap().name, "Renamed");
        assert_eq!(store.current_user().unwrap().name, "Renamed");

        let reopened = PortalStore::open(storage);
        assert_eq!(reopened.current_user().unwrap().name, "Renamed");
    }

    #[test]
    fn test_update_other_user_leaves_session_alone() {
        let (_, store) = empty_store();
        store.signup(signup_data("a@b.com", "a")).unwrap();
        let mut other = store.signup(signup_data("c@d.com", "c")).unwrap();
        store.login("a@b.com", "p").unwrap();

        other.points = 40;
        store.update_user(other.clone());

        assert_eq!(store.find_user(&other.id).unwrap().points, 40);
        assert_eq!(store.current_user().unwrap().email, "a@b.com");
    }

    #[test]
    fn test_award_does_not_duplicate_badges() {
        let (_, store) = empty_store();
        let user = store.signup(signup_data("a@b.com", "a")).unwrap();
        store.login("a@b.com", "p").unwrap();

        store.award(&user.id, 100, Some("Premier Projet")).unwrap();
        let after = store.award(&user.id, 100, Some("Premier Projet")).unwrap();

        assert_eq!(after.points, 200);
        assert_eq!(after.badges, vec!["Premier Projet".to_string()]);
        assert_eq!(store.current_user().unwrap().points, 200);
        assert!(store.award("user-missing", 5, None).is_none());
    }

    #[test]
    fn test_add_notification_prepends_unread() {
        let (_, store) = empty_store();
        let first = store.add_notification(NewNotification {
            user_id: "user-1".into(),
            kind: NotificationKind::NewComment,
            message: "first".into(),
            link: None,
        });
        let second = store.add_notification(NewNotification {
            user_id: "user-1".into(),
            kind: NotificationKind::ProjectRated,
            message: "second".into(),
            link: Some("/projects/proj-1".into()),
        });

        assert_ne!(first.id, second.id);
        let all = store.notifications().get();
        assert_eq!(all[0].message, "second");
        assert!(all.iter().all(|n| !n.is_read));
    }

    #[test]
    fn test_seed_only_fills_empty_collections() {
        let (_, store) = empty_store();
        store.signup(signup_data("a@b.com", "a")).unwrap();

        let seeded = store.seed_fixtures();
        assert!(!seeded.contains(&keys::USERS));
        assert!(seeded.contains(&keys::PROJECTS));
        assert!(seeded.contains(&keys::TASKS));
        assert_eq!(store.users().read(Vec::len), 1);
        assert_eq!(store.projects().read(Vec::len), 5);

        assert!(store.seed_fixtures().is_empty());
    }

    #[test]
    fn test_delete_project() {
        let (_, store) = empty_store();
        store.seed_fixtures();

        assert!(store.delete_project("proj-2"));
        assert!(!store.delete_project("proj-2"));
        assert!(store.projects().read(|p| p.iter().all(|p| p.id != "proj-2")));
    }

    #[test]
    fn test_corrupt_users_key_falls_back_and_reseeds() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_raw(keys::USERS, "not json at all");

        let store = PortalStore::open(storage.clone());
        assert!(store
            .load_report()
            .iter()
            .any(|(k, o)| *k == keys::USERS && matches!(o, LoadOutcome::Fallback { .. })));

        store.seed_fixtures();
        let raw = storage.get_item(keys::USERS).unwrap().unwrap();
        assert!(raw.contains("TEST1@stagiaire.com"));
    }

    #[test]
    fn test_editor_authored_quiz_survives_open_and_seed() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_raw(
            keys::QUIZZES,
            r#"[{
                "id": "7f1c",
                "title": "Mon quiz",
                "description": "Créé dans l'éditeur",
                "questions": [{
                    "id": "q1",
                    "text": "Choisir A",
                    "type": "QCM",
                    "options": [
                        {"id": "o1", "text": "A", "isCorrect": true},
                        {"id": "o2", "text": "B", "isCorrect": false}
                    ],
                    "correctAnswer": "A"
                }],
                "timeLimit": 30,
                "difficulty": "Moyen",
                "createdBy": "enseignant_id_placeholder",
                "createdAt": "2025-06-10T12:00:00.000Z",
                "updatedAt": "2025-06-10T12:00:00.000Z",
                "published": false,
                "views": 0,
                "completions": 0,
                "averageScore": 0
            }]"#,
        );

        let store = PortalStore::open(storage.clone());
        assert!(store
            .load_report()
            .iter()
            .any(|(k, o)| *k == keys::QUIZZES && **o == LoadOutcome::Restored));

        assert!(!store.seed_fixtures().contains(&keys::QUIZZES));
        let quizzes = store.quizzes().get();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].questions[0].options[0].text(), Some("A"));

        // A later write keeps the editor's option objects
        store.quizzes().update(|q| q.clone());
        let raw = storage.get_item(keys::QUIZZES).unwrap().unwrap();
        assert!(raw.contains("Mon quiz"));
        assert!(raw.contains(r#""isCorrect":true"#));
    }
}
