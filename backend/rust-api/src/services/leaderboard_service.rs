use std::sync::Arc;

use crate::models::{User, UserProfile, UserRole};
use crate::services::portal_store::PortalStore;

pub struct LeaderboardService {
    store: Arc<PortalStore>,
}

impl LeaderboardService {
    pub fn new(store: Arc<PortalStore>) -> Self {
        Self { store }
    }

    /// Stagiaires ranked by points, highest first. `search` matches the name
    /// or username case-insensitively.
    pub fn leaderboard(&self, filiere: Option<&str>, search: Option<&str>) -> Vec<UserProfile> {
        let search = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let filiere = filiere.filter(|f| !f.is_empty() && *f != "all");

        let mut ranked: Vec<User> = self.store.users().read(|users| {
            users
                .iter()
                .filter(|u| u.role == UserRole::Stagiaire)
                .filter(|u| filiere.is_none_or(|f| u.filiere_id == f))
                .filter(|u| {
                    search.as_deref().is_none_or(|s| {
                        u.name.to_lowercase().contains(s) || u.username.to_lowercase().contains(s)
                    })
                })
                .cloned()
                .collect()
        });

        ranked.sort_by(|a, b| b.points.cmp(&a.points));
        ranked.into_iter().map(UserProfile::from).collect()
    }
}
