use std::sync::Arc;

use crate::models::{Team, User};
use crate::services::error::{require, PortalError};
use crate::services::portal_store::PortalStore;
use crate::storage::Update;
use crate::utils::time::time_based_id;

pub struct TeamService {
    store: Arc<PortalStore>,
}

impl TeamService {
    pub fn new(store: Arc<PortalStore>) -> Self {
        Self { store }
    }

    /// Members are the owner followed by the invited ids, without repeats.
    pub fn create_team(
        &self,
        owner: &User,
        name: &str,
        description: &str,
        invited: Vec<String>,
    ) -> Result<Team, PortalError> {
        require(name, "name")?;

        let mut members = vec![owner.id.clone()];
        for id in invited {
            if !id.is_empty() && !members.contains(&id) {
                members.push(id);
            }
        }

        let team = Team {
            id: time_based_id("team"),
            name: name.trim().to_string(),
            description: description.to_string(),
            owner_id: owner.id.clone(),
            members,
            project_ids: Vec::new(),
        };

        self.store.teams().modify(|teams| {
            teams.push(team.clone());
            Update::Changed(())
        });
        tracing::info!(
            "Team {} created by {} with {} members",
            team.id,
            owner.id,
            team.members.len()
        );
        Ok(team)
    }

    pub fn teams_for_user(&self, user_id: &str) -> Vec<Team> {
        self.store.teams().read(|teams| {
            teams
                .iter()
                .filter(|t| t.members.iter().any(|m| m == user_id))
                .cloned()
                .collect()
        })
    }
}
