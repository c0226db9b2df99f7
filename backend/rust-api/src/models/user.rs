use serde::{Deserialize, Serialize};
use validator::Validate;

/// User record stored under the "users" key (and mirrored in "currentUser").
///
/// The password is kept in plaintext: the portal has no real authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default)]
    pub filiere_id: String,
    pub role: UserRole,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub badges: Vec<String>,
}

impl User {
    pub fn has_badge(&self, badge: &str) -> bool {
        self.badges.iter().any(|b| b == badge)
    }

    pub fn is_enseignant(&self) -> bool {
        self.role == UserRole::Enseignant
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Stagiaire,
    Enseignant,
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            UserRole::Stagiaire => "stagiaire",
            UserRole::Enseignant => "enseignant",
        }
    }
}

/// Everything a new account carries except its id and gamification state.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpData {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, max = 50, message = "Username must be between 1 and 50 characters"))]
    pub username: String,

    #[serde(default)]
    pub logo: Option<String>,

    #[serde(default)]
    pub filiere_id: String,

    #[serde(default)]
    pub role: UserRole,
}

impl SignUpData {
    pub fn into_user(self, id: String) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password: Some(self.password),
            username: self.username,
            logo: self.logo,
            filiere_id: self.filiere_id,
            role: self.role,
            points: 0,
            badges: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile edit by the session user. Points, badges and role are not editable here.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub password: Option<String>,
    pub logo: Option<String>,
    pub filiere_id: Option<String>,
}

impl UpdateProfileRequest {
    pub fn apply_to(self, mut user: User) -> User {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password) = self.password {
            user.password = Some(password);
        }
        if let Some(logo) = self.logo {
            user.logo = Some(logo);
        }
        if let Some(filiere_id) = self.filiere_id {
            user.filiere_id = filiere_id;
        }
        user
    }
}

/// User returned to clients (password stripped)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub logo: Option<String>,
    pub filiere_id: String,
    pub role: UserRole,
    pub points: u32,
    pub badges: Vec<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            username: user.username,
            logo: user.logo,
            filiere_id: user.filiere_id,
            role: user.role,
            points: user.points,
            badges: user.badges,
        }
    }
}

/// Query params for the leaderboard
#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub filiere: Option<String>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_json_shape() {
        let json = r#"{
            "id": "user-1",
            "name": "TEST1 Stagiaire",
            "email": "TEST1@stagiaire.com",
            "password": "password",
            "username": "TEST_dev",
            "logo": "/placeholder.png",
            "filiereId": "DEV",
            "role": "stagiaire",
            "points": 250,
            "badges": ["Premier Projet"]
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.filiere_id, "DEV");
        assert_eq!(user.role, UserRole::Stagiaire);
        assert!(user.has_badge("Premier Projet"));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["filiereId"], "DEV");
        assert_eq!(back["role"], "stagiaire");
    }

    #[test]
    fn test_missing_gamification_fields_default() {
        let json = r#"{"id":"u","name":"n","email":"","username":"x","role":"enseignant"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.points, 0);
        assert!(user.badges.is_empty());
        assert!(user.password.is_none());
        assert!(user.is_enseignant());
    }

    #[test]
    fn test_profile_drops_password() {
        let user = SignUpData {
            name: "A".into(),
            email: "a@b.com".into(),
            password: "p".into(),
            username: "a".into(),
            logo: None,
            filiere_id: "DEV".into(),
            role: UserRole::Stagiaire,
        }
        .into_user("user-1".into());

        let profile = serde_json::to_value(UserProfile::from(user)).unwrap();
        assert!(profile.get("password").is_none());
        assert_eq!(profile["points"], 0);
    }
}
