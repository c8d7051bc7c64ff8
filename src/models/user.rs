use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    /// Model permissions in `app.action_model` form, e.g. `api.add_software`.
    pub permissions: Vec<String>,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn has_perm(&self, perm: &str) -> bool {
        self.is_active && (self.is_superuser || self.permissions.iter().any(|p| p == perm))
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub permissions: Vec<String>,
}
