// src/bootstrap.rs
use crate::auth::password::hash_password;
use crate::config::AdminBootstrap;
use crate::error::AppError;
use crate::models::user::NewUser;
use crate::store::CatalogStore;

/// Creates the configured superuser unless an account with that name already exists,
/// in which case it is only reactivated if needed. Returns whether a user was created.
pub async fn ensure_admin(store: &dyn CatalogStore, admin: &AdminBootstrap) -> Result<bool, AppError> {
    if let Some(existing) = store.find_user_by_username(&admin.username).await? {
        if !existing.is_active {
            store.set_user_active(existing.id, true).await?;
            tracing::warn!(username = %admin.username, "Admin user was inactive, reactivated");
        } else {
            tracing::info!(username = %admin.username, "Admin user already present");
        }
        return Ok(false);
    }
    if admin.password.len() < 8 {
        return Err(AppError::validation("ADMIN_PASSWORD must be at least 8 characters"));
    }

    let user = store
        .insert_user(&NewUser {
            username: admin.username.clone(),
            password_hash: hash_password(&admin.password)?,
            is_staff: true,
            is_superuser: true,
            permissions: Vec::new(),
        })
        .await?;
    tracing::info!(id = user.id, username = %user.username, "Admin user created");
    Ok(true)
}
