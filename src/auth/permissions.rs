//! Model permissions for the catalog ViewSets.
//!
//! Writes need the matching `api.<action>_<model>` permission. On top of
//! that, deleting requires a staff account. Superusers pass every check.

use http::Method;

use crate::error::AppError;
use crate::models::user::User;

const APP_LABEL: &str = "api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogModel {
    Azienda,
    Software,
}

impl CatalogModel {
    pub fn codename(self) -> &'static str {
        match self {
            CatalogModel::Azienda => "azienda",
            CatalogModel::Software => "software",
        }
    }
}

/// What a request must carry to be let through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    Permission(String),
    Denied,
}

pub fn required_permission(method: &Method, model: CatalogModel) -> Requirement {
    let action = if method == Method::GET || method == Method::HEAD || method == Method::OPTIONS {
        return Requirement::Authenticated;
    } else if method == Method::POST {
        "add"
    } else if method == Method::PUT || method == Method::PATCH {
        "change"
    } else if method == Method::DELETE {
        "delete"
    } else {
        return Requirement::Denied;
    };
    Requirement::Permission(format!("{APP_LABEL}.{action}_{}", model.codename()))
}

pub fn has_permission(user: &User, method: &Method, model: CatalogModel) -> bool {
    if !user.is_active {
        return false;
    }
    if user.is_superuser {
        return true;
    }
    match required_permission(method, model) {
        Requirement::Denied => false,
        Requirement::Authenticated => true,
        Requirement::Permission(perm) => user.has_perm(&perm) && (method != Method::DELETE || user.is_staff),
    }
}

pub fn enforce(user: &User, method: &Method, model: CatalogModel) -> Result<(), AppError> {
    if has_permission(user, method, model) {
        Ok(())
    } else {
        tracing::info!(username = %user.username, %method, model = model.codename(), "Permission denied");
        Err(AppError::forbidden("You do not have permission to perform this action."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(perms: &[&str], is_staff: bool, is_superuser: bool) -> User {
        User {
            id: 1,
            username: "luca".into(),
            password_hash: String::new(),
            is_active: true,
            is_staff,
            is_superuser,
            permissions: perms.iter().map(|p| p.to_string()).collect(),
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn reads_need_only_authentication() {
        let u = user(&[], false, false);
        assert!(has_permission(&u, &Method::GET, CatalogModel::Software));
        assert!(has_permission(&u, &Method::OPTIONS, CatalogModel::Azienda));
        assert!(!has_permission(&u, &Method::POST, CatalogModel::Software));
    }

    #[test]
    fn writes_map_to_model_permissions() {
        let u = user(&["api.add_software", "api.change_software"], false, false);
        assert!(has_permission(&u, &Method::POST, CatalogModel::Software));
        assert!(has_permission(&u, &Method::PATCH, CatalogModel::Software));
        assert!(!has_permission(&u, &Method::POST, CatalogModel::Azienda));
    }

    #[test]
    fn delete_also_requires_staff() {
        let plain = user(&["api.delete_software"], false, false);
        let staff = user(&["api.delete_software"], true, false);
        assert!(!has_permission(&plain, &Method::DELETE, CatalogModel::Software));
        assert!(has_permission(&staff, &Method::DELETE, CatalogModel::Software));
    }

    #[test]
    fn superuser_passes_and_inactive_fails() {
        let root = user(&[], false, true);
        assert!(has_permission(&root, &Method::DELETE, CatalogModel::Azienda));
        let mut gone = root.clone();
        gone.is_active = false;
        assert!(!has_permission(&gone, &Method::GET, CatalogModel::Azienda));
    }

    #[test]
    fn unknown_methods_are_denied() {
        let root = user(&[], true, false);
        assert_eq!(required_permission(&Method::TRACE, CatalogModel::Software), Requirement::Denied);
        assert!(!has_permission(&root, &Method::TRACE, CatalogModel::Software));
    }

    #[test]
    fn permission_codenames() {
        assert_eq!(
            required_permission(&Method::PUT, CatalogModel::Azienda),
            Requirement::Permission("api.change_azienda".to_string())
        );
    }
}
