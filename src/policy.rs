//! Access policy rules
//!
//! Two method-polymorphic rules plus the simpler built-ins. Safe methods
//! (retrieve/list) never require write privileges; mutating methods are
//! gated on the staff flag or on resource ownership. Rules compose: a
//! handler may apply one, both, or only the authenticated-user extractor.

use axum::http::Method;

use crate::error::{AppError, AppResult};
use crate::models::user::UserClaims;

/// A safe method never mutates state.
pub fn is_safe(method: &Method) -> bool {
    matches!(method.as_str(), "GET" | "HEAD" | "OPTIONS")
}

/// Read-only methods are open to everyone, including anonymous callers;
/// mutating methods require the staff flag.
pub fn staff_or_read_only(claims: Option<&UserClaims>, method: &Method) -> AppResult<()> {
    if is_safe(method) {
        return Ok(());
    }
    match claims {
        Some(claims) if claims.is_staff => Ok(()),
        Some(_) => Err(AppError::Authorization(
            "staff privileges required to modify the catalog".to_string(),
        )),
        None => Err(AppError::Authentication(
            "authentication required".to_string(),
        )),
    }
}

/// Read-only methods are open; mutating methods require the requester to
/// own the resource.
pub fn owner_or_read_only(claims: &UserClaims, method: &Method, owner_id: i64) -> AppResult<()> {
    if is_safe(method) || claims.user_id == owner_id {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "only the owner may modify this record".to_string(),
        ))
    }
}

/// Staff-only endpoints, regardless of method.
pub fn require_staff(claims: &UserClaims) -> AppResult<()> {
    if claims.is_staff {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "staff privileges required".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff() -> UserClaims {
        UserClaims::new(1, "admin", true, 1)
    }

    fn member() -> UserClaims {
        UserClaims::new(2, "reader", false, 1)
    }

    #[test]
    fn safe_methods_always_pass() {
        assert!(staff_or_read_only(None, &Method::GET).is_ok());
        assert!(staff_or_read_only(Some(&member()), &Method::GET).is_ok());
        assert!(owner_or_read_only(&member(), &Method::GET, 999).is_ok());
    }

    #[test]
    fn mutation_requires_staff() {
        assert!(staff_or_read_only(Some(&staff()), &Method::POST).is_ok());
        assert!(matches!(
            staff_or_read_only(Some(&member()), &Method::PUT),
            Err(AppError::Authorization(_))
        ));
        assert!(matches!(
            staff_or_read_only(None, &Method::DELETE),
            Err(AppError::Authentication(_))
        ));
    }

    #[test]
    fn owner_rule_checks_identity() {
        assert!(owner_or_read_only(&member(), &Method::PUT, 2).is_ok());
        assert!(matches!(
            owner_or_read_only(&member(), &Method::PUT, 1),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn staff_only_ignores_method() {
        assert!(require_staff(&staff()).is_ok());
        assert!(require_staff(&member()).is_err());
    }
}
