//! Ownership and role decisions for authenticated requests.
//!
//! Every intro-scoped route funnels through [`authorize`] exactly once. A
//! caller that cannot see a resource is told it does not exist; only the
//! account-administration routes answer with Forbidden.

use uuid::Uuid;

use crate::models::AccountRole;

/// The authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub account_id: Uuid,
    pub role: AccountRole,
}

/// Minimum privilege a route needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    /// The resource owner, or an administrator.
    Owner,
    /// Administrators only.
    Administrator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotFound,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Decides whether `caller` may act on a resource owned by `owner`.
///
/// `owner` is `None` when the resource does not exist, or for routes that are
/// not tied to a tenant.
pub fn authorize(caller: &Caller, owner: Option<Uuid>, required: RequiredRole) -> AccessDecision {
    match required {
        RequiredRole::Administrator => {
            if caller.role.is_administrator() {
                AccessDecision::Allow
            } else {
                AccessDecision::Deny(DenyReason::Forbidden)
            }
        }
        RequiredRole::Owner => match owner {
            None => AccessDecision::Deny(DenyReason::NotFound),
            Some(_) if caller.role.is_administrator() => AccessDecision::Allow,
            Some(owner_id) if owner_id == caller.account_id => AccessDecision::Allow,
            Some(_) => AccessDecision::Deny(DenyReason::NotFound),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Caller {
        Caller {
            account_id: Uuid::new_v4(),
            role: AccountRole::Owner,
        }
    }

    fn admin() -> Caller {
        Caller {
            account_id: Uuid::new_v4(),
            role: AccountRole::Administrator,
        }
    }

    #[test]
    fn test_owner_can_access_own_intro() {
        let caller = owner();
        let decision = authorize(&caller, Some(caller.account_id), RequiredRole::Owner);
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_cross_tenant_access_is_not_found() {
        let decision = authorize(&owner(), Some(Uuid::new_v4()), RequiredRole::Owner);
        assert_eq!(decision, AccessDecision::Deny(DenyReason::NotFound));
    }

    #[test]
    fn test_missing_resource_is_not_found() {
        assert_eq!(
            authorize(&admin(), None, RequiredRole::Owner),
            AccessDecision::Deny(DenyReason::NotFound)
        );
    }

    #[test]
    fn test_administrator_acts_on_any_tenant() {
        let decision = authorize(&admin(), Some(Uuid::new_v4()), RequiredRole::Owner);
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_admin_routes_forbid_owners() {
        assert_eq!(
            authorize(&owner(), None, RequiredRole::Administrator),
            AccessDecision::Deny(DenyReason::Forbidden)
        );
        assert!(authorize(&admin(), None, RequiredRole::Administrator).is_allowed());
    }
}
