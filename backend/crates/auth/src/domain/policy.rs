//! Authorization Policy
//!
//! Static role → capability table, plus the decision for a request's
//! principal.
//!
//! | capability         | Admin | User | Anonymous |
//! |--------------------|-------|------|-----------|
//! | `AdminOnly`        | ✓     |      | 401       |
//! | `AnyAuthenticated` | ✓     | ✓    | 401       |
//! | `Public`           | ✓     | ✓    | ✓         |

use serde::{Deserialize, Serialize};

use crate::domain::principal::{AuthenticatedContext, Principal};
use crate::domain::value_object::Role;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    AdminOnly,
    AnyAuthenticated,
    Public,
}

/// Whether `role` may exercise `capability`
pub const fn permits(role: Role, capability: Capability) -> bool {
    match capability {
        Capability::Public | Capability::AnyAuthenticated => true,
        Capability::AdminOnly => role.is_admin(),
    }
}

/// Decide whether `principal` may exercise `capability`
///
/// Anonymous on a protected capability is `Unauthenticated` (401), never
/// `Forbidden`; only a known identity with the wrong role is 403.
pub fn authorize(principal: &Principal, capability: Capability) -> AuthResult<()> {
    if capability == Capability::Public {
        return Ok(());
    }

    match principal {
        Principal::Anonymous => Err(AuthError::Unauthenticated),
        Principal::Authenticated(ctx) => authorize_context(ctx, capability),
    }
}

fn authorize_context(ctx: &AuthenticatedContext, capability: Capability) -> AuthResult<()> {
    if permits(ctx.role, capability) {
        Ok(())
    } else {
        tracing::warn!(
            user_name = %ctx.user_name,
            role = %ctx.role,
            ?capability,
            "Capability denied"
        );
        Err(AuthError::Forbidden)
    }
}
