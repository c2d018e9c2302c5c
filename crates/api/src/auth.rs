// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actors that start draws or edit draw records, and what they may do.
//!
//! Authentication happens in the web layer; this crate only receives the
//! resulting identity and role.

use ticket_draw_audit::Actor;

use crate::error::AuthError;

/// Actor roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Administrators may trigger draws, reopen stuck draws and edit draw
    /// metadata.
    Admin,
    /// Support staff may read draws and mark winners notified or claimed.
    Operator,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Operator => "operator",
        }
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Converts this actor into the identity stored on a draw record.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role.as_str().to_string())
    }
}

/// Role checks for privileged draw operations.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that an actor may perform an administrator-only action.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` naming `action` if the actor is not
    /// an Admin.
    pub fn authorize_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Operator => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            }),
        }
    }
}
