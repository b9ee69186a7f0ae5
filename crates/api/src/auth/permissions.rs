use async_graphql::{Context, Enum};
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::ErrorCode;
use crate::gql::error::coded;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub enum Role {
    User,
    Teacher,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        match role {
            "teacher" => Role::Teacher,
            "admin" => Role::Admin,
            "superadmin" => Role::SuperAdmin,
            _ => Role::User, // Unknown claims get the least privilege
        }
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        Role::from(role.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// Everything an endpoint can ask permission for.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Action {
    ViewGames,
    ManageGames,
    BookReservation,
    CancelOwnReservation,
    ViewAllReservations,
    CancelAnyReservation,
    GenerateReports,
    AssignAdminRole,
    AssignAnyRole,
    DeleteUser,
    ViewLeaderboard,
    ReadOwnNotifications,
}

/// The single (role, action) table.
pub fn allows(role: Role, action: Action) -> bool {
    use Action::*;

    match action {
        ViewGames | BookReservation | CancelOwnReservation | ViewLeaderboard
        | ReadOwnNotifications => true,
        ManageGames | ViewAllReservations | CancelAnyReservation | GenerateReports
        | AssignAdminRole | DeleteUser => role.is_admin(),
        AssignAnyRole => role == Role::SuperAdmin,
    }
}

/// Authenticated identity resolved from the token's claims.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub campus_id: Option<Uuid>,
}

impl Caller {
    pub fn from_claims(claims: &Claims) -> async_graphql::Result<Self> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|e| coded(ErrorCode::InvalidArgument, format!("Invalid user ID: {e}")))?;
        let campus_id = claims
            .campus_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok());

        Ok(Self {
            user_id,
            email: claims.email.clone(),
            role: Role::from(claims.role.as_str()),
            campus_id,
        })
    }

    pub fn can(&self, action: Action) -> bool {
        allows(self.role, action)
    }
}

/// Resolve the caller, failing when the request carries no token.
pub fn authenticated(ctx: &Context<'_>) -> async_graphql::Result<Caller> {
    let claims = ctx.data::<Claims>().map_err(|_| {
        coded(
            ErrorCode::Unauthenticated,
            "Bu işlemi yapmak için giriş yapmalısınız.",
        )
    })?;
    Caller::from_claims(claims)
}

/// Resolve the caller and check `action` against the role table.
pub fn require(ctx: &Context<'_>, action: Action) -> async_graphql::Result<Caller> {
    let caller = authenticated(ctx)?;
    if !caller.can(action) {
        tracing::warn!(user_id = %caller.user_id, role = ?caller.role, ?action, "permission denied");
        return Err(coded(
            ErrorCode::PermissionDenied,
            "Bu işlem için yetkiniz bulunmamaktadır.",
        ));
    }
    Ok(caller)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_superadmin_assigns_arbitrary_roles() {
        assert!(allows(Role::SuperAdmin, Action::AssignAnyRole));
        assert!(!allows(Role::Admin, Action::AssignAnyRole));
        assert!(!allows(Role::Teacher, Action::AssignAnyRole));
    }

    #[test]
    fn admin_actions_need_admin_roles() {
        for action in [
            Action::ManageGames,
            Action::ViewAllReservations,
            Action::CancelAnyReservation,
            Action::GenerateReports,
            Action::AssignAdminRole,
            Action::DeleteUser,
        ] {
            assert!(allows(Role::Admin, action));
            assert!(allows(Role::SuperAdmin, action));
            assert!(!allows(Role::User, action), "{action:?}");
            assert!(!allows(Role::Teacher, action), "{action:?}");
        }
    }

    #[test]
    fn unknown_role_claim_is_least_privileged() {
        assert_eq!(Role::from("root"), Role::User);
        assert_eq!(Role::from("superadmin"), Role::SuperAdmin);
    }
}
