use chrono::{DateTime, Utc};
use infra::models::UserRow;
use infra::repos;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::auth::{Caller, Role};
use crate::error::ErrorCode;
use crate::gql::error::IntoGqlError;
use crate::services::notification_service::{NotificationService, KIND_ROLE_CHANGED};
use crate::services::rate_limit::RollingWindowLimiter;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("E-posta adresi belirtilmedi.")]
    MissingEmail,

    #[error("Geçersiz e-posta adresi: {0}")]
    InvalidEmail(String),

    #[error("Kullanıcı bulunamadı.")]
    UserNotFound,

    #[error(
        "Bir saat içinde en fazla {limit} rol ataması yapabilirsiniz. \
         {} sonra tekrar deneyin.",
        .retry_at.format("%H:%M")
    )]
    RateLimited { limit: usize, retry_at: DateTime<Utc> },

    #[error("Sistemde zaten bir {} bulunmaktadır.", role_label(.0))]
    AlreadyExists(Role),

    #[error("Kendi hesabınızı silemezsiniz.")]
    SelfDelete,

    #[error("Kullanıcı işlemi sırasında bir hata oluştu.")]
    Db(sqlx::Error),
}

fn role_label(role: &Role) -> &'static str {
    match role {
        Role::SuperAdmin => "süper admin",
        Role::Admin => "admin",
        Role::Teacher => "öğretmen",
        Role::User => "kullanıcı",
    }
}

impl From<sqlx::Error> for AdminError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error: {e}");
        AdminError::Db(e)
    }
}

impl IntoGqlError for AdminError {
    fn code(&self) -> ErrorCode {
        match self {
            AdminError::MissingEmail | AdminError::InvalidEmail(_) => ErrorCode::InvalidArgument,
            AdminError::UserNotFound => ErrorCode::NotFound,
            AdminError::RateLimited { .. } => ErrorCode::ResourceExhausted,
            AdminError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            AdminError::SelfDelete => ErrorCode::FailedPrecondition,
            AdminError::Db(_) => ErrorCode::Internal,
        }
    }
}

pub type AdminResult<T> = Result<T, AdminError>;

/// Trimmed address if it looks like `local@domain.tld`.
pub fn validate_email(email: &str) -> AdminResult<&str> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AdminError::MissingEmail);
    }
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        });
    if !well_formed || email.contains(char::is_whitespace) {
        return Err(AdminError::InvalidEmail(email.to_string()));
    }
    Ok(email)
}

pub fn ensure_not_self(caller: &Caller, target: Uuid) -> AdminResult<()> {
    if caller.user_id == target {
        return Err(AdminError::SelfDelete);
    }
    Ok(())
}

/// Privileged user-management operations. Callers are authorized by the
/// GraphQL layer; this service enforces the remaining preconditions.
#[derive(Clone)]
pub struct UserAdminService {
    db: PgPool,
    limiter: RollingWindowLimiter,
    notifications: NotificationService,
}

impl UserAdminService {
    pub fn new(db: PgPool, limiter: RollingWindowLimiter, notifications: NotificationService) -> Self {
        Self {
            db,
            limiter,
            notifications,
        }
    }

    pub async fn set_admin_role(
        &self,
        caller: &Caller,
        email: &str,
        now: DateTime<Utc>,
    ) -> AdminResult<String> {
        let email = validate_email(email)?;
        self.limiter
            .try_acquire(caller.user_id, now)
            .map_err(|exhausted| AdminError::RateLimited {
                limit: self.limiter.limit(),
                retry_at: exhausted.retry_at,
            })?;

        let user = repos::users::get_by_email(&self.db, email)
            .await?
            .ok_or(AdminError::UserNotFound)?;
        let user = repos::users::set_role(&self.db, user.id, Role::Admin.as_str(), None)
            .await?
            .ok_or(AdminError::UserNotFound)?;

        info!(caller = %caller.user_id, target = %user.id, "admin role assigned");
        self.announce_role(&user).await;
        Ok(format!("{email} kullanıcısı başarıyla admin yapıldı."))
    }

    pub async fn set_role(
        &self,
        caller: &Caller,
        user_id: Uuid,
        role: Role,
        campus_id: Option<Uuid>,
    ) -> AdminResult<String> {
        let user = repos::users::set_role(&self.db, user_id, role.as_str(), campus_id)
            .await?
            .ok_or(AdminError::UserNotFound)?;

        info!(caller = %caller.user_id, target = %user.id, role = role.as_str(), "role assigned");
        self.announce_role(&user).await;
        Ok(format!(
            "Kullanıcının rolü başarıyla {} olarak güncellendi.",
            role_label(&role)
        ))
    }

    /// Promote the caller when nobody holds `role` yet. Only admin and
    /// superadmin are bootstrapped this way.
    pub async fn initialize_first(&self, caller: &Caller, role: Role) -> AdminResult<String> {
        let mut tx = self.db.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        if repos::users::count_with_role(&mut *tx, role.as_str()).await? > 0 {
            return Err(AdminError::AlreadyExists(role));
        }
        repos::users::set_role(&mut *tx, caller.user_id, role.as_str(), None)
            .await?
            .ok_or(AdminError::UserNotFound)?;
        tx.commit().await?;

        info!(user_id = %caller.user_id, role = role.as_str(), "first privileged user initialized");
        Ok(format!(
            "{} rolü başarıyla atandı. Değişikliğin etkili olması için yeniden giriş yapın.",
            role_label(&role)
        ))
    }

    pub async fn delete_user(&self, caller: &Caller, user_id: Uuid) -> AdminResult<String> {
        ensure_not_self(caller, user_id)?;
        if !repos::users::delete(&self.db, user_id).await? {
            return Err(AdminError::UserNotFound);
        }
        info!(caller = %caller.user_id, target = %user_id, "user deleted");
        Ok(format!("Kullanıcı {user_id} başarıyla silindi."))
    }

    async fn announce_role(&self, user: &UserRow) {
        let role = Role::from(user.role.as_str());
        if let Err(e) = self
            .notifications
            .notify(
                user.id,
                KIND_ROLE_CHANGED,
                "Rolünüz güncellendi",
                format!("Hesabınızın yeni rolü: {}.", role_label(&role)),
            )
            .await
        {
            tracing::warn!(user_id = %user.id, "failed to send role notification: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(id: Uuid) -> Caller {
        Caller {
            user_id: id,
            email: "admin@okul.edu.tr".into(),
            role: Role::Admin,
            campus_id: None,
        }
    }

    #[test]
    fn email_validation() {
        assert_eq!(validate_email("  ogr@okul.edu.tr ").unwrap(), "ogr@okul.edu.tr");
        assert!(matches!(validate_email("   "), Err(AdminError::MissingEmail)));
        assert!(matches!(validate_email("ogr@okul"), Err(AdminError::InvalidEmail(_))));
        assert!(matches!(validate_email("@okul.edu.tr"), Err(AdminError::InvalidEmail(_))));
    }

    #[test]
    fn cannot_delete_self() {
        let id = Uuid::new_v4();
        assert!(matches!(ensure_not_self(&caller(id), id), Err(AdminError::SelfDelete)));
        assert!(ensure_not_self(&caller(id), Uuid::new_v4()).is_ok());
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            AdminError::AlreadyExists(Role::SuperAdmin).to_string(),
            "Sistemde zaten bir süper admin bulunmaktadır."
        );
        assert_eq!(AdminError::AlreadyExists(Role::Admin).code(), ErrorCode::AlreadyExists);
    }
}
