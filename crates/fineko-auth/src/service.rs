//! Session service: chat-platform login, company selection and
//! company-scoped session resolution.
//!
//! A login yields a short-lived temp token that is good for nothing but
//! listing, selecting or creating a company. Selecting (or creating) a
//! company consumes it and yields a company-scoped JWT backed by a session
//! record. There is no way back from a scoped session to a temp one.

use chrono::{Duration, Utc};
use fineko_core::context::TenantContext;
use fineko_core::error::{FinekoError, FinekoResult};
use fineko_core::models::company::{Company, CreateCompany};
use fineko_core::models::employee::Employee;
use fineko_core::models::session::{CreateSession, Session, SessionKind};
use fineko_core::models::user::{CreateUser, TelegramIdentity, UpdateUser, User};
use fineko_core::repository::{
    CompanyRepository, EmployeeRepository, SessionRepository, UserRepository,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token::{self, SessionSubject};

/// Result of a chat-platform login.
#[derive(Debug)]
pub struct TempLogin {
    /// Raw opaque temp token (return to client, not stored).
    pub temp_token: String,
    pub user: User,
    /// Temp token lifetime in seconds.
    pub expires_in: u64,
}

/// Result of selecting or creating a company.
#[derive(Debug)]
pub struct ScopedLogin {
    /// Signed company-scoped JWT.
    pub access_token: String,
    pub session_id: Uuid,
    pub company: Company,
    pub employee: Employee,
    /// Session lifetime in seconds.
    pub expires_in: u64,
}

/// Outcome of removing a user's link to a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipRemoval {
    Removed,
    /// Owners cannot leave their own company; the link is kept.
    OwnerCannotLeave,
    NotMember,
}

/// Session service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U, C, E, S>
where
    U: UserRepository,
    C: CompanyRepository,
    E: EmployeeRepository,
    S: SessionRepository,
{
    user_repo: U,
    company_repo: C,
    employee_repo: E,
    session_repo: S,
    config: AuthConfig,
}

impl<U, C, E, S> AuthService<U, C, E, S>
where
    U: UserRepository,
    C: CompanyRepository,
    E: EmployeeRepository,
    S: SessionRepository,
{
    pub fn new(
        user_repo: U,
        company_repo: C,
        employee_repo: E,
        session_repo: S,
        config: AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            company_repo,
            employee_repo,
            session_repo,
            config,
        }
    }

    /// Log in with a chat-platform identity and issue a temp token.
    ///
    /// The identity is trusted as given. First login creates the user;
    /// later logins refresh the display name and avatar only.
    pub async fn telegram_login(&self, identity: TelegramIdentity) -> FinekoResult<TempLogin> {
        let user = match self.user_repo.get_by_telegram_id(identity.id).await {
            Ok(existing) => {
                self.user_repo
                    .update(
                        existing.id,
                        UpdateUser {
                            display_name: Some(identity.display_name()),
                            avatar_url: Some(identity.photo_url.clone()),
                        },
                    )
                    .await?
            }
            Err(FinekoError::NotFound { .. }) => {
                let user = self.user_repo.create(CreateUser::from(&identity)).await?;
                info!(user_id = %user.id, "Registered new user");
                user
            }
            Err(e) => return Err(e),
        };

        let raw = token::generate_temp_token();
        let expires_at =
            Utc::now() + Duration::seconds(self.config.temp_session_lifetime_secs as i64);
        self.session_repo
            .create(CreateSession {
                user_id: user.id,
                company_id: None,
                kind: SessionKind::Temp,
                token_hash: Some(token::hash_temp_token(&raw)),
                expires_at,
            })
            .await?;

        debug!(user_id = %user.id, "Issued temp session");
        Ok(TempLogin {
            temp_token: raw,
            user,
            expires_in: self.config.temp_session_lifetime_secs,
        })
    }

    /// Companies the temp token's user belongs to.
    pub async fn list_companies(&self, temp_token: &str) -> FinekoResult<Vec<Company>> {
        let session = self.temp_session(temp_token).await?;
        let ids: Vec<Uuid> = self
            .employee_repo
            .list_by_user(session.user_id)
            .await?
            .into_iter()
            .map(|e| e.company_id)
            .collect();
        self.company_repo.get_many(&ids).await
    }

    /// Exchange a temp token for a session scoped to `company_id`.
    ///
    /// The temp token survives a failed membership check so the user can
    /// pick another company.
    pub async fn select_company(
        &self,
        temp_token: &str,
        company_id: Uuid,
    ) -> FinekoResult<ScopedLogin> {
        let session = self.temp_session(temp_token).await?;
        let employee = match self
            .employee_repo
            .get_by_user(company_id, session.user_id)
            .await
        {
            Ok(e) => e,
            Err(FinekoError::NotFound { .. }) => return Err(AuthError::NotMember.into()),
            Err(e) => return Err(e),
        };
        let company = self.company_repo.get_by_id(company_id).await?;

        self.consume_temp(temp_token).await?;
        self.open_scoped_session(company, employee).await
    }

    /// Create a company owned by the temp token's user and enter it.
    ///
    /// The temp token is consumed before anything is written, so concurrent
    /// calls with one token create at most one company. The company, the
    /// owner's employee link and the profile are written as one batch.
    pub async fn create_company(
        &self,
        temp_token: &str,
        name: &str,
        owner_position: Option<String>,
    ) -> FinekoResult<ScopedLogin> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FinekoError::validation("company name is empty"));
        }
        self.temp_session(temp_token).await?;
        let session = self.consume_temp(temp_token).await?;

        let created = self
            .company_repo
            .create_with_owner(CreateCompany {
                name: name.to_string(),
                owner_id: session.user_id,
                owner_position,
                trial_ends: Utc::now() + Duration::days(self.config.trial_days),
            })
            .await?;

        self.open_scoped_session(created.company, created.owner)
            .await
    }

    /// Validate a company-scoped token and its backing session record.
    pub async fn resolve(&self, access_token: &str) -> FinekoResult<TenantContext> {
        let claims = token::decode_session_token(access_token, &self.config)?;
        let subject = claims.subject()?;

        let session = match self.session_repo.get_by_id(subject.session_id).await {
            Ok(s) => s,
            Err(FinekoError::NotFound { .. }) => return Err(AuthError::SessionInvalid.into()),
            Err(e) => return Err(e),
        };
        if session.kind != SessionKind::Permanent
            || session.user_id != subject.user_id
            || session.company_id != Some(subject.company_id)
        {
            return Err(AuthError::SessionInvalid.into());
        }
        if session.is_expired(Utc::now()) {
            return Err(AuthError::SessionExpired.into());
        }

        Ok(TenantContext {
            company_id: subject.company_id,
            user_id: subject.user_id,
            employee_id: subject.employee_id,
            session_id: session.id,
        })
    }

    /// Invalidate the caller's session.
    pub async fn logout(&self, ctx: &TenantContext) -> FinekoResult<()> {
        self.session_repo.invalidate(ctx.session_id).await
    }

    /// Remove `user_id` from `company_id` and revoke their sessions there.
    pub async fn remove_employee_link(
        &self,
        user_id: Uuid,
        company_id: Uuid,
    ) -> FinekoResult<MembershipRemoval> {
        let employee = match self.employee_repo.get_by_user(company_id, user_id).await {
            Ok(e) => e,
            Err(FinekoError::NotFound { .. }) => return Ok(MembershipRemoval::NotMember),
            Err(e) => return Err(e),
        };
        if employee.is_owner() {
            return Ok(MembershipRemoval::OwnerCannotLeave);
        }

        self.employee_repo.delete(company_id, employee.id).await?;
        self.session_repo
            .invalidate_user_sessions(user_id, company_id)
            .await?;

        info!(%user_id, %company_id, "Removed employee link");
        Ok(MembershipRemoval::Removed)
    }

    /// Delete every expired session; returns how many were removed.
    pub async fn cleanup_expired_sessions(&self) -> FinekoResult<u64> {
        let removed = self.session_repo.cleanup_expired(Utc::now()).await?;
        info!(removed, "Cleaned up expired sessions");
        Ok(removed)
    }

    /// Look up a live temp session without consuming it.
    async fn temp_session(&self, raw: &str) -> FinekoResult<Session> {
        let hash = token::hash_temp_token(raw);
        let session = match self.session_repo.get_by_token_hash(&hash).await {
            Ok(s) => s,
            Err(FinekoError::NotFound { .. }) => return Err(AuthError::SessionInvalid.into()),
            Err(e) => return Err(e),
        };
        if session.kind != SessionKind::Temp {
            return Err(AuthError::WrongSessionKind.into());
        }
        if session.is_expired(Utc::now()) {
            // Best-effort removal; the token is rejected either way.
            let _ = self.session_repo.invalidate(session.id).await;
            return Err(AuthError::SessionExpired.into());
        }
        Ok(session)
    }

    /// Delete the temp session; exactly one caller wins a given token.
    async fn consume_temp(&self, raw: &str) -> FinekoResult<Session> {
        let hash = token::hash_temp_token(raw);
        match self.session_repo.consume_temp(&hash).await? {
            Some(session) => Ok(session),
            None => Err(AuthError::SessionInvalid.into()),
        }
    }

    async fn open_scoped_session(
        &self,
        company: Company,
        employee: Employee,
    ) -> FinekoResult<ScopedLogin> {
        let expires_at = Utc::now() + Duration::seconds(self.config.session_lifetime_secs as i64);
        let session = self
            .session_repo
            .create(CreateSession {
                user_id: employee.user_id,
                company_id: Some(company.id),
                kind: SessionKind::Permanent,
                token_hash: None,
                expires_at,
            })
            .await?;

        let access_token = token::issue_session_token(
            SessionSubject {
                session_id: session.id,
                user_id: employee.user_id,
                company_id: company.id,
                employee_id: employee.id,
            },
            expires_at,
            &self.config,
        )?;

        info!(
            user_id = %employee.user_id,
            company_id = %company.id,
            session_id = %session.id,
            "Opened company session"
        );
        Ok(ScopedLogin {
            access_token,
            session_id: session.id,
            company,
            employee,
            expires_in: self.config.session_lifetime_secs,
        })
    }
}
