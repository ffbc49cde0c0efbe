//! Login attempt recording and the lockout state machine.
//!
//! An account is `locked` while a lockout row's `locked_until` lies in the
//! future; it returns to `normal` purely by time passing. Two concurrent
//! failures racing past the threshold may lock one attempt late - accepted,
//! lockout is deterrence, not a hard boundary, so no locking is taken here.

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::policy::OrgAuthPolicy;
use crate::errors::AuthResult;

/// One credential-check outcome, as reported by the auth layer.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub email: String,
    pub user_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub success: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub failure_reason: Option<String>,
    pub auth_method: Option<String>,
}

impl AttemptRecord {
    pub fn success(email: impl Into<String>) -> Self {
        Self::new(email.into(), true, None)
    }

    pub fn failure(email: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(email.into(), false, Some(reason.into()))
    }

    fn new(email: String, success: bool, failure_reason: Option<String>) -> Self {
        Self {
            email,
            user_id: None,
            organization_id: None,
            success,
            ip_address: None,
            user_agent: None,
            failure_reason,
            auth_method: None,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_org(mut self, organization_id: Uuid) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_auth_method(mut self, method: impl Into<String>) -> Self {
        self.auth_method = Some(method.into());
        self
    }
}

/// Policy verdict for one attempt. `Allowed` means the policy did not block
/// it - whether the credentials were right is the auth layer's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum LoginVerdict {
    Allowed,
    Locked { minutes_remaining: i64 },
    IpBlocked,
    MethodBlocked,
}

/// The lockout expiry for this identifier, if one is still in the future.
pub async fn is_account_locked(
    pool: &SqlitePool,
    email: &str,
) -> AuthResult<Option<chrono::DateTime<Utc>>> {
    let row = sqlx::query(
        "SELECT locked_until FROM account_lockouts WHERE email = ? \
         ORDER BY locked_until DESC LIMIT 1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    let now = Utc::now();
    Ok(row
        .map(|r| r.get::<chrono::DateTime<Utc>, _>("locked_until"))
        .filter(|locked_until| now < *locked_until))
}

/// Failed attempts for this identifier within the rolling window.
pub async fn recent_failure_count(
    pool: &SqlitePool,
    email: &str,
    window_minutes: i64,
) -> AuthResult<i64> {
    let cutoff = Utc::now() - Duration::minutes(window_minutes);
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(1) FROM login_attempts WHERE email = ? AND success = 0 \
         AND attempted_at > ?",
    )
    .bind(email)
    .bind(cutoff)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Maintenance sweep deleting lockout rows whose expiry has passed. Expiry
/// itself is purely time-based; this only reclaims dead rows.
pub async fn clear_expired_lockouts(pool: &SqlitePool) -> AuthResult<u64> {
    let result = sqlx::query("DELETE FROM account_lockouts WHERE locked_until <= ?")
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Enforce the organization login policy around one credential check.
///
/// Order: lockout short-circuit, auth-method gate, IP allow-list, then the
/// attempt is recorded and a failure may trip the lockout threshold. A
/// threshold crossing locks *subsequent* attempts; this one still reports
/// `Allowed` because the policy did not block it.
pub async fn enforce_login_policy(
    pool: &SqlitePool,
    policy: &OrgAuthPolicy,
    attempt: &AttemptRecord,
) -> AuthResult<LoginVerdict> {
    if let Some(locked_until) = is_account_locked(pool, &attempt.email).await? {
        let seconds = (locked_until - Utc::now()).num_seconds().max(1);
        let minutes_remaining = (seconds + 59) / 60;
        tracing::debug!(email = %attempt.email, minutes_remaining, "login blocked: account locked");
        return Ok(LoginVerdict::Locked { minutes_remaining });
    }

    if let Some(method) = &attempt.auth_method {
        if !policy.method_allowed(method) {
            let mut blocked = attempt.clone();
            blocked.success = false;
            blocked.failure_reason = Some(format!("auth method not allowed: {method}"));
            insert_attempt(pool, &blocked).await?;
            tracing::debug!(email = %attempt.email, method = %method, "login blocked: auth method");
            return Ok(LoginVerdict::MethodBlocked);
        }
    }

    if !policy.ip_allowed(attempt.ip_address.as_deref()) {
        let mut blocked = attempt.clone();
        blocked.success = false;
        blocked.failure_reason = Some("ip address not in allow-list".to_string());
        insert_attempt(pool, &blocked).await?;
        tracing::debug!(email = %attempt.email, ip = ?attempt.ip_address, "login blocked: ip allow-list");
        return Ok(LoginVerdict::IpBlocked);
    }

    insert_attempt(pool, attempt).await?;

    if !attempt.success {
        let failures =
            recent_failure_count(pool, &attempt.email, policy.failed_window_minutes).await?;
        if failures >= policy.max_failed_attempts as i64 {
            lock_account(pool, policy, attempt).await?;
        }
    }

    Ok(LoginVerdict::Allowed)
}

async fn insert_attempt(pool: &SqlitePool, attempt: &AttemptRecord) -> AuthResult<()> {
    sqlx::query(
        "INSERT INTO login_attempts (id, user_id, email, organization_id, success, ip_address, \
         user_agent, failure_reason, auth_method, attempted_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(attempt.user_id.map(|id| id.to_string()))
    .bind(&attempt.email)
    .bind(attempt.organization_id.map(|id| id.to_string()))
    .bind(attempt.success)
    .bind(&attempt.ip_address)
    .bind(&attempt.user_agent)
    .bind(&attempt.failure_reason)
    .bind(&attempt.auth_method)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

async fn lock_account(
    pool: &SqlitePool,
    policy: &OrgAuthPolicy,
    attempt: &AttemptRecord,
) -> AuthResult<()> {
    let now = Utc::now();
    let locked_until = now + Duration::minutes(policy.lockout_duration_minutes);
    let reason = format!(
        "{} failed login attempts within {} minutes",
        policy.max_failed_attempts, policy.failed_window_minutes
    );

    tracing::warn!(
        email = %attempt.email,
        locked_until = %locked_until,
        "account locked after repeated failures"
    );

    sqlx::query(
        "INSERT INTO account_lockouts (id, user_id, email, locked_until, reason, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(attempt.user_id.map(|id| id.to_string()))
    .bind(&attempt.email)
    .bind(locked_until)
    .bind(reason)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}
