//! Per-organization auth policy configuration.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AuthError, AuthResult};

/// Organization auth policy. Every field has a documented default so an
/// organization with no policy row behaves sensibly: permissive enough not
/// to lock out legitimate low-traffic orgs, but present by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgAuthPolicy {
    pub min_password_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_symbol: bool,
    /// Reject passwords matching any of the last N stored hashes.
    pub password_history_count: Option<u32>,
    pub max_failed_attempts: u32,
    pub failed_window_minutes: i64,
    pub lockout_duration_minutes: i64,
    /// Empty list means no IP restriction.
    pub ip_allowlist: Vec<String>,
    /// Empty list means every auth method is allowed.
    pub allowed_auth_methods: Vec<String>,
}

impl Default for OrgAuthPolicy {
    fn default() -> Self {
        Self {
            min_password_length: 8,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_symbol: false,
            password_history_count: None,
            max_failed_attempts: 5,
            failed_window_minutes: 30,
            lockout_duration_minutes: 30,
            ip_allowlist: Vec::new(),
            allowed_auth_methods: Vec::new(),
        }
    }
}

impl OrgAuthPolicy {
    pub fn method_allowed(&self, method: &str) -> bool {
        self.allowed_auth_methods.is_empty()
            || self.allowed_auth_methods.iter().any(|m| m == method)
    }

    pub fn ip_allowed(&self, ip: Option<&str>) -> bool {
        if self.ip_allowlist.is_empty() {
            return true;
        }
        match ip {
            Some(ip) => self.ip_allowlist.iter().any(|allowed| allowed == ip),
            // allow-list configured but caller IP unknown: deny
            None => false,
        }
    }
}

fn parse_string_list(raw: Option<String>, column: &str) -> AuthResult<Vec<String>> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|err| AuthError::internal(format!("corrupt {column} column: {err}"))),
    }
}

/// Load the policy for an organization. A missing row yields the defaults;
/// a failed load is an error and callers must treat it as deny.
pub async fn load_policy(pool: &SqlitePool, organization_id: Uuid) -> AuthResult<OrgAuthPolicy> {
    let row = sqlx::query(
        "SELECT min_password_length, require_uppercase, require_lowercase, require_digit, \
         require_symbol, password_history_count, max_failed_attempts, failed_window_minutes, \
         lockout_duration_minutes, ip_allowlist, allowed_auth_methods \
         FROM organization_auth_policies WHERE organization_id = ?",
    )
    .bind(organization_id.to_string())
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(OrgAuthPolicy::default());
    };

    let defaults = OrgAuthPolicy::default();
    Ok(OrgAuthPolicy {
        min_password_length: row
            .get::<Option<i64>, _>("min_password_length")
            .map(|v| v as usize)
            .unwrap_or(defaults.min_password_length),
        require_uppercase: row
            .get::<Option<bool>, _>("require_uppercase")
            .unwrap_or(defaults.require_uppercase),
        require_lowercase: row
            .get::<Option<bool>, _>("require_lowercase")
            .unwrap_or(defaults.require_lowercase),
        require_digit: row
            .get::<Option<bool>, _>("require_digit")
            .unwrap_or(defaults.require_digit),
        require_symbol: row
            .get::<Option<bool>, _>("require_symbol")
            .unwrap_or(defaults.require_symbol),
        password_history_count: row
            .get::<Option<i64>, _>("password_history_count")
            .map(|v| v as u32),
        max_failed_attempts: row
            .get::<Option<i64>, _>("max_failed_attempts")
            .map(|v| v as u32)
            .unwrap_or(defaults.max_failed_attempts),
        failed_window_minutes: row
            .get::<Option<i64>, _>("failed_window_minutes")
            .unwrap_or(defaults.failed_window_minutes),
        lockout_duration_minutes: row
            .get::<Option<i64>, _>("lockout_duration_minutes")
            .unwrap_or(defaults.lockout_duration_minutes),
        ip_allowlist: parse_string_list(row.get("ip_allowlist"), "ip_allowlist")?,
        allowed_auth_methods: parse_string_list(
            row.get("allowed_auth_methods"),
            "allowed_auth_methods",
        )?,
    })
}

/// Upsert an organization's policy row. Admin surface for the server layer.
pub async fn save_policy(
    pool: &SqlitePool,
    organization_id: Uuid,
    policy: &OrgAuthPolicy,
) -> AuthResult<()> {
    let now = Utc::now();
    let ip_allowlist = serde_json::to_string(&policy.ip_allowlist)
        .map_err(|err| AuthError::internal(err.to_string()))?;
    let allowed_auth_methods = serde_json::to_string(&policy.allowed_auth_methods)
        .map_err(|err| AuthError::internal(err.to_string()))?;

    sqlx::query(
        "INSERT INTO organization_auth_policies (organization_id, min_password_length, \
         require_uppercase, require_lowercase, require_digit, require_symbol, \
         password_history_count, max_failed_attempts, failed_window_minutes, \
         lockout_duration_minutes, ip_allowlist, allowed_auth_methods, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(organization_id) DO UPDATE SET \
         min_password_length = excluded.min_password_length, \
         require_uppercase = excluded.require_uppercase, \
         require_lowercase = excluded.require_lowercase, \
         require_digit = excluded.require_digit, \
         require_symbol = excluded.require_symbol, \
         password_history_count = excluded.password_history_count, \
         max_failed_attempts = excluded.max_failed_attempts, \
         failed_window_minutes = excluded.failed_window_minutes, \
         lockout_duration_minutes = excluded.lockout_duration_minutes, \
         ip_allowlist = excluded.ip_allowlist, \
         allowed_auth_methods = excluded.allowed_auth_methods, \
         updated_at = excluded.updated_at",
    )
    .bind(organization_id.to_string())
    .bind(policy.min_password_length as i64)
    .bind(policy.require_uppercase)
    .bind(policy.require_lowercase)
    .bind(policy.require_digit)
    .bind(policy.require_symbol)
    .bind(policy.password_history_count.map(|v| v as i64))
    .bind(policy.max_failed_attempts as i64)
    .bind(policy.failed_window_minutes)
    .bind(policy.lockout_duration_minutes)
    .bind(ip_allowlist)
    .bind(allowed_auth_methods)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}
