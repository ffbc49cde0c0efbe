//! Password policy and history enforcement.
//!
//! Rule violations come back as a structured verdict with the specific unmet
//! requirements; those messages are user-visible by design (policy rules are
//! not secret). Only infrastructure failures are errors.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use rand_core::OsRng;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::policy::OrgAuthPolicy;
use crate::errors::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum PasswordVerdict {
    Accepted,
    Rejected { reasons: Vec<String> },
}

impl PasswordVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PasswordVerdict::Accepted)
    }
}

pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::internal(format!("failed to hash password: {err}")))
}

pub fn verify_password(password: &str, password_hash: &str) -> AuthResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|err| AuthError::internal(format!("invalid password hash: {err}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Pure rule checks against the organization policy.
pub fn check_password(policy: &OrgAuthPolicy, password: &str) -> PasswordVerdict {
    let mut reasons = Vec::new();

    if password.chars().count() < policy.min_password_length {
        reasons.push(format!(
            "password must be at least {} characters",
            policy.min_password_length
        ));
    }
    if policy.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
        reasons.push("password must contain an uppercase letter".to_string());
    }
    if policy.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
        reasons.push("password must contain a lowercase letter".to_string());
    }
    if policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        reasons.push("password must contain a digit".to_string());
    }
    if policy.require_symbol && !password.chars().any(|c| !c.is_alphanumeric()) {
        reasons.push("password must contain a symbol".to_string());
    }

    if reasons.is_empty() {
        PasswordVerdict::Accepted
    } else {
        PasswordVerdict::Rejected { reasons }
    }
}

/// Full policy enforcement: rule checks plus, when a history count is
/// configured, rejection of any password matching the user's last N hashes.
pub async fn enforce_password_policy(
    pool: &SqlitePool,
    policy: &OrgAuthPolicy,
    user_id: Uuid,
    password: &str,
) -> AuthResult<PasswordVerdict> {
    let verdict = check_password(policy, password);
    if !verdict.is_accepted() {
        return Ok(verdict);
    }

    let Some(history_count) = policy.password_history_count else {
        return Ok(PasswordVerdict::Accepted);
    };
    if history_count == 0 {
        return Ok(PasswordVerdict::Accepted);
    }

    let rows = sqlx::query(
        "SELECT password_hash FROM password_history WHERE user_id = ? \
         ORDER BY created_at DESC LIMIT ?",
    )
    .bind(user_id.to_string())
    .bind(history_count as i64)
    .fetch_all(pool)
    .await?;

    for row in rows {
        let stored: String = row.get("password_hash");
        if verify_password(password, &stored)? {
            return Ok(PasswordVerdict::Rejected {
                reasons: vec![format!(
                    "password matches one of your last {history_count} passwords"
                )],
            });
        }
    }

    Ok(PasswordVerdict::Accepted)
}

/// Append a hash to the user's password history.
pub async fn record_password(
    pool: &SqlitePool,
    user_id: Uuid,
    password_hash: &str,
) -> AuthResult<()> {
    sqlx::query(
        "INSERT INTO password_history (id, user_id, password_hash, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id.to_string())
    .bind(password_hash)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_rule_uses_policy_minimum() {
        let policy = OrgAuthPolicy { min_password_length: 12, ..OrgAuthPolicy::default() };
        assert!(!check_password(&policy, "short").is_accepted());
        assert!(check_password(&policy, "long-enough-now").is_accepted());
    }

    #[test]
    fn character_class_rules_report_each_violation() {
        let policy = OrgAuthPolicy {
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_symbol: true,
            ..OrgAuthPolicy::default()
        };

        match check_password(&policy, "alllowercase") {
            PasswordVerdict::Rejected { reasons } => {
                assert_eq!(reasons.len(), 3, "expected uppercase/digit/symbol: {reasons:?}")
            }
            PasswordVerdict::Accepted => panic!("should have been rejected"),
        }

        assert!(check_password(&policy, "G00d-enough").is_accepted());
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("S3cureP@ssw0rd").unwrap();
        assert!(verify_password("S3cureP@ssw0rd", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }
}
