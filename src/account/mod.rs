//! Account and login policy enforcement.
//!
//! The only stateful part of the crate: login attempts, lockouts and
//! password history live in the caller-supplied database pool. Permission
//! decisions never touch this module; it gates credential verification
//! before a session is ever issued.

mod lockout;
mod password;
mod policy;

pub use lockout::{
    clear_expired_lockouts, enforce_login_policy, is_account_locked, recent_failure_count,
    AttemptRecord, LoginVerdict,
};
pub use password::{
    check_password, enforce_password_policy, hash_password, record_password, verify_password,
    PasswordVerdict,
};
pub use policy::{load_policy, save_policy, OrgAuthPolicy};
