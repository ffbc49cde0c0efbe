use anyhow::Result;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::tempdir;
use uuid::Uuid;

use tenant_authz::account::{
    enforce_password_policy, hash_password, load_policy, record_password, save_policy,
    OrgAuthPolicy, PasswordVerdict,
};

async fn setup_pool(dir: &tempfile::TempDir) -> Result<SqlitePool> {
    let db_path = dir.path().join("test.db");
    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator = sqlx::migrate::Migrator::new(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"),
    )
    .await?;
    migrator.run(&pool).await?;

    Ok(pool)
}

#[tokio::test]
async fn history_rejects_the_last_n_passwords_only() -> Result<()> {
    let dir = tempdir()?;
    let pool = setup_pool(&dir).await?;
    let user_id = Uuid::new_v4();
    let policy = OrgAuthPolicy {
        password_history_count: Some(3),
        ..OrgAuthPolicy::default()
    };

    // four generations of passwords, oldest first
    let generations = ["first-pass-1", "second-pass-2", "third-pass-3", "fourth-pass-4"];
    for password in generations {
        let hash = hash_password(password)?;
        record_password(&pool, user_id, &hash).await?;
        // keep created_at ordering unambiguous between generations
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    // the three most recent are rejected
    for password in &generations[1..] {
        let verdict = enforce_password_policy(&pool, &policy, user_id, password).await?;
        assert!(
            matches!(verdict, PasswordVerdict::Rejected { .. }),
            "{password} should have been rejected"
        );
    }

    // the fourth-generation-back password is outside the window
    let verdict = enforce_password_policy(&pool, &policy, user_id, "first-pass-1").await?;
    assert!(verdict.is_accepted());

    // and a brand new password passes
    let verdict = enforce_password_policy(&pool, &policy, user_id, "fresh-pass-5").await?;
    assert!(verdict.is_accepted());

    Ok(())
}

#[tokio::test]
async fn rule_violations_short_circuit_before_history() -> Result<()> {
    let dir = tempdir()?;
    let pool = setup_pool(&dir).await?;
    let policy = OrgAuthPolicy {
        min_password_length: 10,
        require_digit: true,
        password_history_count: Some(3),
        ..OrgAuthPolicy::default()
    };

    let verdict = enforce_password_policy(&pool, &policy, Uuid::new_v4(), "short").await?;
    match verdict {
        PasswordVerdict::Rejected { reasons } => {
            assert_eq!(reasons.len(), 2, "length and digit rules: {reasons:?}");
        }
        PasswordVerdict::Accepted => panic!("should have been rejected"),
    }

    Ok(())
}

#[tokio::test]
async fn policy_rows_load_with_per_field_defaults() -> Result<()> {
    let dir = tempdir()?;
    let pool = setup_pool(&dir).await?;
    let org_id = Uuid::new_v4();

    // no row: full defaults
    assert_eq!(load_policy(&pool, org_id).await?, OrgAuthPolicy::default());

    let custom = OrgAuthPolicy {
        min_password_length: 12,
        require_uppercase: true,
        password_history_count: Some(5),
        max_failed_attempts: 3,
        ip_allowlist: vec!["10.0.0.1".to_string()],
        allowed_auth_methods: vec!["password".to_string(), "oauth".to_string()],
        ..OrgAuthPolicy::default()
    };
    save_policy(&pool, org_id, &custom).await?;
    assert_eq!(load_policy(&pool, org_id).await?, custom);

    // a sparse row filled in by hand gets defaults for its NULL columns
    let sparse_org = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO organization_auth_policies \
         (organization_id, max_failed_attempts, created_at, updated_at) VALUES (?, 3, ?, ?)",
    )
    .bind(sparse_org.to_string())
    .bind(chrono::Utc::now())
    .bind(chrono::Utc::now())
    .execute(&pool)
    .await?;

    let loaded = load_policy(&pool, sparse_org).await?;
    assert_eq!(loaded.max_failed_attempts, 3);
    assert_eq!(loaded.min_password_length, 8);
    assert_eq!(loaded.lockout_duration_minutes, 30);

    Ok(())
}

#[tokio::test]
async fn stricter_policy_tightens_the_lockout_threshold() -> Result<()> {
    use tenant_authz::account::{enforce_login_policy, is_account_locked, AttemptRecord};

    let dir = tempdir()?;
    let pool = setup_pool(&dir).await?;
    let org_id = Uuid::new_v4();
    save_policy(
        &pool,
        org_id,
        &OrgAuthPolicy { max_failed_attempts: 2, ..OrgAuthPolicy::default() },
    )
    .await?;
    let policy = load_policy(&pool, org_id).await?;

    for _ in 0..2 {
        enforce_login_policy(
            &pool,
            &policy,
            &AttemptRecord::failure("ada@example.com", "invalid credentials").with_org(org_id),
        )
        .await?;
    }
    assert!(is_account_locked(&pool, "ada@example.com").await?.is_some());

    Ok(())
}
