use arcadia::config::Config;
use arcadia::db;
use arcadia::error::ServiceError;
use arcadia::state::AppState;
use tempfile::TempDir;

fn test_state(temp_dir: &TempDir) -> AppState {
    let db_path = temp_dir.path().join("test.db");
    let pool = db::create_pool(&db_path).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");
    let mut config = Config::default();
    config.database.path = Some(db_path);
    config.auth.bcrypt_cost = 4;
    AppState::new(pool, config)
}

#[test]
fn full_recovery_flow_ends_in_a_fresh_login() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(&temp_dir);
    state
        .users
        .create_user("alice", "alice@example.com", "old-password1", false)
        .unwrap();

    let code = state
        .password_reset
        .send_reset_code("alice@example.com")
        .unwrap();
    assert!(state
        .password_reset
        .verify_reset_code("alice@example.com", &code)
        .unwrap());

    assert!(state
        .password_reset
        .reset_password("alice@example.com", &code, "new-password1")
        .unwrap());

    // Old credentials are dead, new ones work, the code is spent.
    assert!(state
        .users
        .login("alice@example.com", "old-password1")
        .unwrap()
        .is_none());
    assert!(state
        .users
        .login("alice@example.com", "new-password1")
        .unwrap()
        .is_some());
    assert!(!state
        .password_reset
        .verify_reset_code("alice@example.com", &code)
        .unwrap());
}

#[test]
fn a_new_code_invalidates_the_old_one() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(&temp_dir);
    state
        .users
        .create_user("alice", "alice@example.com", "password123", false)
        .unwrap();

    let first = state
        .password_reset
        .send_reset_code("alice@example.com")
        .unwrap();
    let second = state
        .password_reset
        .send_reset_code("alice@example.com")
        .unwrap();

    if first != second {
        assert!(!state
            .password_reset
            .verify_reset_code("alice@example.com", &first)
            .unwrap());
    }
    assert!(state
        .password_reset
        .verify_reset_code("alice@example.com", &second)
        .unwrap());
}

#[test]
fn unknown_email_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(&temp_dir);

    let err = state
        .password_reset
        .send_reset_code("nobody@example.com")
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(m)
        if m == "No account found with this email address."));
}
