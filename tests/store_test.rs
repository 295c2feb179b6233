use arcadia::config::Config;
use arcadia::db;
use arcadia::models::User;
use arcadia::state::AppState;
use tempfile::TempDir;

const GOLD_FRAME: i64 = 1;
const SILVER_FRAME: i64 = 2;
const WIZARD_HAT: i64 = 4;

fn test_state(temp_dir: &TempDir) -> AppState {
    let db_path = temp_dir.path().join("test.db");
    let pool = db::create_pool(&db_path).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");
    let mut config = Config::default();
    config.database.path = Some(db_path);
    config.auth.bcrypt_cost = 4;
    AppState::new(pool, config)
}

fn logged_in_user(state: &AppState) -> User {
    state
        .users
        .create_user("alice", "alice@example.com", "password123", false)
        .unwrap();
    state
        .users
        .login("alice@example.com", "password123")
        .unwrap()
        .unwrap()
}

#[test]
fn money_buys_points_and_points_buy_features() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(&temp_dir);
    let user = logged_in_user(&state);

    state.wallet.add_money(100.0).unwrap();
    let offer = &state.wallet.offers()[4]; // 50.0 -> 500
    state.wallet.purchase_points(offer).unwrap();
    state.wallet.purchase_points(offer).unwrap();
    assert_eq!(state.wallet.get_balance().unwrap(), 0.0);
    assert_eq!(state.wallet.get_points().unwrap(), 1000);

    let (ok, message) = state.features.purchase_feature(user.id, SILVER_FRAME);
    assert!(ok);
    assert_eq!(message, "Feature purchased successfully");
    assert_eq!(state.wallet.get_points().unwrap(), 0);

    let (ok, message) = state.features.purchase_feature(user.id, SILVER_FRAME);
    assert!(!ok);
    assert_eq!(message, "Feature already purchased");

    let (ok, message) = state.features.purchase_feature(user.id, GOLD_FRAME);
    assert!(!ok);
    assert_eq!(message, "Insufficient points");
    assert!(!state.features.is_feature_purchased(user.id, GOLD_FRAME).unwrap());
}

#[test]
fn equipping_is_exclusive_per_category() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(&temp_dir);
    let user = logged_in_user(&state);
    state.wallet.add_points(5000).unwrap();

    for feature_id in [GOLD_FRAME, SILVER_FRAME, WIZARD_HAT] {
        let (ok, _) = state.features.purchase_feature(user.id, feature_id);
        assert!(ok);
    }

    assert!(state.features.equip_feature(user.id, GOLD_FRAME));
    assert!(state.features.equip_feature(user.id, WIZARD_HAT));
    // The second frame displaces the first but leaves the hat alone.
    assert!(state.features.equip_feature(user.id, SILVER_FRAME));

    let equipped = state.features.get_user_equipped_features(user.id).unwrap();
    let mut ids: Vec<i64> = equipped.iter().map(|f| f.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![SILVER_FRAME, WIZARD_HAT]);
}

#[test]
fn unpurchased_features_cannot_be_equipped() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(&temp_dir);
    let user = logged_in_user(&state);

    assert!(!state.features.equip_feature(user.id, GOLD_FRAME));
    let (ok, message) = state.features.unequip_feature(user.id, GOLD_FRAME);
    assert!(!ok);
    assert_eq!(message, "Feature not purchased");
}

#[test]
fn unequip_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(&temp_dir);
    let user = logged_in_user(&state);
    state.wallet.add_points(5000).unwrap();

    state.features.purchase_feature(user.id, GOLD_FRAME);
    assert!(state.features.equip_feature(user.id, GOLD_FRAME));

    let (ok, message) = state.features.unequip_feature(user.id, GOLD_FRAME);
    assert!(ok);
    assert_eq!(message, "Feature unequipped successfully");
    assert!(state
        .features
        .get_user_equipped_features(user.id)
        .unwrap()
        .is_empty());
}

#[test]
fn catalog_groups_by_category() {
    let temp_dir = TempDir::new().unwrap();
    let state = test_state(&temp_dir);

    let grouped = state.features.get_features_by_categories().unwrap();
    assert_eq!(grouped["frame"].len(), 3);
    assert_eq!(grouped["hat"].len(), 2);
    assert_eq!(grouped["pet"].len(), 2);
    assert_eq!(grouped["emoji"].len(), 1);
    assert_eq!(grouped["background"].len(), 1);
}
