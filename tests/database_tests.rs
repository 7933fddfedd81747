use oilrig::db;
use oilrig::models::WITHDRAWAL_PENDING;
use sqlx::any::AnyPoolOptions;

const NOW: i64 = 1_700_000_000_000;

async fn setup_test_db() -> sqlx::Pool<sqlx::Any> {
    sqlx::any::install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::run_migrations(&pool, "sqlite::memory:").await.unwrap();
    pool
}

#[tokio::test]
async fn test_get_or_create_player_creates_defaults() {
    let pool = setup_test_db().await;

    let player = db::get_or_create_player(&pool, "12345", Some("driller"), NOW)
        .await
        .unwrap();

    assert_eq!(player.id, "12345");
    assert_eq!(player.display_name, Some("driller".to_string()));
    assert_eq!(player.oil, 0.0);
    assert_eq!(player.currency, 0);
    assert_eq!(player.black_oil, 0);
    assert_eq!(player.rig_level, 1);
    assert_eq!(player.last_mine_at, 0);
    assert_eq!(player.referred_by, None);
    assert_eq!(player.created_at, NOW);
}

#[tokio::test]
async fn test_create_player_keeps_first_referrer() {
    let pool = setup_test_db().await;

    assert!(db::create_player(&pool, "2", None, Some("1"), NOW).await.unwrap());
    assert!(!db::create_player(&pool, "2", None, Some("9"), NOW).await.unwrap());
    db::get_or_create_player(&pool, "3", None, NOW).await.unwrap();

    let player = db::get_player(&pool, "2").await.unwrap().unwrap();
    assert_eq!(player.referred_by, Some("1".to_string()));
    assert_eq!(db::count_referrals(&pool, "1").await.unwrap(), 1);
    assert_eq!(db::count_referrals(&pool, "9").await.unwrap(), 0);
}

#[tokio::test]
async fn test_get_or_create_player_is_idempotent() {
    let pool = setup_test_db().await;
    let first = db::get_or_create_player(&pool, "12345", None, NOW).await.unwrap();
    let second = db::get_or_create_player(&pool, "12345", None, NOW + 5_000)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(second.created_at, NOW);
}

#[tokio::test]
async fn test_display_name_refresh() {
    let pool = setup_test_db().await;
    db::get_or_create_player(&pool, "12345", Some("oldname"), NOW)
        .await
        .unwrap();

    let renamed = db::get_or_create_player(&pool, "12345", Some("newname"), NOW)
        .await
        .unwrap();
    assert_eq!(renamed.display_name, Some("newname".to_string()));

    let untouched = db::get_or_create_player(&pool, "12345", None, NOW)
        .await
        .unwrap();
    assert_eq!(untouched.display_name, Some("newname".to_string()));
}

#[tokio::test]
async fn test_get_player_missing() {
    let pool = setup_test_db().await;
    assert!(db::get_player(&pool, "nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_apply_mine_is_conditional_on_last_mine_at() {
    let pool = setup_test_db().await;
    db::get_or_create_player(&pool, "1", None, NOW).await.unwrap();

    assert!(db::apply_mine(&pool, "1", 17.5, 0, NOW).await.unwrap());
    // A second writer that read the old timestamp must lose.
    assert!(!db::apply_mine(&pool, "1", 17.5, 0, NOW).await.unwrap());

    let player = db::get_player(&pool, "1").await.unwrap().unwrap();
    assert_eq!(player.oil, 17.5);
    assert_eq!(player.last_mine_at, NOW);
}

#[tokio::test]
async fn test_apply_upgrade_requires_level_and_funds() {
    let pool = setup_test_db().await;
    db::get_or_create_player(&pool, "1", None, NOW).await.unwrap();
    db::write_snapshot(&pool, "1", 6_000.0, 0).await.unwrap();

    assert!(!db::apply_upgrade(&pool, "1", 2, 3, 5_000.0).await.unwrap());
    assert!(!db::apply_upgrade(&pool, "1", 1, 2, 7_000.0).await.unwrap());
    assert!(db::apply_upgrade(&pool, "1", 1, 2, 5_000.0).await.unwrap());
    assert!(!db::apply_upgrade(&pool, "1", 1, 2, 5_000.0).await.unwrap());

    let player = db::get_player(&pool, "1").await.unwrap().unwrap();
    assert_eq!(player.rig_level, 2);
    assert_eq!(player.oil, 1_000.0);
}

#[tokio::test]
async fn test_apply_checkin_claims_day_once() {
    let pool = setup_test_db().await;
    db::get_or_create_player(&pool, "1", None, NOW).await.unwrap();
    assert!(db::get_checkin(&pool, "1").await.unwrap().is_none());

    assert!(db::apply_checkin(&pool, "1", None, 100, 1, 20).await.unwrap());
    // A second first-ever claim must lose to the existing row.
    assert!(!db::apply_checkin(&pool, "1", None, 100, 1, 20).await.unwrap());
    // So must a claim based on a stale day.
    assert!(!db::apply_checkin(&pool, "1", Some(99), 101, 2, 30).await.unwrap());
    assert!(db::apply_checkin(&pool, "1", Some(100), 101, 2, 30).await.unwrap());

    let checkin = db::get_checkin(&pool, "1").await.unwrap().unwrap();
    assert_eq!((checkin.last_day, checkin.streak), (101, 2));
    let player = db::get_player(&pool, "1").await.unwrap().unwrap();
    assert_eq!(player.black_oil, 50);
}

#[tokio::test]
async fn test_apply_convert_never_goes_negative() {
    let pool = setup_test_db().await;
    db::get_or_create_player(&pool, "1", None, NOW).await.unwrap();
    db::write_snapshot(&pool, "1", 150.0, 3).await.unwrap();
    db::apply_checkin(&pool, "1", None, 100, 1, 20).await.unwrap();

    assert!(db::apply_convert(&pool, "1", 15, 150).await.unwrap());
    assert!(!db::apply_convert(&pool, "1", 15, 150).await.unwrap());

    let player = db::get_player(&pool, "1").await.unwrap().unwrap();
    assert_eq!(player.black_oil, 5);
    assert_eq!(player.currency, 153);
    assert_eq!(player.oil, 150.0);
}

#[tokio::test]
async fn test_insert_withdrawal_is_pending() {
    let pool = setup_test_db().await;

    let withdrawal = db::insert_withdrawal(&pool, "1", Some("driller"), 250, "84912345678", NOW)
        .await
        .unwrap();

    assert!(withdrawal.id > 0);
    assert_eq!(withdrawal.player_id, "1");
    assert_eq!(withdrawal.amount_xu, 250);
    assert_eq!(withdrawal.contact, "84912345678");
    assert_eq!(withdrawal.status, WITHDRAWAL_PENDING);
    assert_eq!(withdrawal.created_at, NOW);
}

#[tokio::test]
async fn test_list_withdrawals_newest_first_and_limited() {
    let pool = setup_test_db().await;
    for i in 0..25 {
        db::insert_withdrawal(&pool, "1", None, 200 + i, "84912345678", NOW + i)
            .await
            .unwrap();
    }
    db::insert_withdrawal(&pool, "2", None, 999, "84900000000", NOW + 100)
        .await
        .unwrap();

    let rows = db::list_withdrawals(&pool, "1", 20).await.unwrap();

    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0].amount_xu, 224);
    assert_eq!(rows[19].amount_xu, 205);
    assert!(rows.iter().all(|row| row.player_id == "1"));
    assert!(rows.windows(2).all(|pair| pair[0].created_at >= pair[1].created_at));
}

#[tokio::test]
async fn test_list_withdrawals_same_timestamp_orders_by_id() {
    let pool = setup_test_db().await;
    let first = db::insert_withdrawal(&pool, "1", None, 200, "84912345678", NOW)
        .await
        .unwrap();
    let second = db::insert_withdrawal(&pool, "1", None, 300, "84912345678", NOW)
        .await
        .unwrap();

    let rows = db::list_withdrawals(&pool, "1", 20).await.unwrap();

    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![second.id, first.id]);
}
