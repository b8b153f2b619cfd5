//! Integration tests for the user repository.

use assert_matches::assert_matches;
use chrono::Duration;
use greenlight_core::password::PlaintextPassword;
use greenlight_core::token::{scopes, TokenPlaintext};
use greenlight_db::error::DbError;
use greenlight_db::models::user::CreateUser;
use greenlight_db::repositories::{TokenRepo, UserRepo};
use greenlight_db::Db;
use sqlx::PgPool;

fn new_user(name: &str, email: &str) -> CreateUser {
    CreateUser::new(name, email, &PlaintextPassword::new("pa55word-1234")).unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn insert_and_get_by_email(pool: PgPool) {
    let db = Db::from(pool);
    let user = UserRepo::insert(&db, &new_user("Alice", "alice@example.com"))
        .await
        .unwrap();

    assert!(user.id >= 1);
    assert_eq!(user.version, 1);
    assert!(!user.activated);
    assert!(!user.is_anonymous());

    let fetched = UserRepo::get_by_email(&db, "ALICE@example.com").await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert!(fetched
        .password_hash
        .matches(&PlaintextPassword::new("pa55word-1234"))
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_email_is_not_found(pool: PgPool) {
    let db = Db::from(pool);
    assert_matches!(
        UserRepo::get_by_email(&db, "nobody@example.com").await,
        Err(DbError::NotFound)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_is_rejected_and_existing_row_kept(pool: PgPool) {
    let db = Db::from(pool);
    let existing = UserRepo::insert(&db, &new_user("Alice", "alice@example.com"))
        .await
        .unwrap();

    assert_matches!(
        UserRepo::insert(&db, &new_user("Mallory", "Alice@Example.com")).await,
        Err(DbError::DuplicateEmail)
    );

    let stored = UserRepo::get_by_email(&db, "alice@example.com").await.unwrap();
    assert_eq!(stored.id, existing.id);
    assert_eq!(stored.name, "Alice");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_to_taken_email_is_duplicate(pool: PgPool) {
    let db = Db::from(pool);
    UserRepo::insert(&db, &new_user("Alice", "alice@example.com"))
        .await
        .unwrap();
    let mut bob = UserRepo::insert(&db, &new_user("Bob", "bob@example.com"))
        .await
        .unwrap();

    bob.email = "alice@example.com".to_string();
    assert_matches!(
        UserRepo::update(&db, &bob).await,
        Err(DbError::DuplicateEmail)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activation_bumps_version_and_stale_update_conflicts(pool: PgPool) {
    let db = Db::from(pool);
    let user = UserRepo::insert(&db, &new_user("Alice", "alice@example.com"))
        .await
        .unwrap();

    let mut activated = user.clone();
    activated.activated = true;
    assert_eq!(UserRepo::update(&db, &activated).await.unwrap(), 2);

    let mut stale = user.clone();
    stale.name = "Eve".to_string();
    assert_matches!(UserRepo::update(&db, &stale).await, Err(DbError::EditConflict));

    let stored = UserRepo::get_by_email(&db, "alice@example.com").await.unwrap();
    assert!(stored.activated);
    assert_eq!(stored.name, "Alice");
    assert_eq!(stored.version, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_for_token_finds_owner(pool: PgPool) {
    let db = Db::from(pool);
    let user = UserRepo::insert(&db, &new_user("Alice", "alice@example.com"))
        .await
        .unwrap();
    let token = TokenRepo::new(&db, user.id, Duration::hours(1), scopes::ACTIVATION)
        .await
        .unwrap();

    let owner = UserRepo::get_for_token(&db, scopes::ACTIVATION, &token.plaintext)
        .await
        .unwrap();
    assert_eq!(owner.id, user.id);
    assert_eq!(owner.email, "alice@example.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_for_token_hides_why_lookup_failed(pool: PgPool) {
    let db = Db::from(pool);
    let user = UserRepo::insert(&db, &new_user("Alice", "alice@example.com"))
        .await
        .unwrap();
    let token = TokenRepo::new(&db, user.id, Duration::hours(1), scopes::ACTIVATION)
        .await
        .unwrap();

    // Wrong scope.
    assert_matches!(
        UserRepo::get_for_token(&db, scopes::AUTHENTICATION, &token.plaintext).await,
        Err(DbError::NotFound)
    );
    // Unknown token.
    assert_matches!(
        UserRepo::get_for_token(
            &db,
            scopes::ACTIVATION,
            &TokenPlaintext::new("ABCDEFGHIJKLMNOPQRSTUVWXYZ")
        )
        .await,
        Err(DbError::NotFound)
    );
}
