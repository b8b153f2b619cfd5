//! Integration tests for the token repository.

use assert_matches::assert_matches;
use chrono::Duration;
use greenlight_core::password::PlaintextPassword;
use greenlight_core::token::{generate_token, scopes, TOKEN_LENGTH};
use greenlight_core::types::DbId;
use greenlight_db::error::DbError;
use greenlight_db::models::user::CreateUser;
use greenlight_db::repositories::{TokenRepo, UserRepo};
use greenlight_db::Db;
use sqlx::PgPool;

async fn create_user(db: &Db, email: &str) -> DbId {
    let input = CreateUser::new("Token Owner", email, &PlaintextPassword::new("pa55word-1234"))
        .unwrap();
    UserRepo::insert(db, &input).await.unwrap().id
}

async fn stored_tokens(db: &Db, user_id: DbId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM tokens WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(db.pool())
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_the_hash_is_stored(pool: PgPool) {
    let db = Db::from(pool);
    let user_id = create_user(&db, "alice@example.com").await;

    let token = TokenRepo::new(&db, user_id, Duration::hours(24), scopes::ACTIVATION)
        .await
        .unwrap();
    assert_eq!(token.plaintext.expose().len(), TOKEN_LENGTH);

    let hash: Vec<u8> = sqlx::query_scalar("SELECT hash FROM tokens WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(hash, token.plaintext.hash().as_bytes());
    assert_ne!(hash, token.plaintext.expose().as_bytes());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_token_is_not_found_but_still_stored(pool: PgPool) {
    let db = Db::from(pool);
    let user_id = create_user(&db, "alice@example.com").await;

    let token = generate_token(user_id, Duration::seconds(-60), scopes::AUTHENTICATION);
    TokenRepo::insert(&db, &token).await.unwrap();

    assert_matches!(
        UserRepo::get_for_token(&db, scopes::AUTHENTICATION, &token.plaintext).await,
        Err(DbError::NotFound)
    );
    assert_eq!(stored_tokens(&db, user_id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_all_for_user_is_scoped(pool: PgPool) {
    let db = Db::from(pool);
    let alice = create_user(&db, "alice@example.com").await;
    let bob = create_user(&db, "bob@example.com").await;

    for _ in 0..3 {
        TokenRepo::new(&db, alice, Duration::hours(1), scopes::AUTHENTICATION)
            .await
            .unwrap();
    }
    let activation = TokenRepo::new(&db, alice, Duration::hours(1), scopes::ACTIVATION)
        .await
        .unwrap();
    TokenRepo::new(&db, bob, Duration::hours(1), scopes::AUTHENTICATION)
        .await
        .unwrap();

    let deleted = TokenRepo::delete_all_for_user(&db, scopes::AUTHENTICATION, alice)
        .await
        .unwrap();
    assert_eq!(deleted, 3);

    // Other scopes and other users keep their tokens.
    let owner = UserRepo::get_for_token(&db, scopes::ACTIVATION, &activation.plaintext)
        .await
        .unwrap();
    assert_eq!(owner.id, alice);
    assert_eq!(stored_tokens(&db, bob).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_all_for_user_with_nothing_to_delete(pool: PgPool) {
    let db = Db::from(pool);
    let user_id = create_user(&db, "alice@example.com").await;

    let deleted = TokenRepo::delete_all_for_user(&db, scopes::PASSWORD_RESET, user_id)
        .await
        .unwrap();
    assert_eq!(deleted, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_expired_reaps_only_expired(pool: PgPool) {
    let db = Db::from(pool);
    let user_id = create_user(&db, "alice@example.com").await;

    let expired = generate_token(user_id, Duration::seconds(-1), scopes::ACTIVATION);
    TokenRepo::insert(&db, &expired).await.unwrap();
    let live = TokenRepo::new(&db, user_id, Duration::hours(1), scopes::ACTIVATION)
        .await
        .unwrap();

    assert_eq!(TokenRepo::delete_expired(&db).await.unwrap(), 1);
    assert_eq!(stored_tokens(&db, user_id).await, 1);
    UserRepo::get_for_token(&db, scopes::ACTIVATION, &live.plaintext)
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn tokens_are_removed_with_their_owner(pool: PgPool) {
    let db = Db::from(pool);
    let user_id = create_user(&db, "alice@example.com").await;
    TokenRepo::new(&db, user_id, Duration::hours(1), scopes::ACTIVATION)
        .await
        .unwrap();

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(db.pool())
        .await
        .unwrap();
    assert_eq!(stored_tokens(&db, user_id).await, 0);
}
