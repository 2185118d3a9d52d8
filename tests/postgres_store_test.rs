//! `PgCredentialStore` against a live database. Run with
//! `DATABASE_URL=postgres://... cargo test --test postgres_store_test -- --ignored`.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vitalflow_api::database::{
    connection::get_db_pool, schema::run_migrations, CredentialStore, PgCredentialStore,
};
use vitalflow_api::models::doctor::UpdateDoctor;
use vitalflow_api::models::otp::NewOtpSession;

async fn store() -> Option<(PgCredentialStore, PgPool)> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping");
            return None;
        }
    };
    let pool = get_db_pool(&url).await.unwrap();
    run_migrations(&pool).await.unwrap();
    Some((PgCredentialStore::new(pool.clone()), pool))
}

// Fresh address per test so runs against a shared database never collide.
fn unique_email() -> String {
    format!("doc-{}@vitalsflow.in", Uuid::new_v4())
}

fn new_session(email: &str, offset_secs: i64) -> NewOtpSession {
    let created_at = Utc::now() + Duration::seconds(offset_secs);
    NewOtpSession {
        email: email.to_string(),
        otp_hash: "hash".to_string(),
        created_at,
        expires_at: created_at + Duration::minutes(5),
    }
}

#[tokio::test]
#[ignore]
async fn replacing_a_session_invalidates_the_previous_one() {
    let Some((store, _pool)) = store().await else { return };
    let email = unique_email();

    let first = store.replace_otp_session(new_session(&email, 0)).await.unwrap();
    let second = store.replace_otp_session(new_session(&email, 1)).await.unwrap();

    let sessions = store.otp_sessions_for(&email).await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, second.id);
    assert!(!sessions[0].used);
    assert_eq!(sessions[1].id, first.id);
    assert!(sessions[1].used);

    let active = store
        .latest_active_otp_session(&email, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, second.id);
}

#[tokio::test]
#[ignore]
async fn expired_sessions_are_not_selected() {
    let Some((store, _pool)) = store().await else { return };
    let email = unique_email();

    store.replace_otp_session(new_session(&email, 0)).await.unwrap();

    let later = Utc::now() + Duration::minutes(10);
    assert!(store.latest_active_otp_session(&email, later).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn failed_attempts_are_clamped_at_the_ceiling() {
    let Some((store, _pool)) = store().await else { return };
    let session = store
        .replace_otp_session(new_session(&unique_email(), 0))
        .await
        .unwrap();

    for expected in [1, 2, 3, 3] {
        assert_eq!(store.record_failed_attempt(session.id, 3).await.unwrap(), expected);
    }
}

#[tokio::test]
#[ignore]
async fn a_session_can_only_be_consumed_once() {
    let Some((store, _pool)) = store().await else { return };
    let session = store
        .replace_otp_session(new_session(&unique_email(), 0))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        store.consume_otp_session(session.id),
        store.consume_otp_session(session.id)
    );
    assert!(a.unwrap() ^ b.unwrap());
    assert!(!store.consume_otp_session(session.id).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn upsert_keeps_a_single_doctor_per_email() {
    let Some((store, pool)) = store().await else { return };
    let email = unique_email();

    let first = store.upsert_doctor(&email, Utc::now()).await.unwrap();
    let second = store
        .upsert_doctor(&email, Utc::now() + Duration::minutes(1))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert!(second.updated_at > first.updated_at);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM doctors WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
#[ignore]
async fn pin_hash_is_written_only_once() {
    let Some((store, _pool)) = store().await else { return };
    let doctor = store.upsert_doctor(&unique_email(), Utc::now()).await.unwrap();

    assert!(store.set_pin_hash_once(doctor.id, "first", Utc::now()).await.unwrap());
    assert!(!store.set_pin_hash_once(doctor.id, "second", Utc::now()).await.unwrap());

    let stored = store.find_doctor(doctor.id).await.unwrap().unwrap();
    assert_eq!(stored.pin_hash.as_deref(), Some("first"));
    assert!(stored.has_pin());
}

#[tokio::test]
#[ignore]
async fn profile_update_keeps_unset_fields() {
    let Some((store, _pool)) = store().await else { return };
    let doctor = store.upsert_doctor(&unique_email(), Utc::now()).await.unwrap();

    let first = UpdateDoctor {
        name: Some("Dr. Priya Sharma".into()),
        phone: Some("+919800000000".into()),
        ..Default::default()
    };
    store.update_doctor(doctor.id, &first, Utc::now()).await.unwrap();

    let second = UpdateDoctor {
        clinic_name: Some("HeartCare Clinic".into()),
        ..Default::default()
    };
    let updated = store
        .update_doctor(doctor.id, &second, Utc::now())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name.as_deref(), Some("Dr. Priya Sharma"));
    assert_eq!(updated.phone.as_deref(), Some("+919800000000"));
    assert_eq!(updated.clinic_name.as_deref(), Some("HeartCare Clinic"));
    assert!(store
        .update_doctor(Uuid::new_v4(), &second, Utc::now())
        .await
        .unwrap()
        .is_none());
}
