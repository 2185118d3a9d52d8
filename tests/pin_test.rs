//! Signing PIN lifecycle.

mod common;

use uuid::Uuid;

use common::harness;
use vitalflow_api::database::CredentialStore;
use vitalflow_api::services::pin_service::PinVerification;
use vitalflow_api::AppError;

async fn logged_in_doctor(h: &common::Harness) -> Uuid {
    let email = "pin@x.com";
    h.state.otp_service.request_challenge(email).await.unwrap();
    let code = h.notifier.last_code_for(email);
    h.state.otp_service.verify(email, &code).await.unwrap().doctor_id
}

#[tokio::test]
async fn set_then_verify_pin() {
    let h = harness();
    let doctor_id = logged_in_doctor(&h).await;

    h.state.pin_service.set_pin(doctor_id, "12345").await.unwrap();

    let ok = h.state.pin_service.verify_pin(doctor_id, "12345").await.unwrap();
    assert_eq!(ok, PinVerification { verified: true });

    let err = h.state.pin_service.verify_pin(doctor_id, "99999").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidPin));

    // A wrong PIN leaves the stored credential alone.
    let doctor = h.store.find_doctor(doctor_id).await.unwrap().unwrap();
    assert!(doctor.pin_set);
    assert!(h.state.pin_service.verify_pin(doctor_id, "12345").await.is_ok());
}

#[tokio::test]
async fn second_set_is_rejected_and_keeps_the_first_hash() {
    let h = harness();
    let doctor_id = logged_in_doctor(&h).await;

    h.state.pin_service.set_pin(doctor_id, "1234").await.unwrap();
    let before = h.store.find_doctor(doctor_id).await.unwrap().unwrap().pin_hash;

    let err = h.state.pin_service.set_pin(doctor_id, "5678").await.unwrap_err();
    assert!(matches!(err, AppError::PinAlreadySet));

    let after = h.store.find_doctor(doctor_id).await.unwrap().unwrap().pin_hash;
    assert_eq!(before, after);
    assert!(h.state.pin_service.verify_pin(doctor_id, "1234").await.is_ok());
    assert!(matches!(
        h.state.pin_service.verify_pin(doctor_id, "5678").await,
        Err(AppError::InvalidPin)
    ));
}

#[tokio::test]
async fn verifying_before_setting_reports_pin_not_set() {
    let h = harness();
    let doctor_id = logged_in_doctor(&h).await;

    let err = h.state.pin_service.verify_pin(doctor_id, "1234").await.unwrap_err();
    assert!(matches!(err, AppError::PinNotSet));
}

#[tokio::test]
async fn pin_shape_is_enforced_by_the_service() {
    let h = harness();
    let doctor_id = logged_in_doctor(&h).await;

    for bad in ["123", "1234567", "12a4", ""] {
        assert!(matches!(
            h.state.pin_service.set_pin(doctor_id, bad).await,
            Err(AppError::InvalidInput(_))
        ));
    }
    assert!(!h.store.find_doctor(doctor_id).await.unwrap().unwrap().pin_set);
}

#[tokio::test]
async fn unknown_doctor_is_not_found() {
    let h = harness();
    let ghost = Uuid::new_v4();

    assert!(matches!(
        h.state.pin_service.set_pin(ghost, "1234").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        h.state.pin_service.verify_pin(ghost, "1234").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn concurrent_sets_store_exactly_one_pin() {
    let h = harness();
    let doctor_id = logged_in_doctor(&h).await;

    let a = h.state.pin_service.clone();
    let b = h.state.pin_service.clone();
    let (ra, rb) = tokio::join!(
        tokio::spawn(async move { a.set_pin(doctor_id, "1111").await }),
        tokio::spawn(async move { b.set_pin(doctor_id, "2222").await }),
    );
    let results = [ra.unwrap(), rb.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(r, Err(AppError::PinAlreadySet))));

    let one = h.state.pin_service.verify_pin(doctor_id, "1111").await.is_ok();
    let two = h.state.pin_service.verify_pin(doctor_id, "2222").await.is_ok();
    assert!(one ^ two);
}
