use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;

use mwap_backend::{
    client::{
        AuthBackend, FlowError, HttpBackend, LoginFlow, LoginState, RegistrationFlow,
        RegistrationState, SessionContext, SessionEstablisher, SessionEvent,
    },
    models::{Gender, RegistrantDraft, UniquenessQuery, WorkingCategory},
    utils::{is_worker_id, AuthError, ConflictField},
};

mod helper;

use helper::{spawn_server, test_state};

fn draft(mobile: &str, national_id: &str) -> RegistrantDraft {
    let mut draft = RegistrantDraft::default();
    draft
        .set_name("Sunita Devi")
        .set_age_text("34")
        .set_gender(Gender::Female)
        .set_working_category(WorkingCategory::Domestic)
        .set_migration_place("Surat")
        .set_mobile(mobile)
        .set_national_id(national_id);
    draft
}

fn http_backend(state: Arc<mwap_backend::state::AppState>) -> Arc<dyn AuthBackend> {
    let addr = spawn_server(state);
    Arc::new(HttpBackend::new(&format!("http://{addr}")).unwrap())
}

#[tokio::test]
async fn test_register_then_login_over_http() {
    let (state, store) = test_state();
    let backend = http_backend(state);
    let session = Arc::new(SessionContext::new());
    let mut events = session.subscribe();
    let establisher = Arc::new(SessionEstablisher::new(backend.clone(), session.clone()));

    let signup = RegistrationFlow::new(backend.clone(), establisher.clone());
    let sent = signup
        .submit_details(&draft("9876543210", "111122223333"))
        .await
        .unwrap();
    assert_eq!(sent.delivered, true);
    assert_eq!(signup.state().await, RegistrationState::AwaitingOtpEntry);

    // the otp is sent to the international form of the number
    let stored = store.challenges_for("+919876543210").await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].consumed, false);

    let worker = signup.submit_code(&sent.code.unwrap()).await.unwrap();
    assert!(is_worker_id(&worker.worker_id));
    assert_eq!(signup.state().await, RegistrationState::SessionEstablished);
    assert_eq!(store.challenges_for("+919876543210").await[0].consumed, true);
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::Established(worker.worker_id.clone())
    );
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    establisher.logout().await;
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Cleared);

    let login = LoginFlow::new(backend, establisher);
    let sent = login.submit_mobile("9876543210").await.unwrap();
    let loaded = login.submit_code(&sent.code.unwrap()).await.unwrap();
    assert_eq!(loaded.worker_id, worker.worker_id);
    assert!(loaded.last_login_at.is_some());
    assert_eq!(login.state().await, LoginState::SessionEstablished);
    assert_eq!(session.current().await.unwrap().worker_id, worker.worker_id);
}

#[tokio::test]
async fn test_http_errors_keep_their_kind() {
    let (state, _) = test_state();
    let backend = http_backend(state);

    let sent = backend.send_otp("+919876543210").await.unwrap();
    let code = sent.code.unwrap();
    let wrong = if code == "123456" { "654321" } else { "123456" };
    let err = backend.verify_otp("+919876543210", wrong).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCode));

    let err = backend.record_login("9876543210").await.unwrap_err();
    assert!(matches!(err, AuthError::NotVerified));

    backend.verify_otp("+919876543210", &code).await.unwrap();
    let err = backend.record_login("9876543210").await.unwrap_err();
    assert!(matches!(err, AuthError::NotFound));
}

#[tokio::test]
async fn test_registered_mobile_is_rejected_before_sending_otp() {
    let (state, store) = test_state();
    let backend = http_backend(state);
    let session = Arc::new(SessionContext::new());
    let establisher = Arc::new(SessionEstablisher::new(backend.clone(), session));

    let first = RegistrationFlow::new(backend.clone(), establisher.clone());
    let sent = first
        .submit_details(&draft("9876543210", "111122223333"))
        .await
        .unwrap();
    first.submit_code(&sent.code.unwrap()).await.unwrap();

    let query = UniquenessQuery {
        mobile: Some("9876543210".into()),
        national_id: None,
    };
    let report = backend.check_uniqueness(&query).await.unwrap();
    assert_eq!(report.mobile_taken, true);

    let second = RegistrationFlow::new(backend, establisher);
    let err = second
        .submit_details(&draft("9876543210", "444455556666"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FlowError::Auth(AuthError::Conflict(ConflictField::Mobile))
    ));
    assert_eq!(second.state().await, RegistrationState::Collecting);
    // no second otp was issued
    assert_eq!(store.challenges_for("+919876543210").await.len(), 1);
}
