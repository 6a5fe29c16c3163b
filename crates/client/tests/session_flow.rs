mod common;

use assert_matches::assert_matches;
use fittrack_client::flows::{sign_out, LoginForm, RegisterForm};
use fittrack_client::{GateState, Route};
use fittrack_core::{AuthError, CoreError};
use fittrack_events::{EventKind, Notice};

use common::{build_test_state, signed_in_as, TEST_PASSWORD};

#[tokio::test]
async fn unknown_email_and_wrong_password_look_the_same() {
    let (state, _backend) = build_test_state();
    state.session.register("a@x.com", TEST_PASSWORD).await.unwrap();
    let mut rx = state.bus.subscribe();

    let unknown = LoginForm::new("nobody@x.com", TEST_PASSWORD).submit(&state).await;
    let wrong = LoginForm::new("a@x.com", "not-the-password").submit(&state).await;
    assert_eq!(unknown, wrong);
    assert_matches!(unknown, Err(CoreError::Auth(AuthError::InvalidCredential)));

    let notices: Vec<Notice> = std::iter::from_fn(|| rx.try_recv().ok())
        .filter_map(|e| match e.kind {
            EventKind::Notice(n) => Some(n),
            _ => None,
        })
        .collect();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0], notices[1]);
}

#[tokio::test]
async fn busy_is_cleared_after_every_failure() {
    let (state, backend) = build_test_state();

    assert!(LoginForm::new("a@x.com", "wrong!").submit(&state).await.is_err());
    assert!(!state.busy.is_busy());

    backend.auth.set_online(false);
    let form = RegisterForm {
        full_name: "Sam".into(),
        email: "a@x.com".into(),
        password: TEST_PASSWORD.into(),
        confirm_password: TEST_PASSWORD.into(),
    };
    assert_matches!(
        form.submit(&state).await,
        Err(CoreError::Auth(AuthError::Unavailable(_)))
    );
    assert!(!state.busy.is_busy());
    assert_eq!(state.busy.in_flight(), 0);
}

#[tokio::test]
async fn busy_transitions_are_published_once_per_edge() {
    let (state, _backend) = build_test_state();
    state.session.register("a@x.com", TEST_PASSWORD).await.unwrap();
    let mut rx = state.bus.subscribe();

    LoginForm::new("a@x.com", TEST_PASSWORD).submit(&state).await.unwrap();

    let busy: Vec<bool> = std::iter::from_fn(|| rx.try_recv().ok())
        .filter_map(|e| match e.kind {
            EventKind::BusyChanged { busy } => Some(busy),
            _ => None,
        })
        .collect();
    assert_eq!(busy, vec![true, false]);
}

#[tokio::test]
async fn session_observers_see_login_and_logout_in_order() {
    let (state, _backend) = build_test_state();
    let mut watcher = state.session.subscribe();

    let me = signed_in_as(&state, "a@x.com").await;
    sign_out(&state).await;
    sign_out(&state).await;

    assert_eq!(watcher.changed().await, Some(Some(me)));
    assert_eq!(watcher.changed().await, Some(None));
    assert_eq!(watcher.try_changed(), None);
}

#[tokio::test]
async fn cold_start_never_resumes_a_previous_session() {
    let (state, backend) = build_test_state();
    signed_in_as(&state, "a@x.com").await;
    let token = state.session.token().unwrap();

    // A second client on the same providers starts signed out until the host
    // restores the saved token.
    let second = fittrack_client::AppState::init(
        fittrack_client::ClientConfig::default(),
        backend.auth.clone(),
        backend.store.clone(),
    );
    assert_eq!(second.gate.state(), GateState::Unauthenticated);
    assert_eq!(second.gate.current(), Route::Welcome);

    second.session.restore(&token).await.expect("restore should succeed");
    assert_eq!(second.gate.current(), Route::Home);
}

#[tokio::test]
async fn welcome_to_dashboard_by_forms() {
    let (state, _backend) = build_test_state();
    assert_eq!(state.gate.navigate(Route::Register), Route::Register);

    RegisterForm {
        full_name: "Sam Lifter".into(),
        email: "sam@x.com".into(),
        password: TEST_PASSWORD.into(),
        confirm_password: TEST_PASSWORD.into(),
    }
    .submit(&state)
    .await
    .unwrap();
    assert_eq!(state.gate.current(), Route::Login);

    let me = LoginForm::new("sam@x.com", TEST_PASSWORD).submit(&state).await.unwrap();
    assert_eq!(me.greeting_name(), "Sam Lifter");
    assert_eq!(state.gate.current(), Route::Home);
    assert_eq!(state.gate.navigate(Route::Login), Route::Home);
}
