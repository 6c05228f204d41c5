//! Integration tests for dependency waiting.

use std::time::{Duration, Instant};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use vigil_netwait::{DependencyTarget, Error, wait};

/// Binds a listener on an ephemeral port and returns it with its port.
async fn bound_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind listener");
    let port = listener.local_addr().expect("no local addr").port();
    (listener, port)
}

#[tokio::test]
async fn returns_quickly_when_already_listening() {
    let (_listener, port) = bound_listener().await;

    let target = DependencyTarget::new("127.0.0.1", port, "test service", 5);
    let ready = wait(&target, &CancellationToken::new())
        .await
        .expect("expected the wait to succeed");

    assert!(ready.elapsed < Duration::from_secs(2));
}

#[tokio::test]
async fn succeeds_within_one_poll_of_the_dependency_appearing() {
    let (listener, port) = bound_listener().await;
    drop(listener);

    let appear_after = Duration::from_millis(1500);
    let server = tokio::spawn(async move {
        tokio::time::sleep(appear_after).await;
        TcpListener::bind(("127.0.0.1", port))
            .await
            .expect("failed to rebind listener")
    });

    let target = DependencyTarget::new("127.0.0.1", port, "late service", 10);
    let started = Instant::now();
    let ready = wait(&target, &CancellationToken::new())
        .await
        .expect("expected the wait to succeed");

    // Success must land within one poll interval of availability.
    assert!(started.elapsed() < appear_after + Duration::from_secs(2));
    assert!(ready.elapsed >= Duration::from_millis(1000));

    drop(server.await);
}

#[tokio::test]
async fn times_out_when_nothing_ever_listens() {
    let (listener, port) = bound_listener().await;
    drop(listener);

    let target = DependencyTarget::new("127.0.0.1", port, "absent service", 2);
    let started = Instant::now();
    let err = wait(&target, &CancellationToken::new())
        .await
        .expect_err("expected a timeout");

    let elapsed = started.elapsed();
    assert!(matches!(err, Error::Timeout { .. }));
    // Never earlier than the deadline, never more than one poll late.
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(4));
}

#[tokio::test]
async fn cancellation_wins_over_the_deadline() {
    let (listener, port) = bound_listener().await;
    drop(listener);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        canceller.cancel();
    });

    let target = DependencyTarget::new("127.0.0.1", port, "doomed service", 30);
    let started = Instant::now();
    let err = wait(&target, &token).await.expect_err("expected cancellation");

    assert!(matches!(err, Error::Cancelled(_)));
    assert!(started.elapsed() < Duration::from_secs(5));
}
