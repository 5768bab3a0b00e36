use std::sync::Arc;

use airplanes::transport::{InMemoryConnector, InMemoryTransport};
use airplanes::{ClientConfig, Transport, TransportClient, TransportEvent, RECONNECT_DELAY};
use tokio::time::{sleep, Duration, Instant};

fn config() -> ClientConfig {
    ClientConfig::new("memory")
}

#[tokio::test]
async fn in_memory_pair_delivers_and_closes() -> anyhow::Result<()> {
    let (mut a, mut b) = InMemoryTransport::pair();
    a.send("ping".to_string()).await?;
    assert_eq!(b.recv().await?, "ping");
    b.send("pong".to_string()).await?;
    assert_eq!(a.recv().await?, "pong");

    a.close().await?;
    assert!(b.recv().await.is_err());
    assert!(a.send("late".to_string()).await.is_err());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn reconnects_after_fixed_delay_until_disconnect() {
    let (connector, mut accepted) = InMemoryConnector::new();
    let (mut client, mut events) = TransportClient::start(Arc::new(connector), &config());

    let mut opened = Vec::new();
    for _ in 0..4 {
        let server = accepted.recv().await.unwrap();
        opened.push(Instant::now());
        assert_eq!(events.recv().await, Some(TransportEvent::Connected));
        assert!(client.is_connected());
        drop(server);
        assert_eq!(events.recv().await, Some(TransportEvent::Disconnected));
    }
    for pair in opened.windows(2) {
        assert_eq!(pair[1] - pair[0], RECONNECT_DELAY);
    }

    client.disconnect().await;
    sleep(Duration::from_secs(10)).await;
    assert!(accepted.try_recv().is_err(), "reconnected after teardown");
    assert_eq!(events.recv().await, None);
    assert!(!client.is_connected());
}

#[tokio::test(start_paused = true)]
async fn failed_connects_are_retried_at_the_same_pace() {
    let (connector, accepted) = InMemoryConnector::new();
    drop(accepted);
    let cfg = config().with_reconnect_delay(Duration::from_millis(250));
    let (mut client, mut events) = TransportClient::start(Arc::new(connector), &cfg);

    let mut failures = Vec::new();
    for _ in 0..3 {
        match events.recv().await {
            Some(TransportEvent::Error(_)) => failures.push(Instant::now()),
            other => panic!("expected error event, got {:?}", other),
        }
    }
    assert_eq!(failures[1] - failures[0], Duration::from_millis(250));
    assert_eq!(failures[2] - failures[1], Duration::from_millis(250));
    client.disconnect().await;
}

#[tokio::test]
async fn teardown_detaches_events_before_closing() -> anyhow::Result<()> {
    let (connector, mut accepted) = InMemoryConnector::new();
    let (mut client, mut events) = TransportClient::start(Arc::new(connector), &config());
    let mut server = accepted.recv().await.unwrap();
    assert_eq!(events.recv().await, Some(TransportEvent::Connected));

    client.disconnect().await;

    // No Disconnected event reaches a torn-down subscriber.
    assert_eq!(events.recv().await, None);
    assert!(server.recv().await.is_err());
    Ok(())
}

#[tokio::test]
async fn frames_flow_both_ways_in_order() -> anyhow::Result<()> {
    let (connector, mut accepted) = InMemoryConnector::new();
    let (mut client, mut events) = TransportClient::start(Arc::new(connector), &config());

    // Nothing is open yet, so this is dropped rather than queued.
    client.send("too early".to_string());

    let mut server = accepted.recv().await.unwrap();
    assert_eq!(events.recv().await, Some(TransportEvent::Connected));

    client.send("hello".to_string());
    assert_eq!(server.recv().await?, "hello");

    server.send("one".to_string()).await?;
    server.send("two".to_string()).await?;
    assert_eq!(events.recv().await, Some(TransportEvent::Message("one".into())));
    assert_eq!(events.recv().await, Some(TransportEvent::Message("two".into())));

    client.disconnect().await;
    Ok(())
}
