use std::time::{Duration, Instant};

use seabattle::{ConnectionError, InMemoryLink, Link};

#[tokio::test]
async fn frames_cross_in_order() -> anyhow::Result<()> {
    let (a, b) = InMemoryLink::pair();
    a.send_message("ATTACK 1 2").await?;
    a.send_message("HIT").await?;
    assert!(b.has_messages());
    assert_eq!(b.pop_message().as_deref(), Some("ATTACK 1 2"));
    assert_eq!(b.pop_message().as_deref(), Some("HIT"));
    assert_eq!(b.pop_message(), None);
    assert!(!a.has_messages());
    Ok(())
}

#[tokio::test]
async fn closing_wakes_the_other_side() {
    let (a, b) = InMemoryLink::pair();
    a.send_message("WIN").await.unwrap();
    drop(a);
    assert!(!b.is_connected());
    // Already delivered frames stay readable.
    assert_eq!(b.pop_message().as_deref(), Some("WIN"));
    let start = Instant::now();
    b.wait_for_message(Duration::from_secs(5)).await;
    assert!(start.elapsed() < Duration::from_secs(1));
    // Sends after close go nowhere.
    b.send_message("MISS").await.unwrap();
}

#[tokio::test]
async fn same_framing_rules_as_tcp() {
    let (a, _b) = InMemoryLink::pair();
    assert!(matches!(
        a.send_message("HIT\nHIT").await,
        Err(ConnectionError::InvalidFrame(_))
    ));
    assert!(matches!(
        a.send_message("").await,
        Err(ConnectionError::InvalidFrame(_))
    ));
}
