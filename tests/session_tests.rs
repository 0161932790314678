use std::time::Duration;

use seabattle::{
    ConnectionError, ConnectionState, Link, NetConfig, Role, Session, SessionError, SessionState,
};

fn config() -> NetConfig {
    NetConfig::default().with_poll_interval(Duration::from_millis(20))
}

#[tokio::test(flavor = "multi_thread")]
async fn host_and_join() -> anyhow::Result<()> {
    let mut host = Session::new(config());
    assert_eq!(host.state(), SessionState::Idle);
    assert_eq!(host.role(), None);

    host.host_game(0).await?;
    assert_eq!(host.state(), SessionState::Hosting);
    assert_eq!(host.connection_state(), ConnectionState::Listening);
    assert_eq!(host.role(), Some(Role::Host));
    let port = host.local_info().expect("listening").port();

    let mut join = Session::new(config());
    join.join_game("127.0.0.1", port).await?;
    assert_eq!(join.state(), SessionState::Connected);
    assert_eq!(join.role(), Some(Role::Join));

    tokio::time::timeout(Duration::from_secs(5), host.wait_until_connected()).await??;
    assert_eq!(host.peer_info(), join.local_info());
    assert!(Link::is_connected(&host));

    join.send_message("ATTACK 4 4").await?;
    tokio::time::timeout(Duration::from_secs(5), async {
        while !host.has_messages() {
            host.wait_for_message(Duration::from_millis(20)).await;
        }
    })
    .await?;
    assert_eq!(host.pop_message().as_deref(), Some("ATTACK 4 4"));

    host.disconnect().await;
    join.disconnect().await;
    assert_eq!(host.state(), SessionState::Idle);
    assert_eq!(host.role(), None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn busy_session_refuses_a_second_game() -> anyhow::Result<()> {
    let mut host = Session::new(config());
    host.host_game(0).await?;
    assert!(matches!(
        host.host_game(0).await,
        Err(SessionError::Busy(SessionState::Hosting))
    ));
    assert!(matches!(
        host.join_game("127.0.0.1", 1).await,
        Err(SessionError::Busy(SessionState::Hosting))
    ));
    host.disconnect().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_join_leaves_error_until_reset() -> anyhow::Result<()> {
    let port = {
        let probe = std::net::TcpListener::bind("127.0.0.1:0")?;
        probe.local_addr()?.port()
    };
    let mut join = Session::new(config());
    assert!(matches!(
        join.join_game("127.0.0.1", port).await,
        Err(SessionError::Connection(ConnectionError::Connect { .. }))
    ));
    assert_eq!(join.state(), SessionState::Error);
    assert_eq!(join.role(), None);
    assert!(matches!(
        join.wait_until_connected().await,
        Err(SessionError::Failed)
    ));
    assert!(matches!(
        join.host_game(0).await,
        Err(SessionError::Busy(SessionState::Error))
    ));

    join.disconnect().await;
    assert_eq!(join.state(), SessionState::Idle);
    join.host_game(0).await?;
    assert_eq!(join.state(), SessionState::Hosting);
    join.disconnect().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn waiting_on_a_closed_session_fails() {
    let host = Session::new(config());
    assert!(matches!(
        host.wait_until_connected().await,
        Err(SessionError::Closed)
    ));
}
