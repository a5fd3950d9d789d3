use std::collections::HashSet;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use war_engine::deck::Deck;
use war_engine::protocol::{decode_game_start, GAMESTART_LEN};
use war_server::{run_clients, GameServer, ServerConfig, ServerStats, StatsSnapshot};

/// Polls the counters until `done` holds, or gives up after five seconds.
async fn wait_for(stats: &ServerStats, done: impl Fn(&StatsSnapshot) -> bool) -> StatsSnapshot {
    for _ in 0..500 {
        let snap = stats.snapshot();
        if done(&snap) {
            return snap;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    stats.snapshot()
}

async fn assert_closed(stream: &mut TcpStream) {
    let mut rest = Vec::new();
    match stream.read_to_end(&mut rest).await {
        Ok(_) => assert!(rest.is_empty(), "unexpected bytes: {rest:?}"),
        Err(err) => assert_eq!(err.kind(), io::ErrorKind::ConnectionReset),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn load_run_completes_every_game() {
    let handle = GameServer::new(ServerConfig::for_tests().with_seed(Some(5)))
        .start()
        .await
        .expect("start server");
    let addr = handle.address().to_string();

    let report = run_clients(&addr, 40, 8).await;
    assert_eq!(report.requested, 40);
    assert_eq!(report.completed, 40);
    assert_eq!(report.failed, 0);
    assert_eq!(report.won + report.drew + report.lost, 40);
    // every game has a mirror-image opponent
    assert_eq!(report.won, report.lost);

    let snap = wait_for(handle.stats(), |s| s.sessions_completed == 20).await;
    assert_eq!(snap.connections_accepted, 40);
    assert_eq!(snap.sessions_started, 20);
    assert_eq!(snap.sessions_completed, 20);
    assert_eq!(snap.sessions_aborted, 0);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn seeded_server_deals_reproducibly() {
    let handle = GameServer::new(ServerConfig::for_tests().with_seed(Some(99)))
        .start()
        .await
        .expect("start server");
    let addr = handle.address();

    let mut first = TcpStream::connect(addr).await.expect("connect");
    let mut second = TcpStream::connect(addr).await.expect("connect");
    first.write_all(&[0x00, 0x00]).await.unwrap();
    second.write_all(&[0x00, 0x00]).await.unwrap();

    let mut dealt = HashSet::new();
    for stream in [&mut first, &mut second] {
        let mut frame = [0u8; GAMESTART_LEN];
        stream.read_exact(&mut frame).await.expect("GAMESTART");
        let hand = decode_game_start(&frame).expect("valid deal");
        dealt.insert(hand.iter().map(|c| c.value()).collect::<Vec<_>>());
    }

    // the first session is dealt from the base seed itself
    let (a, b) = Deck::new_with_seed(99).deal();
    let expected: HashSet<Vec<u8>> = [a, b]
        .iter()
        .map(|h| h.iter().map(|c| c.value()).collect())
        .collect();
    assert_eq!(dealt, expected);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn violation_closes_both_peers() {
    let handle = GameServer::new(ServerConfig::for_tests())
        .start()
        .await
        .expect("start server");
    let addr = handle.address();

    let mut cheater = TcpStream::connect(addr).await.expect("connect");
    let mut honest = TcpStream::connect(addr).await.expect("connect");
    cheater.write_all(&[0x00, 0x05]).await.unwrap();
    honest.write_all(&[0x00, 0x00]).await.unwrap();

    assert_closed(&mut cheater).await;
    assert_closed(&mut honest).await;

    let snap = wait_for(handle.stats(), |s| s.sessions_aborted == 1).await;
    assert_eq!(snap.sessions_started, 1);
    assert_eq!(snap.sessions_aborted, 1);
    assert_eq!(snap.sessions_completed, 0);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn lone_client_waits_for_partner() {
    let handle = GameServer::new(ServerConfig::for_tests())
        .start()
        .await
        .expect("start server");
    let addr = handle.address();

    let mut lonely = TcpStream::connect(addr).await.expect("connect");
    lonely.write_all(&[0x00, 0x00]).await.unwrap();

    let mut frame = [0u8; GAMESTART_LEN];
    let waited =
        tokio::time::timeout(Duration::from_millis(200), lonely.read_exact(&mut frame)).await;
    assert!(waited.is_err(), "no deal without a partner");

    let snap = wait_for(handle.stats(), |s| s.connections_accepted == 1).await;
    assert_eq!(snap.sessions_started, 0);

    handle.shutdown().await.expect("shutdown");
    assert_closed(&mut lonely).await;
}
