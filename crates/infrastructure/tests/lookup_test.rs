use ferrous_dig_domain::{DnsError, RData, RecordClass, RecordType, ServerAddr};
use ferrous_dig_infrastructure::dns::{ClientConfig, LookupClient};
use std::time::{Duration, Instant};

mod helpers;
use helpers::{MockTcpServer, MockUdpServer, UdpMode};

fn test_config(addr: std::net::SocketAddr) -> ClientConfig {
    let mut config = ClientConfig::new(ServerAddr::new(addr));
    config.timeout = Duration::from_millis(200);
    config.retries = 1;
    config
}

#[tokio::test]
async fn lookup_resolves_over_udp() {
    let (server, addr) = MockUdpServer::start(UdpMode::Answer).await.unwrap();
    let client = LookupClient::new(test_config(addr));

    let result = client
        .lookup("example.com", RecordType::A, RecordClass::IN)
        .await
        .unwrap();

    assert_eq!(result.protocol, "UDP");
    assert_eq!(result.answers().len(), 1);
    assert_eq!(
        result.answers()[0].rdata,
        RData::A("93.184.216.34".parse().unwrap())
    );
    assert_eq!(result.questions()[0].name, "example.com");
    assert_eq!(server.queries_seen(), 1);
    assert!(result.audit.is_none(), "audit is off by default");
}

#[tokio::test]
async fn truncated_udp_response_retries_exactly_once_over_tcp() {
    // UDP and TCP mocks share one port so the client sees a single server.
    let (tcp_server, addr) = MockTcpServer::start().await.unwrap();
    let (udp_server, _) = MockUdpServer::start_at(addr, UdpMode::Truncated)
        .await
        .unwrap();

    let mut config = test_config(addr);
    config.audit_trail = true;
    let client = LookupClient::new(config);

    let result = client
        .lookup("example.com", RecordType::A, RecordClass::IN)
        .await
        .unwrap();

    assert_eq!(result.protocol, "TCP", "final answer must come over TCP");
    assert_eq!(result.answers().len(), 1);
    assert_eq!(udp_server.queries_seen(), 1, "one UDP attempt");
    assert_eq!(tcp_server.queries_seen(), 1, "exactly one TCP retry");

    let audit = result.audit.expect("audit trail was requested");
    assert_eq!(audit.steps().len(), 2, "one UDP step and one TCP step");
    assert_eq!(audit.steps()[0].protocol, "UDP");
    assert_eq!(audit.steps()[1].protocol, "TCP");
}

#[tokio::test]
async fn tcp_only_never_touches_udp() {
    let (tcp_server, addr) = MockTcpServer::start().await.unwrap();
    let (udp_server, _) = MockUdpServer::start_at(addr, UdpMode::Answer)
        .await
        .unwrap();

    let mut config = test_config(addr);
    config.tcp_only = true;
    let client = LookupClient::new(config);

    let result = client
        .lookup("example.com", RecordType::A, RecordClass::IN)
        .await
        .unwrap();

    assert_eq!(result.protocol, "TCP");
    assert_eq!(udp_server.queries_seen(), 0);
    assert_eq!(tcp_server.queries_seen(), 1);
}

#[tokio::test]
async fn axfr_forces_tcp() {
    let (tcp_server, addr) = MockTcpServer::start().await.unwrap();
    let (udp_server, _) = MockUdpServer::start_at(addr, UdpMode::Answer)
        .await
        .unwrap();

    let client = LookupClient::new(test_config(addr));
    let result = client
        .lookup("example.com", RecordType::AXFR, RecordClass::IN)
        .await
        .unwrap();

    assert_eq!(result.protocol, "TCP");
    assert_eq!(udp_server.queries_seen(), 0);
    assert_eq!(tcp_server.queries_seen(), 1);
}

#[tokio::test]
async fn exhausted_timeouts_surface_resolution_failed() {
    let (server, addr) = MockUdpServer::start(UdpMode::Silent).await.unwrap();

    let mut config = test_config(addr);
    config.timeout = Duration::from_millis(100);
    config.retries = 1;
    let client = LookupClient::new(config);

    let started = Instant::now();
    let err = client
        .lookup("example.com", RecordType::A, RecordClass::IN)
        .await
        .unwrap_err();

    match err {
        DnsError::ResolutionFailed {
            attempts, protocol, ..
        } => {
            assert_eq!(attempts, 2, "initial attempt plus one retry");
            assert_eq!(protocol, "UDP");
        }
        other => panic!("expected ResolutionFailed, got {:?}", other),
    }
    assert_eq!(server.queries_seen(), 2);
    // Two attempts at 100ms each; well under a second proves no hang.
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn invalid_name_fails_before_any_network_traffic() {
    let (server, addr) = MockUdpServer::start(UdpMode::Answer).await.unwrap();
    let client = LookupClient::new(test_config(addr));

    let err = client
        .lookup("bad..name", RecordType::A, RecordClass::IN)
        .await
        .unwrap_err();

    assert!(matches!(err, DnsError::InvalidName(_)));
    assert_eq!(server.queries_seen(), 0);
}

#[tokio::test]
async fn audit_trail_records_timed_out_attempts() {
    let (_server, addr) = MockUdpServer::start(UdpMode::Silent).await.unwrap();

    let mut config = test_config(addr);
    config.timeout = Duration::from_millis(50);
    config.retries = 2;
    config.audit_trail = true;
    let client = LookupClient::new(config);

    let err = client
        .lookup("example.com", RecordType::A, RecordClass::IN)
        .await
        .unwrap_err();
    assert!(matches!(err, DnsError::ResolutionFailed { .. }));
    // The trail stays with the engine on failure; what matters is that the
    // terminal error is the only thing the caller sees.
}

#[tokio::test]
async fn concurrent_lookups_share_one_client() {
    let (server, addr) = MockUdpServer::start(UdpMode::Answer).await.unwrap();
    let client = std::sync::Arc::new(LookupClient::new(test_config(addr)));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .lookup("example.com", RecordType::A, RecordClass::IN)
                .await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.answers().len(), 1);
    }
    assert_eq!(server.queries_seen(), 4);
}
