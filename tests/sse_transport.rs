use futures_util::StreamExt;
use rs_donation_stream::{
    LiveStream, LiveStreamError, SubscribeOptions,
    client_state::{ConnectionState, RECONNECTING_MESSAGE},
    transport::{SseTransport, Transport},
    types::{Credentials, RawMessage},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use url::Url;

const SSE_HEAD: &str =
    "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n";

const UNAUTHORIZED: &str = "HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

/// Reads one request head and returns it lowercased.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&request).to_lowercase()
}

/// Answers every connection with `response`, reporting each request head.
async fn responder(response: String) -> (Url, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let request = read_request(&mut socket).await;
            let _ = tx.send(request);
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    let base = Url::parse(&format!("http://{addr}/api")).unwrap();
    (base, rx)
}

fn channel_url(base: &Url) -> Url {
    Credentials::new("ch_1", "token-1").channel_url(base).unwrap()
}

fn transport() -> SseTransport {
    SseTransport::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn named_frames_arrive_in_order() {
    let donation = serde_json::json!({
        "id": "don_1",
        "amount": 40.0,
        "donorName": "Ruth Miller",
        "isAnonymous": false,
        "fundName": "General Fund",
        "churchId": "ch_1",
        "churchName": "Grace Chapel",
        "timestamp": "2026-03-01T10:15:00Z",
        "frequency": "monthly"
    });
    let body = format!(
        "event: connected\ndata: stream ready\n\nevent: heartbeat\ndata: ping\n\nevent: donation\ndata: {donation}\n\n"
    );
    let (base, mut requests) = responder(format!("{SSE_HEAD}{body}")).await;

    let stream = timeout(Duration::from_secs(5), transport().connect(channel_url(&base)))
        .await
        .expect("connect timed out")
        .expect("connect failed");
    let frames: Vec<RawMessage> = timeout(Duration::from_secs(5), stream.collect::<Vec<_>>())
        .await
        .expect("stream did not end")
        .into_iter()
        .map(|frame| frame.expect("frame error"))
        .collect();

    let names: Vec<&str> = frames.iter().map(|frame| frame.event.as_str()).collect();
    assert_eq!(names, vec!["connected", "heartbeat", "donation"]);
    assert_eq!(frames[0].data, "stream ready");
    let payload: serde_json::Value = serde_json::from_str(&frames[2].data).unwrap();
    assert_eq!(payload, donation);

    let request = requests.recv().await.unwrap();
    assert!(
        request.starts_with("get /api/churches/ch_1/donations/live?token=token-1 http/1.1"),
        "{request}"
    );
    assert!(request.contains("accept: text/event-stream"), "{request}");
    assert!(request.contains("cache-control: no-cache"), "{request}");
}

#[tokio::test]
async fn non_success_status_is_a_connect_error() {
    let (base, _requests) = responder(UNAUTHORIZED.to_string()).await;

    let outcome = timeout(Duration::from_secs(5), transport().connect(channel_url(&base)))
        .await
        .expect("connect timed out");
    match outcome {
        Err(LiveStreamError::HttpError(e)) => {
            assert_eq!(e.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
        }
        Err(other) => panic!("expected an HTTP error, got {other:?}"),
        Ok(_) => panic!("expected the connect to fail"),
    }
}

#[tokio::test]
async fn truncated_body_surfaces_as_stream_error() {
    // one complete chunk, then the socket closes without the terminating chunk
    let frame = "event: heartbeat\ndata: ping\n\n";
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nTransfer-Encoding: chunked\r\n\r\n{:x}\r\n{frame}\r\n",
        frame.len()
    );
    let (base, _requests) = responder(response).await;

    let mut stream = timeout(Duration::from_secs(5), transport().connect(channel_url(&base)))
        .await
        .expect("connect timed out")
        .expect("connect failed");

    let first = timeout(Duration::from_secs(5), stream.next()).await.unwrap();
    assert_eq!(first.unwrap().unwrap(), RawMessage::new("heartbeat", "ping"));

    let next = timeout(Duration::from_secs(5), stream.next()).await.unwrap();
    assert!(
        matches!(next, Some(Err(LiveStreamError::StreamError(_)))),
        "{next:?}"
    );
}

#[tokio::test]
async fn unauthorized_response_moves_subscription_to_reconnecting() {
    let (base, mut requests) = responder(UNAUTHORIZED.to_string()).await;
    let live = LiveStream::new(base, Arc::new(transport()));

    let mut subscription = live.subscribe(
        Some(Credentials::new("ch_1", "token-1")),
        SubscribeOptions::default(),
    );
    let snapshot = timeout(
        Duration::from_secs(5),
        subscription.wait_for(|s| s.status == ConnectionState::Reconnecting),
    )
    .await
    .expect("never reconnecting")
    .expect("controller stopped");

    assert_eq!(snapshot.last_error.as_deref(), Some(RECONNECTING_MESSAGE));
    assert_eq!(snapshot.reconnect_attempts, 1);
    assert!(!subscription.is_connected());
    assert!(requests.recv().await.unwrap().contains("accept: text/event-stream"));

    subscription.unsubscribe().await;
}
