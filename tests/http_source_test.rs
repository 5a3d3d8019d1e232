use headline_watch::{FeedSource, FetchConfig, FetchError, HttpFeedSource};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>NOS Nieuws Economie</title><link>https://nos.nl</link><description>x</description>
<item><title>Rente omlaag</title><link>https://nos.nl/artikel/9</link><guid>https://nos.nl/l/9</guid></item>
</channel></rss>"#;

fn direct() -> FetchConfig {
    FetchConfig {
        use_system_proxy: false,
        ..FetchConfig::default()
    }
}

/// Serves one canned HTTP response per connection.
async fn serve(status_line: &'static str, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "{}\r\nContent-Type: application/rss+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    addr
}

#[tokio::test]
async fn test_http_source_fetches_and_parses() {
    let addr = serve("HTTP/1.1 200 OK", RSS).await;
    let source = HttpFeedSource::new(direct()).unwrap();

    let document = source.fetch(&format!("http://{}/nosnieuwseconomie", addr)).await.unwrap();

    assert_eq!(document.title, "NOS Nieuws Economie");
    assert_eq!(document.items.len(), 1);
    assert_eq!(document.items[0].identifier, "https://nos.nl/l/9");
    assert_eq!(document.items[0].title, "Rente omlaag");
}

#[tokio::test]
async fn test_http_source_reports_bad_status() {
    let addr = serve("HTTP/1.1 404 Not Found", "").await;
    let source = HttpFeedSource::new(direct()).unwrap();

    let result = source.fetch(&format!("http://{}/missing", addr)).await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_http_source_rejects_invalid_address() {
    let source = HttpFeedSource::new(direct()).unwrap();
    let result = source.fetch("not a url").await;
    assert!(matches!(result, Err(FetchError::InvalidAddress(_))));
}

/// Streams `total` bytes with chunked encoding, so no Content-Length is sent.
async fn serve_chunked(total: usize) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;

            let head = "HTTP/1.1 200 OK\r\nContent-Type: application/rss+xml\r\nTransfer-Encoding: chunked\r\n\r\n";
            if socket.write_all(head.as_bytes()).await.is_err() {
                continue;
            }

            let chunk = vec![b'a'; 64 * 1024];
            let mut sent = 0;
            while sent < total {
                let mut frame = format!("{:x}\r\n", chunk.len()).into_bytes();
                frame.extend_from_slice(&chunk);
                frame.extend_from_slice(b"\r\n");
                if socket.write_all(&frame).await.is_err() {
                    break;
                }
                sent += chunk.len();
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
            let _ = socket.shutdown().await;
        }
    });

    addr
}

#[tokio::test]
async fn test_http_source_stops_oversized_chunked_body() {
    let addr = serve_chunked(3 * 1024 * 1024).await;
    let source = HttpFeedSource::new(FetchConfig {
        max_feed_size_mb: 1,
        ..direct()
    })
    .unwrap();

    let result = source.fetch(&format!("http://{}/huge", addr)).await;

    match result {
        Err(FetchError::TooLarge { size_bytes, .. }) => {
            assert!(size_bytes > 1024 * 1024);
            assert!(size_bytes < 3 * 1024 * 1024);
        }
        other => panic!("expected TooLarge, got {:?}", other.map(|d| d.items.len())),
    }
}
