use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use super::*;
use crate::job::wire::Progress;

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

async fn read_request(sock: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = sock.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find(&buf, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok());
            match content_length {
                Some(len) if buf.len() >= end + 4 + len => break,
                Some(_) => {}
                None if head.contains("transfer-encoding: chunked") => {
                    if buf.ends_with(b"0\r\n\r\n") {
                        break;
                    }
                }
                None => break,
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Answers exactly one request with a canned JSON reply and hands back the raw request.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let request = read_request(&mut sock).await;
        let reply = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        sock.write_all(reply.as_bytes()).await.unwrap();
        let _ = sock.shutdown().await;
        request
    });
    (format!("http://{addr}"), task)
}

fn config_for(server_url: String) -> TacticalConfig {
    TacticalConfig {
        server_url,
        request_timeout_secs: 5,
        ..TacticalConfig::default()
    }
}

#[tokio::test]
async fn upload_posts_multipart_file_part() {
    let (url, server) = serve_once("200 OK", r#"{"result_id": "abc"}"#).await;
    let backend = HttpBackend::new(&config_for(url)).unwrap();

    let handle = backend
        .upload(&VideoUpload::new("clip.mp4", b"not really a video".to_vec()))
        .await
        .unwrap();
    assert_eq!(handle.result_id, "abc");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /tasks/upload "));
    assert!(request.contains("name=\"file\""));
    assert!(request.contains("filename=\"clip.mp4\""));
    assert!(request.contains("not really a video"));
}

#[tokio::test]
async fn rejected_upload_is_an_upload_error_with_server_message() {
    let (url, server) = serve_once(
        "400 Bad Request",
        r#"{"message": "No file part in the request"}"#,
    )
    .await;
    let backend = HttpBackend::new(&config_for(url)).unwrap();

    let err = backend
        .upload(&VideoUpload::new("clip.mp4", vec![0; 16]))
        .await
        .unwrap_err();
    server.await.unwrap();
    assert!(matches!(err, TacticalError::Upload(_)));
    assert!(err.is_user_visible());
    let msg = err.to_string();
    assert!(msg.contains("400"), "{msg}");
    assert!(msg.contains("No file part in the request"), "{msg}");
}

#[tokio::test]
async fn poll_fetches_result_by_id() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"ready": false, "successful": null, "value": {"current": 1, "total": 5}}"#,
    )
    .await;
    let backend = HttpBackend::new(&config_for(url)).unwrap();

    let body = backend
        .poll(&JobHandle {
            result_id: "abc".to_owned(),
        })
        .await
        .unwrap();
    assert!(!body.ready);
    assert_eq!(
        Progress::from_value(body.value.as_ref()),
        Progress::Counted {
            current: 1,
            total: 5
        }
    );

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /tasks/result/abc "));
}

#[tokio::test]
async fn malformed_poll_body_is_a_serde_error() {
    let (url, server) = serve_once("200 OK", r#"{"nope": true}"#).await;
    let backend = HttpBackend::new(&config_for(url)).unwrap();

    let err = backend
        .poll(&JobHandle {
            result_id: "abc".to_owned(),
        })
        .await
        .unwrap_err();
    server.await.unwrap();
    assert!(matches!(err, TacticalError::Serde(_)));
}

#[tokio::test]
async fn unreachable_server_fails_as_transport_or_upload() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let backend = HttpBackend::new(&config_for(format!("http://{addr}"))).unwrap();

    let job = JobHandle {
        result_id: "abc".to_owned(),
    };
    assert!(matches!(
        backend.poll(&job).await.unwrap_err(),
        TacticalError::Transport(_)
    ));
    assert!(matches!(
        backend
            .upload(&VideoUpload::new("clip.mp4", vec![1]))
            .await
            .unwrap_err(),
        TacticalError::Upload(_)
    ));
}

#[tokio::test]
async fn video_upload_reads_file_name_from_path() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("video_upload");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("clip.mp4");
    std::fs::write(&path, b"frames").unwrap();

    let upload = VideoUpload::from_path(&path).await.unwrap();
    assert_eq!(upload.file_name, "clip.mp4");
    assert_eq!(upload.bytes, b"frames");

    assert!(VideoUpload::from_path(dir.join("missing.mp4")).await.is_err());
}
