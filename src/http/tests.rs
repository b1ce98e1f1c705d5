use super::*;
use crate::config::SigninConfig;
use crate::error::{AppError, AuthError};
use reqwest::Method;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

/// Serves `response` to every connection and forwards each raw request.
async fn spawn_canned_server(
    response: String,
    delay: Duration,
) -> Result<(String, mpsc::UnboundedReceiver<String>), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("addr failed: {}", err))?;
    let (requests_tx, requests_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let response = response.clone();
            let requests_tx = requests_tx.clone();
            tokio::spawn(async move {
                let raw = read_request(&mut stream).await;
                drop(requests_tx.send(raw));
                tokio::time::sleep(delay).await;
                drop(stream.write_all(response.as_bytes()).await);
                drop(stream.shutdown().await);
            });
        }
    });

    Ok((format!("http://{}", addr), requests_rx))
}

/// Reads request head plus `Content-Length` bytes of body.
async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let text = String::from_utf8_lossy(&raw).into_owned();
        if let Some((head, body)) = text.split_once("\r\n\r\n") {
            let expected = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if body.len() >= expected {
                return text;
            }
        }
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return String::from_utf8_lossy(&raw).into_owned(),
            Ok(read) => raw.extend_from_slice(chunk.get(..read).unwrap_or_default()),
        }
    }
}

fn signin() -> SigninConfig {
    SigninConfig {
        email: "load@example.com".to_owned(),
        password: "hunter2".to_owned(),
        install_id: "install-1".to_owned(),
    }
}

#[test]
fn parse_session_builds_credential() -> Result<(), String> {
    let credential = parse_session(br#"{"session":{"_owner":"u1","key":"k9","ttl":5}}"#)
        .map_err(|err| err.to_string())?;
    if credential != "user=u1&session=k9" {
        return Err(format!("Unexpected credential {}", credential));
    }
    Ok(())
}

#[test]
fn parse_session_rejects_bad_payloads() -> Result<(), String> {
    match parse_session(b"<html>") {
        Err(AuthError::MalformedSession { .. }) => {}
        other => return Err(format!("Unexpected result {:?}", other)),
    }
    match parse_session(br#"{"user":"x"}"#) {
        Err(AuthError::MissingSessionField { field: "session" }) => {}
        other => return Err(format!("Unexpected result {:?}", other)),
    }
    match parse_session(br#"{"session":{"_owner":"u1"}}"#) {
        Err(AuthError::MissingSessionField { field: "key" }) => {}
        other => return Err(format!("Unexpected result {:?}", other)),
    }
    Ok(())
}

#[test]
fn signin_config_debug_redacts_password() -> Result<(), String> {
    let rendered = format!("{:?}", signin());
    if rendered.contains("hunter2") {
        return Err(format!("Password leaked: {}", rendered));
    }
    Ok(())
}

#[test]
fn authenticate_posts_credentials() -> Result<(), String> {
    run_async_test(async {
        let body = r#"{"session":{"_owner":"owner-7","key":"abc"}}"#;
        let (host, mut requests_rx) =
            spawn_canned_server(http_response("200 OK", body), Duration::ZERO).await?;
        let client = build_client().map_err(|err| err.to_string())?;

        let credential = authenticate(&client, &host, &signin())
            .await
            .map_err(|err| err.to_string())?;
        if credential != "user=owner-7&session=abc" {
            return Err(format!("Unexpected credential {}", credential));
        }

        let raw = requests_rx.recv().await.ok_or("No request captured")?;
        if !raw.starts_with(&format!("POST {} ", SIGNIN_PATH)) {
            return Err(format!("Unexpected request line: {}", raw));
        }
        if !raw.contains("\"installId\":\"install-1\"") {
            return Err(format!("Missing installId in body: {}", raw));
        }
        if !raw.to_ascii_lowercase().contains("content-type: application/json") {
            return Err(format!("Missing content type: {}", raw));
        }
        Ok(())
    })
}

#[test]
fn authenticate_rejects_non_200() -> Result<(), String> {
    run_async_test(async {
        let (host, _requests_rx) =
            spawn_canned_server(http_response("401 Unauthorized", "{}"), Duration::ZERO).await?;
        let client = build_client().map_err(|err| err.to_string())?;
        match authenticate(&client, &host, &signin()).await {
            Err(AppError::Auth(AuthError::Rejected { status: 401 })) => Ok(()),
            other => Err(format!("Unexpected result {:?}", other)),
        }
    })
}

#[test]
fn probe_host_accepts_any_status_but_not_dead_hosts() -> Result<(), String> {
    run_async_test(async {
        let (host, _requests_rx) = spawn_canned_server(
            http_response("503 Service Unavailable", "{\"up\":false}"),
            Duration::ZERO,
        )
        .await?;
        let client = build_client().map_err(|err| err.to_string())?;
        probe_host(&client, &host)
            .await
            .map_err(|err| err.to_string())?;

        let listener = std::net::TcpListener::bind("127.0.0.1:0")
            .map_err(|err| format!("bind failed: {}", err))?;
        let dead = format!(
            "http://{}",
            listener
                .local_addr()
                .map_err(|err| format!("addr failed: {}", err))?
        );
        drop(listener);
        if probe_host(&client, &dead).await.is_ok() {
            return Err("Expected probe of closed port to fail".to_owned());
        }
        Ok(())
    })
}

#[test]
fn reqwest_transport_sends_json_and_reads_body() -> Result<(), String> {
    run_async_test(async {
        let body = r#"{"tag":"things","time":4}"#;
        let (host, mut requests_rx) =
            spawn_canned_server(http_response("201 Created", body), Duration::ZERO).await?;
        let client = build_client().map_err(|err| err.to_string())?;
        let transport = ReqwestTransport::new(client, None);

        let response = transport
            .send(OutboundRequest {
                method: Method::PUT,
                url: format!("{}/v1/things?user=u", host),
                body: b"{\"n\":1}".to_vec(),
            })
            .await
            .map_err(|err| err.to_string())?;
        if response.status != 201 || response.body != body.as_bytes() {
            return Err(format!("Unexpected response {:?}", response));
        }

        let raw = requests_rx.recv().await.ok_or("No request captured")?;
        if !raw.starts_with("PUT /v1/things?user=u ") {
            return Err(format!("Unexpected request line: {}", raw));
        }
        if !raw.ends_with("{\"n\":1}") {
            return Err(format!("Body not forwarded: {}", raw));
        }
        Ok(())
    })
}

#[test]
fn reqwest_transport_classifies_timeouts() -> Result<(), String> {
    run_async_test(async {
        let (host, _requests_rx) = spawn_canned_server(
            http_response("200 OK", "{}"),
            Duration::from_millis(500),
        )
        .await?;
        let client = build_client().map_err(|err| err.to_string())?;
        let transport = ReqwestTransport::new(client, Some(Duration::from_millis(50)));

        match transport
            .send(OutboundRequest {
                method: Method::GET,
                url: host,
                body: Vec::new(),
            })
            .await
        {
            Err(TransportError {
                kind: TransportErrorKind::Timeout,
                ..
            }) => Ok(()),
            other => Err(format!("Unexpected result {:?}", other)),
        }
    })
}
