use std::{net::SocketAddr, num::NonZeroU32, sync::Arc};

use aqi_ingestor::{
    models::{location::GeoPoint, request_params::HistoryRequestParams},
    providers::{
        AirQualityProvider, ProviderError,
        openweather::{OpenWeatherConfig, OpenWeatherProvider},
    },
};
use chrono::DateTime;
use secrecy::SecretString;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

/// 2025-07-01T00:00:00Z
const T0: i64 = 1_751_328_000;
const HOUR: i64 = 3600;

/// Serves one response per connection; `respond` maps the request target to
/// a status code and a JSON body.
async fn spawn_server<F>(respond: F) -> SocketAddr
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let respond = Arc::clone(&respond);
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&head);
                let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body) = respond(&target);
                let reply = format!(
                    "HTTP/1.1 {status} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

fn query_param(target: &str, key: &str) -> Option<i64> {
    let (_, query) = target.split_once('?')?;
    query
        .split('&')
        .find_map(|kv| kv.strip_prefix(key)?.strip_prefix('=')?.parse().ok())
}

fn body(timestamps: &[i64]) -> String {
    let entries: Vec<String> = timestamps
        .iter()
        .map(|ts| format!(r#"{{"dt": {ts}, "main": {{"aqi": 2}}, "components": {{"pm2_5": 7.5}}}}"#))
        .collect();
    format!(r#"{{"list": [{}]}}"#, entries.join(","))
}

fn provider_for(addr: SocketAddr) -> OpenWeatherProvider {
    let mut config = OpenWeatherConfig::new(SecretString::from("test-key".to_string()));
    config.base_url = format!("http://{addr}/air_pollution");
    config.requests_per_second = NonZeroU32::new(100).unwrap();
    OpenWeatherProvider::new(config).expect("Failed to create OpenWeatherProvider")
}

fn three_hours() -> HistoryRequestParams {
    HistoryRequestParams {
        location: GeoPoint::default(),
        start: DateTime::from_timestamp(T0, 0).unwrap(),
        end: DateTime::from_timestamp(T0 + 3 * HOUR, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_history_skips_failed_window() {
    let addr = spawn_server(|target| {
        if !target.starts_with("/air_pollution/history?") {
            return (404, "{}".to_string());
        }
        match query_param(target, "start") {
            Some(T0) => (200, body(&[T0])),
            Some(s) if s == T0 + HOUR => (500, r#"{"message": "upstream down"}"#.to_string()),
            // Out of order and repeating the first window's reading.
            Some(s) if s == T0 + 2 * HOUR => (200, body(&[T0 + 2 * HOUR, T0])),
            _ => (400, "{}".to_string()),
        }
    })
    .await;

    let readings = provider_for(addr)
        .fetch_history(three_hours())
        .await
        .expect("a failed window must not fail the range");

    let timestamps: Vec<i64> = readings.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![T0, T0 + 2 * HOUR]);
    assert!(readings.iter().all(|r| r.components.contains_key("pm2_5")));
}

#[tokio::test]
async fn test_history_malformed_window_fails_the_range() {
    let addr = spawn_server(|target| match query_param(target, "start") {
        Some(s) if s == T0 + HOUR => (200, r#"{"list": [{"dt": 1, "main": {}}]}"#.to_string()),
        Some(s) => (200, body(&[s])),
        None => (400, "{}".to_string()),
    })
    .await;

    let err = provider_for(addr)
        .fetch_history(three_hours())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ProviderError::MalformedReading { index: 0, .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn test_current_reports_api_error_status() {
    let addr = spawn_server(|_| (401, r#"{"cod": 401, "message": "Invalid API key"}"#.to_string())).await;

    let err = provider_for(addr)
        .fetch_current(GeoPoint::default())
        .await
        .unwrap_err();
    match err {
        ProviderError::Api { status, message, .. } => {
            assert_eq!(status, 401);
            assert!(message.contains("Invalid API key"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_current_sends_coordinates_and_key() {
    let addr = spawn_server(|target| {
        let ok = target.starts_with("/air_pollution?")
            && target.contains("lat=30.746")
            && target.contains("lon=73.331")
            && target.contains("appid=test-key");
        if ok {
            (200, body(&[T0]))
        } else {
            (400, "{}".to_string())
        }
    })
    .await;

    let readings = provider_for(addr)
        .fetch_current(GeoPoint::default())
        .await
        .expect("fetch_current returned an error");
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].timestamp, T0);
    assert_eq!(readings[0].aqi, 2);
}
