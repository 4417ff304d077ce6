use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::config::{ENDPOINT_ENV, PRACTICUM_TOKEN_ENV, WatchConfig, parse_http_url};
use crate::error::{FetchFailure, Result, WatchError};
use crate::models::PollWindow;

pub const FROM_DATE_PARAM: &str = "from_date";

/// Source of raw status payloads. One call is one request; retrying is the
/// caller's business.
pub trait StatusSource {
    fn fetch(&self, window: PollWindow) -> std::result::Result<Value, FetchFailure>;
}

#[derive(Clone)]
pub struct HttpStatusSource {
    endpoint: Url,
    http: Client,
}

impl std::fmt::Debug for HttpStatusSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStatusSource")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpStatusSource {
    pub fn new(endpoint: &str, token: &str, timeout_ms: u64) -> Result<Self> {
        let endpoint = parse_http_url(endpoint, ENDPOINT_ENV)?;

        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("OAuth {token}")).map_err(|e| {
            WatchError::InvalidConfig(format!(
                "недопустимое значение {PRACTICUM_TOKEN_ENV}: {e}"
            ))
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;

        Ok(Self { endpoint, http })
    }

    pub fn from_config(config: &WatchConfig) -> Result<Self> {
        Self::new(
            &config.endpoint,
            &config.practicum_token,
            config.http_timeout_ms,
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub(crate) fn request_url(&self, window: PollWindow) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(FROM_DATE_PARAM, &window.as_secs().to_string());
        url
    }
}

impl StatusSource for HttpStatusSource {
    fn fetch(&self, window: PollWindow) -> std::result::Result<Value, FetchFailure> {
        let url = self.request_url(window);
        let resp = self
            .http
            .get(url.clone())
            .send()
            .map_err(|err| FetchFailure::transport(url.as_str(), &err.without_url()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchFailure {
                address: resp.url().to_string(),
                status: Some(status.as_u16()),
                reason: status
                    .canonical_reason()
                    .unwrap_or("неизвестная причина")
                    .to_string(),
            });
        }

        let address = resp.url().to_string();
        resp.json::<Value>().map_err(|err| FetchFailure {
            address,
            status: None,
            reason: format!("ответ не является JSON: {}", err.without_url()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    /// Serves exactly one canned HTTP response and hands back the request
    /// head it received.
    fn serve_once(status_line: &str, body: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).expect("read request");
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).expect("write response");
            String::from_utf8_lossy(&head).into_owned()
        });
        (format!("http://{addr}/api/statuses/"), handle)
    }

    #[test]
    fn request_url_carries_window_as_from_date() {
        let source =
            HttpStatusSource::new("https://example.test/api/", "token", 100).expect("source");
        for secs in [0, 1_000, u64::MAX] {
            let url = source.request_url(PollWindow::from_secs(secs));
            let pairs = url.query_pairs().collect::<Vec<_>>();
            assert_eq!(pairs.len(), 1);
            assert_eq!(pairs[0].0, FROM_DATE_PARAM);
            assert_eq!(pairs[0].1, secs.to_string());
            assert!(!pairs[0].1.starts_with('-'));
        }
    }

    #[test]
    fn fetch_returns_raw_json_and_sends_oauth_header() {
        let (endpoint, handle) =
            serve_once("200 OK", r#"{"homeworks":[],"current_date":1100}"#);
        let source = HttpStatusSource::new(&endpoint, "secret", 2_000).expect("source");

        let value = source
            .fetch(PollWindow::from_secs(1_000))
            .expect("fetch ok");
        assert_eq!(value["current_date"], 1100);

        let head = handle.join().expect("server thread");
        assert!(head.starts_with("GET /api/statuses/?from_date=1000 "));
        assert!(head.to_ascii_lowercase().contains("authorization: oauth secret"));
    }

    #[test]
    fn non_success_status_is_a_fetch_failure_with_details() {
        let (endpoint, handle) = serve_once("503 Service Unavailable", "{}");
        let source = HttpStatusSource::new(&endpoint, "secret", 2_000).expect("source");

        let failure = source
            .fetch(PollWindow::from_secs(7))
            .expect_err("503 is not success");
        handle.join().expect("server thread");
        assert_eq!(failure.status, Some(503));
        assert_eq!(failure.reason, "Service Unavailable");
        assert!(failure.address.ends_with("/api/statuses/?from_date=7"));
    }

    #[test]
    fn undecodable_body_is_a_fetch_failure() {
        let (endpoint, handle) = serve_once("200 OK", "<html>maintenance</html>");
        let source = HttpStatusSource::new(&endpoint, "secret", 2_000).expect("source");

        let failure = source
            .fetch(PollWindow::from_secs(7))
            .expect_err("html is not json");
        handle.join().expect("server thread");
        assert_eq!(failure.status, None);
        assert!(failure.reason.starts_with("ответ не является JSON"));
    }

    #[test]
    fn refused_connection_is_a_fetch_failure_value() {
        let source = HttpStatusSource::new("http://127.0.0.1:9/api/", "secret", 200)
            .expect("source");
        let first = source
            .fetch(PollWindow::from_secs(5))
            .expect_err("nothing listens on port 9");
        assert_eq!(first.status, None);
        assert!(first.address.contains("from_date=5"));

        let second = source
            .fetch(PollWindow::from_secs(5))
            .expect_err("still nothing on port 9");
        assert_eq!(first.to_string(), second.to_string());
    }
}
