//! A local stand-in for the Twitch OAuth and Helix endpoints.
//!
//! Binds to a random localhost port, answers every request through a caller-supplied
//! closure, and records what it was sent.

use crate::config::{Config, Credentials};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper::{Request, Response, body};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: HashMap<String, String>,
    pub(crate) headers: HeaderMap,
    /// The body, decoded as `application/x-www-form-urlencoded`.
    pub(crate) form: HashMap<String, String>,
}

type Responder = dyn Fn(&RecordedRequest) -> (StatusCode, String) + Send + Sync;

pub(crate) struct MockTwitch {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    server: tokio::task::JoinHandle<()>,
}

fn parse_pairs(input: &[u8]) -> HashMap<String, String> {
    form_urlencoded::parse(input).into_owned().collect()
}

impl MockTwitch {
    pub(crate) async fn start<F>(respond: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let socket = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind to localhost");
        let addr = socket.local_addr().expect("get local address");
        let respond: Arc<Responder> = Arc::new(respond);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let server = tokio::spawn({
            let requests = Arc::clone(&requests);
            async move {
                while let Ok((conn, _)) = socket.accept().await {
                    let conn = hyper_util::rt::TokioIo::new(conn);
                    let respond = Arc::clone(&respond);
                    let requests = Arc::clone(&requests);
                    let service = service_fn(move |req: Request<body::Incoming>| {
                        let respond = Arc::clone(&respond);
                        let requests = Arc::clone(&requests);
                        async move {
                            let (parts, body) = req.into_parts();
                            let body = body.collect().await?.to_bytes();
                            let recorded = RecordedRequest {
                                method: parts.method,
                                path: parts.uri.path().to_string(),
                                query: parse_pairs(parts.uri.query().unwrap_or("").as_bytes()),
                                headers: parts.headers,
                                form: parse_pairs(&body),
                            };
                            let (status, body) = respond(&recorded);
                            requests
                                .lock()
                                .expect("no test panics while holding the lock")
                                .push(recorded);

                            let mut response = Response::new(Full::<Bytes>::from(body));
                            *response.status_mut() = status;
                            response.headers_mut().insert(
                                http::header::CONTENT_TYPE,
                                HeaderValue::from_static("application/json"),
                            );
                            Ok::<_, hyper::Error>(response)
                        }
                    });
                    tokio::spawn(async move {
                        let _ = hyper::server::conn::http1::Builder::new()
                            .serve_connection(conn, service)
                            .await;
                    });
                }
            }
        });

        Self {
            addr,
            requests,
            server,
        }
    }

    /// A config pointing every endpoint at this server, with fixture credentials.
    pub(crate) fn config(&self) -> Config {
        let mut config = Config::new(Credentials::new("test-client-id", "test-client-secret"));
        config.token_url = format!("http://{}/oauth2/token", self.addr);
        config.validate_url = format!("http://{}/oauth2/validate", self.addr);
        config.api_url = format!("http://{}/helix", self.addr);
        config
    }

    /// An HTTP client that talks to localhost directly even if a proxy is configured.
    pub(crate) fn http_client() -> reqwest::Client {
        reqwest::ClientBuilder::new()
            .no_proxy()
            .build()
            .expect("building reqwest client should not fail")
    }

    /// Every request received so far, in arrival order.
    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .expect("no test panics while holding the lock")
            .clone()
    }
}

impl Drop for MockTwitch {
    fn drop(&mut self) {
        self.server.abort();
    }
}
