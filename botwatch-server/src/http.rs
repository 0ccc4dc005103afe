//! HTTP front end of the collector.
//!
//! | route | purpose |
//! |-------|---------|
//! | `POST /update` | a bot reports its counters |
//! | `GET /api/stats[?aggregate_by=m]` | dashboard poll |
//! | `GET /metrics` | Prometheus scrape |
//! | `GET /health`, `/healthz` | liveness |
//!
//! ## Example
//!
//! ```rust,no_run
//! use botwatch_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), botwatch_server::ServerError> {
//!     let config = ServerConfig::builder().listen_addr("127.0.0.1:8000").build();
//!     let server = Server::bind(config).await?;
//!     println!("listening on {}", server.local_addr());
//!     server.run().await
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use botwatch_types::BotReport;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::metrics::format_prometheus;
use crate::store::{unix_now, StatsStore};
use crate::{ServerConfig, ServerError};

/// Largest request body accepted on `/update`.
const MAX_BODY_BYTES: usize = 64 * 1024;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";
const PROMETHEUS: &str = "text/plain; version=0.0.4; charset=utf-8";

const INDEX: &str = "botwatch collector\n\n\
POST /update                    report bot stats\n\
GET  /api/stats[?aggregate_by=] stats, totals and history (ip_address, topic, group_id)\n\
GET  /metrics                   Prometheus exposition\n\
GET  /health                    liveness\n\n\
View it with: botwatch --url http://<this host>\n";

/// A bound collector, ready to serve.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    store: Arc<StatsStore>,
}

impl Server {
    /// Bind the listen address from the configuration.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let addr: SocketAddr = config
            .listen_addr
            .parse()
            .map_err(|_| ServerError::Address(config.listen_addr.clone()))?;
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let store = Arc::new(StatsStore::from_config(&config));

        Ok(Self {
            listener,
            local_addr,
            store,
        })
    }

    /// The address actually bound (useful when binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The store backing this server.
    pub fn store(&self) -> Arc<StatsStore> {
        self.store.clone()
    }

    /// Accept connections until the listener fails.
    pub async fn run(self) -> Result<(), ServerError> {
        info!(addr = %self.local_addr, "collector listening");

        loop {
            let (stream, remote) = self.listener.accept().await?;
            let io = TokioIo::new(stream);
            let store = self.store.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let store = store.clone();
                    async move { handle_request(req, remote, &store).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!(%remote, error = %e, "connection error");
                }
            });
        }
    }

    /// Run the server on a background task.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.run().await {
                warn!(error = %e, "collector stopped");
            }
        })
    }
}

async fn handle_request(
    req: Request<Incoming>,
    remote: SocketAddr,
    store: &StatsStore,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match (method, path.as_str()) {
        (Method::POST, "/update") => handle_update(req, remote, store).await,
        (Method::GET, "/api/stats") => {
            let aggregate_by = query_param(req.uri().query(), "aggregate_by");
            let snapshot = store.snapshot(aggregate_by.as_deref());
            json_response(StatusCode::OK, &snapshot)
        }
        (Method::GET, "/metrics") => {
            let (global, rows) = store.current(unix_now());
            respond(StatusCode::OK, PROMETHEUS, format_prometheus(&global, &rows))
        }
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            respond(StatusCode::OK, TEXT, "OK")
        }
        (Method::GET, "/") => respond(StatusCode::OK, TEXT, INDEX),
        (_, "/update" | "/api/stats" | "/metrics" | "/health" | "/healthz" | "/") => {
            respond(StatusCode::METHOD_NOT_ALLOWED, TEXT, "Method Not Allowed")
        }
        _ => respond(StatusCode::NOT_FOUND, TEXT, "Not Found"),
    };

    Ok(response)
}

async fn handle_update(
    req: Request<Incoming>,
    remote: SocketAddr,
    store: &StatsStore,
) -> Response<Full<Bytes>> {
    let uri = req.uri().clone();
    let body = match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(%uri, %remote, error = %e, "failed to read request body");
            return respond(StatusCode::BAD_REQUEST, TEXT, "Bad Request");
        }
    };

    match serde_json::from_slice::<BotReport>(&body) {
        Ok(report) => {
            debug!(bot_id = %report.bot_id, %remote, "stats update");
            store.update(report, Some(remote.ip().to_string()));
            json_response(StatusCode::OK, &serde_json::json!({ "status": "ok" }))
        }
        Err(e) => {
            warn!(
                %uri,
                body = %String::from_utf8_lossy(&body),
                error = %e,
                "validation error"
            );
            json_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                &serde_json::json!({ "detail": e.to_string() }),
            )
        }
    }
}

/// Extract and percent-decode a query parameter.
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| {
            let value = value.replace('+', " ");
            let decoded = urlencoding::decode(&value).map(|v| v.into_owned()).ok();
            decoded.unwrap_or(value)
        })
}

fn json_response<T: serde::Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => respond(status, JSON, body),
        Err(e) => {
            warn!(error = %e, "failed to serialize response");
            respond(StatusCode::INTERNAL_SERVER_ERROR, TEXT, "Internal Server Error")
        }
    }
}

fn respond(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
