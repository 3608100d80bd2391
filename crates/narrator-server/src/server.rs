use crate::config::ServerConfig;
use crate::http::{self, HttpError, Limits};
use crate::proxy::{self, ProxyContext, ProxyRequest, ProxyResponse};
use anyhow::{Context, Result};
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

static RID: AtomicU64 = AtomicU64::new(1);

fn next_rid() -> String {
    let n = RID.fetch_add(1, Ordering::Relaxed);
    format!("r-{n:06}")
}

pub struct Server;

impl Server {
    /// Binds `cfg.bind` and serves until Ctrl-C.
    pub async fn run(cfg: ServerConfig, ctx: ProxyContext) -> Result<()> {
        let listener = TcpListener::bind(&cfg.bind)
            .await
            .with_context(|| format!("failed to bind {}", cfg.bind))?;

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(event = "signal_error", error = %e);
            }
        };
        Self::serve(listener, cfg, ctx, shutdown).await
    }

    /// Accept loop on an already bound listener; returns once `shutdown` resolves.
    pub async fn serve<F>(listener: TcpListener, cfg: ServerConfig, ctx: ProxyContext, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = listener.local_addr()?;
        tracing::info!(event = "listening", addr = %addr, configured = ctx.synth.is_some());

        let cfg = Arc::new(cfg);
        let ctx = Arc::new(ctx);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(event = "server_stop");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(a) => a,
                        Err(e) => {
                            tracing::warn!(event = "accept_error", error = %e);
                            continue;
                        }
                    };
                    let cfg = cfg.clone();
                    let ctx = ctx.clone();
                    tokio::spawn(async move {
                        let rid = next_rid();
                        if let Err(e) = serve_conn(stream, peer, &rid, &cfg, &ctx).await {
                            tracing::warn!(event = "connection_error", rid = %rid, error = %e);
                        }
                    });
                }
            }
        }
    }
}

async fn serve_conn(
    stream: TcpStream,
    peer: SocketAddr,
    rid: &str,
    cfg: &ServerConfig,
    ctx: &ProxyContext,
) -> Result<()> {
    let (rd, mut wr) = stream.into_split();
    let mut reader = BufReader::new(rd);
    let limits = Limits {
        max_header_bytes: cfg.max_header_bytes,
        max_body_bytes: cfg.max_body_bytes,
    };

    let budget = Duration::from_millis(cfg.timeout_ms);
    let read = match timeout(budget, http::read_request(&mut reader, limits)).await {
        Ok(read) => read,
        Err(_) => {
            tracing::warn!(event = "read_timeout", rid = %rid, peer = %peer, timeout_ms = cfg.timeout_ms);
            let resp = ProxyResponse {
                status: 408,
                body: Some(json!({ "error": "Request not received in time" })),
            };
            http::write_response(&mut wr, &resp).await?;
            return Ok(());
        }
    };

    let req = match read {
        Ok(Some(r)) => r,
        Ok(None) => return Ok(()),
        Err(HttpError::Closed) => {
            tracing::debug!(event = "peer_closed", rid = %rid, peer = %peer);
            return Ok(());
        }
        Err(e) => {
            tracing::warn!(event = "bad_request", rid = %rid, peer = %peer, error = %e);
            let resp = ProxyResponse {
                status: e.status(),
                body: Some(json!({ "error": e.to_string() })),
            };
            http::write_response(&mut wr, &resp).await?;
            return Ok(());
        }
    };

    let start = std::time::Instant::now();
    let preq = ProxyRequest {
        method: req.method,
        target: req.target,
        body: req.body,
    };

    tracing::info!(
        event = "request_start",
        rid = %rid,
        peer = %peer,
        method = %preq.method,
        target = %preq.target,
        bytes_in = preq.body.len()
    );

    // Runs in its own task so a panic inside the handler becomes a 500, not a dropped socket.
    let task_ctx = ctx.clone();
    let task_req = preq.clone();
    let mut task = tokio::spawn(async move { proxy::handle(&task_ctx, &task_req).await });

    let resp = match timeout(budget, &mut task).await {
        Ok(Ok(resp)) => resp,
        Ok(Err(join_err)) => {
            tracing::error!(event = "handler_crash", rid = %rid, error = %join_err);
            ProxyResponse {
                status: 500,
                body: Some(json!({
                    "error": "Internal server error",
                    "message": join_err.to_string(),
                })),
            }
        }
        Err(_) => {
            task.abort();
            tracing::warn!(event = "request_timeout", rid = %rid, timeout_ms = cfg.timeout_ms);
            ProxyResponse {
                status: 504,
                body: Some(json!({
                    "error": format!("Request exceeded {}ms", cfg.timeout_ms),
                })),
            }
        }
    };

    tracing::info!(
        event = "request_done",
        rid = %rid,
        status = resp.status,
        duration_ms = start.elapsed().as_millis() as u64,
        action = %proxy::action_of(&preq.target)
    );

    http::write_response(&mut wr, &resp).await?;
    Ok(())
}
