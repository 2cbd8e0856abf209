// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Rewriting proxy server in front of the live blog.
//!
//! Every inbound request is forwarded to the proxied origin with the `view`
//! query parameter carrying the serve mode. The response is classified by
//! content type and rewritten: HTML gets host rewriting plus head injection,
//! other text gets host rewriting, binary passes through untouched. A failed
//! upstream fetch is answered with a synthesized error page so the dev
//! session survives a transiently unreachable blog.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::combinators::{BoxBody, UnsyncBoxBody};
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Incoming;
use hyper::{service::service_fn, Method, Request, Response, StatusCode};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client as LegacyClient;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as AutoConnBuilder;
use tokio::time::Instant;
use tracing::{error, info, warn};
use url::Url;

use crate::classify::BodyKind;
use crate::config::{ProjectContext, TEMPLATE_ARTIFACT};
use crate::headers::{
    bridge_request_headers, forwarded_origin, is_allowed_response_header, ForwardedOrigin,
};
use crate::inject;
use crate::markers;
use crate::redirect::rewrite_location;
use crate::rewrite::replace_host;
use crate::view::{rewrite_view_param, ServeMode};

type BoxError = Box<dyn std::error::Error + Send + Sync>;
type OutboundBody = UnsyncBoxBody<Bytes, BoxError>;
type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<BoxBody<Bytes, Infallible>>, Infallible>> + Send>>;

/// Post-injection hook applied to dev-mode HTML before it is sent.
pub type HtmlTransform = Arc<dyn Fn(String) -> String + Send + Sync>;

struct Shared {
    client: LegacyClient<
        hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>,
        OutboundBody,
    >,
    ctx: Arc<ProjectContext>,
    mode: ServeMode,
    html_transform: Option<HtmlTransform>,
}

fn build_shared(
    ctx: Arc<ProjectContext>,
    mode: ServeMode,
    html_transform: Option<HtmlTransform>,
) -> anyhow::Result<Arc<Shared>> {
    let https = HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();
    let client: LegacyClient<_, OutboundBody> =
        LegacyClient::builder(TokioExecutor::new()).build(https);
    Ok(Arc::new(Shared {
        client,
        ctx,
        mode,
        html_transform,
    }))
}

pub async fn run_server(
    listen: SocketAddr,
    ctx: Arc<ProjectContext>,
    mode: ServeMode,
    html_transform: Option<HtmlTransform>,
) -> anyhow::Result<()> {
    run_server_with_limit(listen, ctx, mode, html_transform, None).await
}

/// Testable variant of `run_server` that accepts an optional `accept_limit`.
/// When `accept_limit` is `Some(n)`, the accept loop accepts `n` connections
/// and then returns; connection handlers are spawned and may still be running
/// at that point.
pub async fn run_server_with_limit(
    listen: SocketAddr,
    ctx: Arc<ProjectContext>,
    mode: ServeMode,
    html_transform: Option<HtmlTransform>,
    accept_limit: Option<usize>,
) -> anyhow::Result<()> {
    let shared = build_shared(ctx, mode, html_transform)?;

    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(%listen, origin = %shared.ctx.origin, mode = ?shared.mode, "listening");

    let server_builder = AutoConnBuilder::new(TokioExecutor::new());

    let mut remaining = accept_limit;
    loop {
        if let Some(0) = remaining {
            break;
        }

        let (stream, _remote_addr) = listener.accept().await?;

        if let Some(ref mut n) = remaining {
            *n -= 1;
        }

        let shared = shared.clone();
        let builder_clone = server_builder.clone();
        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let shared = shared.clone();
                let fut: ServiceFuture = Box::pin(async move { handle_request(req, shared).await });
                fut
            });

            let io = TokioIo::new(stream);
            if let Err(e) = builder_clone.serve_connection_with_upgrades(io, service).await {
                error!(%e, "connection error");
            }
        });
    }

    Ok(())
}

async fn handle_request<B>(
    req: Request<B>,
    shared: Arc<Shared>,
) -> Result<Response<BoxBody<Bytes, Infallible>>, Infallible>
where
    B: hyper::body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let method = req.method().clone();
    let original_url = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    // Target: configured origin + original path/query, with the view
    // parameter carrying the mode marker.
    let mut target = shared.ctx.origin.clone();
    target.set_path(req.uri().path());
    target.set_query(req.uri().query());
    rewrite_view_param(&mut target, shared.mode);

    let forward = forwarded_origin(req.headers(), false);
    let bridged = bridge_request_headers(req.headers());

    let mut builder = Request::builder().method(method.clone()).uri(target.as_str());
    if let Some(headers) = builder.headers_mut() {
        *headers = bridged;
    }
    let body: OutboundBody = if matches!(method, Method::GET | Method::HEAD) {
        Empty::<Bytes>::new()
            .map_err(|never| match never {})
            .boxed_unsync()
    } else {
        req.into_body().map_err(Into::into).boxed_unsync()
    };
    let outbound = match builder.body(body) {
        Ok(r) => r,
        Err(e) => {
            error!(%e, "failed to build proxied request");
            return Ok(error_response(&target));
        }
    };

    let upstream = match shared.client.request(outbound).await {
        Ok(r) => r,
        Err(e) => {
            warn!(
                url = %target,
                error = %e,
                cause = ?std::error::Error::source(&e),
                "proxied request failed"
            );
            let resp = error_response(&target);
            log_request(&method, &original_url, StatusCode::INTERNAL_SERVER_ERROR, &started);
            return Ok(resp);
        }
    };

    let status = upstream.status();
    let upstream_headers = upstream.headers().clone();

    let mut resp_builder = Response::builder().status(status);
    for (name, value) in upstream_headers.iter() {
        if *name == hyper::header::LOCATION {
            if let Ok(loc) = value.to_str() {
                let rewritten =
                    rewrite_location(loc, &target, forward.as_ref(), &shared.ctx.origin);
                resp_builder = resp_builder.header(name, rewritten);
            }
            continue;
        }
        if is_allowed_response_header(name.as_str()) {
            resp_builder = resp_builder.header(name, value);
        }
    }

    let content_type = upstream_headers
        .get(hyper::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let kind = BodyKind::from_content_type(content_type);

    let body_bytes = match upstream.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(url = %target, error = %e, "failed to read upstream body");
            let resp = error_response(&target);
            log_request(&method, &original_url, StatusCode::INTERNAL_SERVER_ERROR, &started);
            return Ok(resp);
        }
    };

    let body = match kind {
        BodyKind::Binary => body_bytes,
        BodyKind::Text => {
            let text = String::from_utf8_lossy(&body_bytes).into_owned();
            Bytes::from(rewrite_text(text, &shared, forward.as_ref()))
        }
        BodyKind::Html => {
            let text = String::from_utf8_lossy(&body_bytes).into_owned();
            Bytes::from(render_html(text, &shared, forward.as_ref()).await)
        }
    };

    let resp = resp_builder
        .body(Full::new(body.clone()).boxed())
        .unwrap_or_else(|_| Response::new(Full::new(body).boxed()));

    log_request(&method, &original_url, status, &started);
    Ok(resp)
}

// Host references only; injection is the HTML path's concern.
fn rewrite_text(text: String, shared: &Shared, forward: Option<&ForwardedOrigin>) -> String {
    match forward {
        Some(f) => replace_host(
            &text,
            &shared.ctx.origin_host(),
            &f.host,
            Some(&f.protocol),
        ),
        None => text,
    }
}

async fn render_html(html: String, shared: &Shared, forward: Option<&ForwardedOrigin>) -> String {
    let html = rewrite_text(html, shared, forward);
    match shared.mode {
        ServeMode::Dev => {
            let markup = inject::dev_head_markup(&shared.ctx.entry_rel());
            let html = inject::inject_into_html(&html, &markup);
            match &shared.html_transform {
                Some(transform) => transform(html),
                None => html,
            }
        }
        ServeMode::Preview => {
            // Preview serves the origin's rendering of the built template;
            // the baked asset tags are copied from the artifact's wrapped
            // marker region into the live document.
            let artifact = shared.ctx.out_dir.join(TEMPLATE_ARTIFACT);
            match tokio::fs::read_to_string(&artifact).await {
                Ok(template) => match markers::head_comment(&template, true) {
                    Some(markup) => inject::inject_into_html(&html, markup),
                    None => html,
                },
                Err(e) => {
                    warn!(
                        artifact = %artifact.display(),
                        error = %e,
                        "built template not readable, serving without injection"
                    );
                    html
                }
            }
        }
    }
}

fn error_response(url: &Url) -> Response<BoxBody<Bytes, Infallible>> {
    let page = Bytes::from(inject::error_page(url.as_str()));
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(hyper::header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(Full::new(page.clone()).boxed())
        .unwrap_or_else(|_| Response::new(Full::new(page).boxed()))
}

fn log_request(method: &Method, url: &str, status: StatusCode, started: &Instant) {
    info!(
        %method,
        url,
        status = status.as_u16(),
        status_text = status.canonical_reason().unwrap_or(""),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "proxied"
    );
}
