//! HTTP server for interactive mode
//!
//! `clusterscope serve` → loads the tables once, opens the browser, and
//! re-renders the whole page on every control change.

use crate::config::{DisplayConfig, ServerConfig};
use crate::data::{DataContext, Feature};
use crate::error::Result;
use crate::report;
use crate::views::{DashboardPage, Selection, SelectionQuery};
use serde::Serialize;
use std::io::{self, Cursor};
use tiny_http::{Header, Method, Request, Response, Server};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

#[derive(Serialize)]
struct ClusterList {
    clusters: Vec<u32>,
    features: Vec<&'static str>,
    default_features: Vec<&'static str>,
}

/// Start server, open browser, serve the dashboard
pub fn start(ctx: &DataContext, server: &ServerConfig, display: &DisplayConfig) -> Result<()> {
    let addr = format!("127.0.0.1:{}", server.port);
    let http = Server::http(&addr)
        .map_err(|e| io::Error::other(format!("cannot listen on {}: {}", addr, e)))?;

    let url = format!("http://localhost:{}", server.port);

    eprintln!("\n\x1b[1;32m🎧 clusterscope\x1b[0m");
    eprintln!("   {}", url);
    eprintln!(
        "   {} tracks in {} clusters\n",
        ctx.tracks.len(),
        ctx.tracks.cluster_ids().len()
    );

    if server.open_browser {
        if let Err(e) = open::that(&url) {
            log::warn!("Failed to open browser: {}", e);
        }
    }

    // Handle requests one at a time
    for request in http.incoming_requests() {
        if let Err(e) = handle_request(request, ctx, display) {
            log::error!("Error: {}", e);
        }
    }

    Ok(())
}

fn content_type(value: &str) -> io::Result<Header> {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes())
        .map_err(|_| io::Error::other(format!("invalid content type '{}'", value)))
}

fn handle_request(request: Request, ctx: &DataContext, display: &DisplayConfig) -> io::Result<()> {
    let method = request.method().clone();
    let url = request.url().to_string();

    log::info!("{} {}", method, url);

    let response = route(&method, &url, ctx, display)?;
    request.respond(response)
}

/// Build the response for one request
fn route(
    method: &Method,
    url: &str,
    ctx: &DataContext,
    display: &DisplayConfig,
) -> io::Result<Response<Cursor<Vec<u8>>>> {
    let path = url.split('?').next().unwrap_or("/");
    let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");

    match (method, path) {
        // Full page render
        (&Method::Get, "/") => {
            let page = render(ctx, query, display);
            let mut html = Vec::new();
            report::html::write(&mut html, &page, true)?;
            Ok(Response::from_data(html).with_header(content_type("text/html; charset=utf-8")?))
        }

        // API: same page as JSON
        (&Method::Get, "/api/dashboard") => {
            let page = render(ctx, query, display);
            let json = serde_json::to_string(&ApiResponse::success(page))?;
            Ok(Response::from_string(json).with_header(content_type("application/json")?))
        }

        // API: enumerated choices for the controls
        (&Method::Get, "/api/clusters") => {
            let list = ClusterList {
                clusters: ctx.tracks.cluster_ids(),
                features: Feature::ALL.iter().map(|f| f.column()).collect(),
                default_features: Feature::DEFAULT_SELECTED.iter().map(|f| f.column()).collect(),
            };
            let json = serde_json::to_string(&ApiResponse::success(list))?;
            Ok(Response::from_string(json).with_header(content_type("application/json")?))
        }

        // 404
        _ => Ok(Response::from_string("Not found").with_status_code(404)),
    }
}

/// Resolve the query against the data and build the page
fn render(ctx: &DataContext, query: &str, display: &DisplayConfig) -> DashboardPage {
    let selection = Selection::resolve(&SelectionQuery::parse(query), &ctx.tracks.cluster_ids());
    DashboardPage::render(ctx, &selection, display)
}
