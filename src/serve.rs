//! HTTP server for interactive heatmap mode
//!
//! `compliance-heatmap serve data.json` → starts server, opens browser, shows the grid
//!
//! Requests are handled one at a time on the calling thread, so toggles are
//! applied in arrival order against a single [`CellStates`].

use crate::cell::{CellId, CellStates, PopoverPolicy};
use crate::dataset::{ControlId, Dataset};
use crate::grid::{Grid, GridCell};
use crate::legend::{LegendEntry, LEGEND};
use crate::orgs::OrganizationSet;
use crate::report::html::{self, CellMode};
use crate::report::PageOptions;
use serde::{Deserialize, Serialize};
use std::io::Read;
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

impl ApiResponse<()> {
    fn failure(error: impl Into<String>) -> Self {
        Self { ok: false, data: None, error: Some(error.into()) }
    }
}

/// Identifies one cell in query strings and JSON bodies.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CellParams {
    pub control: ControlId,
    pub org: String,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct ToggleResult {
    pub cell: CellId,
    pub open: bool,
    pub open_cells: usize,
}

/// Everything the server renders from: the immutable dataset and columns,
/// plus the mutable popover state.
#[derive(Debug)]
pub struct AppState {
    pub dataset: Dataset,
    pub orgs: OrganizationSet,
    pub states: CellStates,
    pub page: PageOptions,
}

impl AppState {
    pub fn new(dataset: Dataset, orgs: OrganizationSet, policy: PopoverPolicy, page: PageOptions) -> Self {
        Self { dataset, orgs, states: CellStates::new(policy), page }
    }

    pub fn grid(&self) -> Grid {
        Grid::build(&self.dataset, &self.orgs, &self.states)
    }

    fn resolve(&self, params: CellParams) -> Result<CellId, String> {
        if self.dataset.control(params.control).is_none() {
            return Err(format!("unknown control {}", params.control));
        }
        if !self.orgs.contains(&params.org) {
            return Err(format!("unknown organization {}", params.org));
        }
        Ok(CellId::new(params.control, params.org))
    }

    fn toggle(&mut self, id: CellId) -> ToggleResult {
        let open = self.states.toggle(&id);
        tracing::debug!(cell = %id, open, "toggled cell");
        ToggleResult { cell: id, open, open_cells: self.states.open_count() }
    }
}

/// Transport-independent response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub location: Option<String>,
}

impl Reply {
    fn html(body: String) -> Self {
        Self { status: 200, content_type: "text/html; charset=utf-8", body, location: None }
    }

    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_string(value)
            .unwrap_or_else(|e| format!(r#"{{"ok":false,"data":null,"error":"{}"}}"#, e));
        Self { status, content_type: "application/json", body, location: None }
    }

    fn redirect(location: String) -> Self {
        Self { status: 303, content_type: "text/plain", body: String::new(), location: Some(location) }
    }

    fn not_found() -> Self {
        Self { status: 404, content_type: "text/plain", body: "Not found".to_string(), location: None }
    }
}

/// Start server, open browser, serve the heatmap
pub fn start(port: u16, mut state: AppState, open_browser: bool) -> std::io::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let url = format!("http://localhost:{}", port);

    eprintln!("\n\x1b[1;32m{}\x1b[0m", state.page.title);
    eprintln!("   {}", url);
    eprintln!(
        "   {} controls x {} organizations, popovers: {}\n",
        state.dataset.control_count(),
        state.orgs.len(),
        state.states.policy()
    );

    if open_browser {
        let _ = open::that(&url);
    }

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &mut state) {
            tracing::warn!(error = %e, "failed to answer request");
        }
    }

    Ok(())
}

fn handle_request(mut request: Request, state: &mut AppState) -> std::io::Result<()> {
    let url = request.url().to_string();
    let method = request.method().clone();

    let mut body = String::new();
    if method == Method::Post {
        request.as_reader().read_to_string(&mut body)?;
    }

    tracing::debug!(method = ?method, url = %url, "request");
    let reply = route(&method, &url, &body, state);

    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response = response.with_header(header);
    }
    if let Some(location) = reply.location {
        if let Ok(header) = Header::from_bytes(&b"Location"[..], location.as_bytes()) {
            response = response.with_header(header);
        }
    }
    request.respond(response)
}

/// Dispatch one request against the server state.
pub fn route(method: &Method, url: &str, body: &str, state: &mut AppState) -> Reply {
    let path = url.split('?').next().unwrap_or("/");

    match (method, path) {
        // Interactive page
        (&Method::Get, "/") => {
            Reply::html(html::render(&state.grid(), &state.page, CellMode::Interactive))
        }

        // Cell link from the page: toggle, then back to the cell
        (&Method::Get, "/toggle") => match parse_params(url, body).and_then(|p| state.resolve(p)) {
            Ok(id) => {
                let anchor = id.anchor();
                state.toggle(id);
                Reply::redirect(format!("/#{}", anchor))
            }
            Err(e) => Reply::json(400, &ApiResponse::<()>::failure(e)),
        },

        // API: Toggle
        (&Method::Get, "/api/toggle") | (&Method::Post, "/api/toggle") => {
            match parse_params(url, body).and_then(|p| state.resolve(p)) {
                Ok(id) => Reply::json(200, &ApiResponse::success(state.toggle(id))),
                Err(e) => Reply::json(400, &ApiResponse::<()>::failure(e)),
            }
        }

        // API: Close every popover
        (&Method::Post, "/api/close") => {
            state.states.close_all();
            Reply::json(200, &ApiResponse::success(serde_json::json!({ "open_cells": 0 })))
        }

        // API: Whole grid
        (&Method::Get, "/api/grid") => Reply::json(200, &ApiResponse::success(state.grid())),

        // API: One cell
        (&Method::Get, "/api/cell") => match parse_params(url, body).and_then(|p| state.resolve(p)) {
            Ok(id) => {
                let cell: Option<GridCell> = state.grid().cell(&id).cloned();
                match cell {
                    Some(cell) => Reply::json(200, &ApiResponse::success(cell)),
                    None => Reply::json(404, &ApiResponse::<()>::failure(format!("no cell {}", id))),
                }
            }
            Err(e) => Reply::json(400, &ApiResponse::<()>::failure(e)),
        },

        // API: Legend
        (&Method::Get, "/api/legend") => {
            let legend: &[LegendEntry] = LEGEND;
            Reply::json(200, &ApiResponse::success(legend))
        }

        // 404
        _ => Reply::not_found(),
    }
}

fn parse_params(url: &str, body: &str) -> Result<CellParams, String> {
    let has_body = !body.trim().is_empty();

    // Try query string
    if let Some(query) = url.split_once('?').map(|(_, q)| q).filter(|q| !q.is_empty()) {
        match serde_urlencoded::from_str::<CellParams>(query) {
            Ok(params) => return Ok(params),
            Err(e) if !has_body => return Err(format!("invalid cell: {}", e)),
            Err(e) => tracing::debug!(error = %e, "query did not name a cell, trying body"),
        }
    }

    // Try JSON body
    if has_body {
        return serde_json::from_str::<CellParams>(body).map_err(|e| format!("invalid cell: {}", e));
    }

    Err("missing cell parameters: expected control and org".to_string())
}
