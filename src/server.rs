use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use log::debug;
use serde::Deserialize;

use crate::output::{SUBMIT_ACTION, render_page};
use crate::page::{PageController, PageRequest};
use crate::session::{SessionStore, session_cookie, session_id_from_cookie};

/// Shared state injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<PageController>,
    pub sessions: Arc<SessionStore>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageForm {
    #[serde(default)]
    pub url: String,
    pub action: Option<String>,
}

impl PageForm {
    fn into_request(self, allow_submit: bool) -> PageRequest {
        PageRequest {
            submit: allow_submit && self.action.as_deref() == Some(SUBMIT_ACTION),
            url: self.url,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_page).post(submit_page))
        .with_state(state)
}

/// Loading the page never submits; a `url` query only previews.
async fn show_page(State(state): State<AppState>, headers: HeaderMap, Query(form): Query<PageForm>) -> Response {
    handle(&state, &headers, form.into_request(false)).await
}

async fn submit_page(State(state): State<AppState>, headers: HeaderMap, Form(form): Form<PageForm>) -> Response {
    handle(&state, &headers, form.into_request(true)).await
}

async fn handle(state: &AppState, headers: &HeaderMap, request: PageRequest) -> Response {
    let session_id = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(session_id_from_cookie);

    let session_id = state.sessions.resolve(session_id);
    debug!("Session {session_id} request: submit={} url={:?}", request.submit, request.url);

    let view = state.controller.handle(&state.sessions, session_id, &request).await;

    (
        [(header::SET_COOKIE, session_cookie(session_id))],
        Html(render_page(&view)),
    )
        .into_response()
}
