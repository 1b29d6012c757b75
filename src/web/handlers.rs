use axum::extract::{Form, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::config::SummaryStyle;
use crate::error::TemplateError;
use crate::session::{Notice, Session};
use crate::web::render::{self, TemplatePanel};
use crate::web::state::AppState;
use crate::web::upload::parse_multipart;

fn page(state: &AppState, session: &Session) -> Html<String> {
    let panel = TemplatePanel::from_load(state.workflow.read_template());
    render::render_page(session, &panel, state.workflow.config().preview_chars)
}

/// Page for a request that never reached the session.
fn rejected(state: &AppState, status: StatusCode, style: SummaryStyle, message: String) -> Response {
    warn!("Rejected request: {}", message);
    let mut session = Session::new(style);
    session.push_notice(Notice::error(message));
    (status, page(state, &session)).into_response()
}

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    page(&state, &Session::default())
}

pub async fn upload(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let form = match parse_multipart(multipart).await {
        Ok(f) => f,
        Err(e) => return rejected(&state, StatusCode::BAD_REQUEST, SummaryStyle::default(), e),
    };

    let mut session = Session::new(form.style);
    session
        .upload(&state.workflow, &form.file_name, form.bytes)
        .await;
    page(&state, &session).into_response()
}

#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    pub style: String,
    pub file_name: String,
    pub encoded_text: String,
}

pub async fn generate(State(state): State<Arc<AppState>>, Form(form): Form<GenerateForm>) -> Response {
    let style: SummaryStyle = match form.style.parse() {
        Ok(s) => s,
        Err(e) => return rejected(&state, StatusCode::BAD_REQUEST, SummaryStyle::default(), e),
    };

    let text = match render::decode_carried_text(&form.encoded_text) {
        Ok(t) => t,
        Err(e) => return rejected(&state, StatusCode::BAD_REQUEST, style, e),
    };

    let mut session = if text.is_empty() {
        Session::new(style)
    } else {
        Session::resume_previewed(style, form.file_name, text)
    };

    match session.generate(&state.workflow).await {
        Ok(()) => page(&state, &session).into_response(),
        Err(e) => rejected(&state, StatusCode::CONFLICT, style, e.to_string()),
    }
}

/// Raw template text.
pub async fn template(State(state): State<Arc<AppState>>) -> Response {
    match state.workflow.read_template() {
        Ok(t) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            t.as_str().to_string(),
        )
            .into_response(),
        Err(e @ TemplateError::Missing { .. }) => {
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.workflow.model(),
    }))
}
