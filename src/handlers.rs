use crate::actions;
use crate::errors::AppError;
use crate::models::{RegistrationPayload, UploadForm};
use crate::page::{Recorder, RenderInstruction};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    response::Html,
    Form, Json,
};
use tracing::debug;

/// Header the page uses to send back the session id it was served with.
pub const CHART_SESSION_HEADER: &str = "x-chart-session";
const MAX_SESSION_LEN: usize = 64;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let session = state.charts.open().await;
    debug!(%session, "page served");
    Html(render_index(&session))
}

pub async fn register(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Json<Vec<RenderInstruction>> {
    let payload = RegistrationPayload::from_fields(fields);
    debug!(fields = payload.len(), "register submitted");

    let mut page = Recorder::new();
    actions::submit_registration(&state.backend, payload, &mut page).await;
    Json(page.into_instructions())
}

pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Vec<RenderInstruction>>, AppError> {
    let form = read_upload_form(multipart).await?;
    debug!(parts = form.parts.len(), "upload submitted");

    let chart = state.charts.manager(chart_session(&headers)).await;
    let mut page = Recorder::new();
    actions::submit_upload(&state.backend, &chart, form, &mut page).await;
    Ok(Json(page.into_instructions()))
}

pub async fn chart(State(state): State<AppState>, headers: HeaderMap) -> Json<Vec<RenderInstruction>> {
    let chart = state.charts.manager(chart_session(&headers)).await;
    let mut page = Recorder::new();
    actions::load_chart(&state.backend, &chart, &mut page).await;
    Json(page.into_instructions())
}

fn chart_session(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CHART_SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|session| {
            !session.is_empty()
                && session.len() <= MAX_SESSION_LEN
                && session.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            return Err(AppError::bad_request("upload field without a name"));
        };
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        form = match file_name {
            Some(file_name) => form.file(name, Some(file_name), content_type, data.to_vec()),
            None => form.text(name, String::from_utf8_lossy(&data).into_owned()),
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn chart_session_accepts_issued_ids_only() {
        let mut headers = HeaderMap::new();
        assert_eq!(chart_session(&headers), None);

        headers.insert(CHART_SESSION_HEADER, HeaderValue::from_static("61a2f3c4d5e6-1f"));
        assert_eq!(chart_session(&headers), Some("61a2f3c4d5e6-1f"));

        headers.insert(CHART_SESSION_HEADER, HeaderValue::from_static("../../etc"));
        assert_eq!(chart_session(&headers), None);

        let long = "a".repeat(MAX_SESSION_LEN + 1);
        headers.insert(CHART_SESSION_HEADER, HeaderValue::from_str(&long).unwrap());
        assert_eq!(chart_session(&headers), None);
    }
}
