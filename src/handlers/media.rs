//! Upload endpoints (`/generate-from-image`, `/generate-from-document`,
//! `/generate-from-audio`)

use crate::error::{AppError, AppResult};
use crate::gemini::ModelInput;
use crate::handlers::AppState;
use crate::routes::MediaRoute;
use crate::upload::MediaForm;
use axum::{
    Json,
    extract::{Multipart, multipart::MultipartRejection},
};

/// Store the uploaded file, send it inline with the prompt, and answer.
///
/// The upload guard lives until this function returns, so the file is gone
/// once the response is produced, whatever the outcome.
pub async fn handler(
    state: AppState,
    route: MediaRoute,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<serde_json::Value>> {
    // A body that is not multipart at all cannot carry a file.
    let Ok(multipart) = multipart else {
        return Err(AppError::Validation(route.missing_message.to_string()));
    };

    let form = MediaForm::read(state.uploads(), multipart, route.field)
        .await
        .map_err(|e| {
            if e.status().is_server_error() {
                tracing::error!(error = %e, "Error {}", route.context);
            }
            route.reply.exposure.apply(e)
        })?;

    let Some(file) = form.file else {
        return Err(AppError::Validation(route.missing_message.to_string()));
    };
    let prompt = form
        .prompt
        .filter(|prompt| !prompt.is_empty())
        .unwrap_or_else(|| route.default_prompt.to_string());

    state.metrics().record_upload(file.size());
    tracing::debug!(
        field = route.field,
        original_name = file.original_name().unwrap_or("-"),
        mime_type = file.mime_type(),
        size = file.size(),
        "Received upload"
    );

    let bytes = file.read().await.map_err(|e| {
        tracing::error!(error = %e, "Error {}", route.context);
        route.reply.exposure.apply(e)
    })?;
    let input = ModelInput::with_inline(prompt, &bytes, file.mime_type());
    drop(bytes);

    let result = state.generate(input).await;
    let reply = route.reply.render(result, route.context);

    drop(file);
    reply
}
