//! JSON/form prompt endpoints (`/generate-text`, `/api/chat`)

use crate::error::AppResult;
use crate::gemini::ModelInput;
use crate::handlers::{AppState, extractor::BodyFields};
use crate::routes::TextRoute;
use axum::Json;

/// Validate the route's required field, then send it to the model as-is.
pub async fn handler(
    state: AppState,
    route: TextRoute,
    body: BodyFields,
) -> AppResult<Json<serde_json::Value>> {
    let prompt = body.required_text(route.field, route.missing_message)?;

    let result = state.generate(ModelInput::text(prompt)).await;
    route.reply.render(result, route.context)
}
