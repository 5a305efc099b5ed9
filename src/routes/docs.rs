//! Interactive documentation of the room API.

use axum::Router;
use tracing::debug;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

const SWAGGER_UI_PATH: &str = "/docs";

/// Path of the raw OpenAPI JSON rendered by the Swagger UI.
pub const OPENAPI_JSON_PATH: &str = "/api-doc/openapi.json";

/// Swagger UI for the room API, plus the OpenAPI JSON it renders.
///
/// The routes are stateless, so the tree merges into any room router.
pub fn router() -> Router<SharedState> {
    let document = ApiDoc::openapi();
    debug!(
        paths = document.paths.paths.len(),
        ui = SWAGGER_UI_PATH,
        "serving API documentation"
    );
    SwaggerUi::new(SWAGGER_UI_PATH)
        .url(OPENAPI_JSON_PATH, document)
        .into()
}
