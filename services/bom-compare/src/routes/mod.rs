use axum::{routing::post, Router};

use crate::{handlers::*, AppState};

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/bom/parse", post(parse_bom))
        .route("/bom/compare", post(compare_boms))
}
