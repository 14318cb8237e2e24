// src/api/match_route.rs
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{post, State};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::matcher::MatchQuery;
use crate::server::ServerState;

#[derive(Serialize)]
pub struct MatchResponse {
    pub score: f32,
    pub profile: Value,
}

/// Match a company profile from whatever the caller knows about it. At least
/// one field is required; the best-scoring profile wins.
#[post("/match", data = "<query>")]
pub async fn match_company(
    state: &State<ServerState>,
    query: Json<MatchQuery>,
) -> Result<Json<MatchResponse>, status::Custom<Json<Value>>> {
    let query = query.into_inner();

    if query.is_empty() {
        return Err(status::Custom(
            Status::BadRequest,
            Json(json!({
                "error": "At least one field (name, website, phone, facebook) must be provided."
            })),
        ));
    }

    match state.matcher.find_best_match(&query) {
        Ok(Some(hit)) => Ok(Json(MatchResponse {
            score: hit.score,
            profile: hit.profile,
        })),
        Ok(None) => Err(status::Custom(
            Status::NotFound,
            Json(json!({ "error": "No match found." })),
        )),
        Err(e) => {
            error!("Match query failed: {}", e);
            Err(status::Custom(
                Status::InternalServerError,
                Json(json!({ "error": e.to_string() })),
            ))
        }
    }
}
