// src/server/routes.rs
pub mod health {
    use rocket::{get, serde::json::Json};
    use serde_json::{json, Value};

    #[get("/health")]
    pub async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "service": "contact-scraper-api"
        }))
    }

    #[get("/")]
    pub async fn index() -> Json<Value> {
        Json(json!({
            "name": "Company Match API",
            "version": "0.1.0",
            "description": "Search-based matching over scraped company contact profiles",
            "endpoints": {
                "health": "/health",
                "match": "POST /match"
            }
        }))
    }
}
