// src/server/mod.rs
use crate::api::*;
use crate::matcher::CompanyMatcher;
use rocket::{routes, Build, Rocket};

pub mod routes;

pub struct ServerState {
    pub matcher: CompanyMatcher,
}

pub fn build_rocket(matcher: CompanyMatcher) -> Rocket<Build> {
    let state = ServerState { matcher };

    rocket::build().manage(state).mount(
        "/",
        routes![
            // Health and info endpoints
            routes::health::health_check,
            routes::health::index,
            // Matching endpoint
            match_company,
        ],
    )
}
