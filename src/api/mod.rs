// src/api/mod.rs
pub mod match_route;

pub use match_route::*;
