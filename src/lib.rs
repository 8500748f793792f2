//! Library entrypoint for stockwatch.
//!
//! Integration tests under `tests/` import the app state, routers,
//! controllers and services from here.

use std::sync::Arc;

pub mod config;
pub mod models;
pub mod services;

#[path = "views/render.rs"]
pub mod render;
#[path = "views/templates.rs"]
pub mod templates;

pub mod controllers;
pub mod routes;

use services::{
    price_feed::PriceFeed, session_controller::SessionController,
    watchlist_store::WatchlistStore,
};

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub store: Arc<dyn WatchlistStore>,
    pub feed: Arc<dyn PriceFeed>,
    pub sessions: Arc<SessionController>,
    pub settings: config::Settings,
    pub events_tx: tokio::sync::broadcast::Sender<String>,
}
