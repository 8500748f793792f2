pub mod watchlist_store;
pub mod file_store;
pub mod mongo_store;
pub mod db_init;

pub mod price_feed;
pub mod finnhub;

pub mod alert_sink;
pub mod telegram;

pub mod market_calendar;
pub mod alert_state;
pub mod alert_monitor;
pub mod session_controller;

pub mod watchlist_service;
