//! IPTV client core: Xtream panel access, persisted user state and an
//! adaptive playback controller.

pub mod config;
pub mod models;
pub mod player;
pub mod services;
