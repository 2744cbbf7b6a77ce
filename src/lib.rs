//! Course authoring, listing and enrollment.
//!
//! The server half ([`routes`], [`courses`], [`store`], [`auth`]) persists
//! courses behind a bearer-token gate. The [`client`] half is what an
//! authoring front end links against: the draft editor, the submission
//! formatter, a search debouncer and a typed REST client.

pub mod auth;
pub mod client;
pub mod config;
pub mod content;
pub mod courses;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
