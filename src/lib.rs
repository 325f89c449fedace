#![doc = "The `tarefas-api` library crate."]
#![doc = ""]
#![doc = "Core business logic for a small task-management backend: credential"]
#![doc = "hashing, session-token issuance and verification, field validation,"]
#![doc = "per-owner authorization, and the user/task lifecycles. The binary in"]
#![doc = "`main.rs` wires these modules into an HTTP server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod validation;
