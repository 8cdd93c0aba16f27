//! Typed REST surface of the remote backend, one sub-module per portal
//! namespace. The backend is an external collaborator with a fixed, opaque
//! contract; nothing here interprets payloads beyond envelope unwrapping.

mod admin;
mod auth;
mod client;
mod doctor;
mod laboratory;
mod patient;

pub use admin::{ProfessionalKind, ValidationAction};
pub use client::ApiClient;
