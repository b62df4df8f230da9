pub mod activities;
pub mod auth;
pub mod groups;
pub mod meetings;
pub mod members;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod wire;

pub use middleware::{require_auth, require_stamm, Stamm};
