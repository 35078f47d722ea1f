//! Jobpulse Backend Library
//!
//! Real-time notification and chat fan-out hub for the job marketplace
//! backend. Persistence, authentication, and the CRUD API live in sibling
//! services; this crate owns the push-delivery path.

pub mod api;
pub mod auth;
pub mod config;
pub mod ws;
