//! Auth Module
//!
//! The authentication/session core: the Auth API client, the durable
//! session store, the session controller state machine, and the route
//! guards that consult it.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs        - Module exports
//! ├── api.rs        - Auth API HTTP client and outcome normalization
//! ├── store.rs      - SessionStore trait, SQLite and in-memory stores
//! ├── controller.rs - AuthController state machine
//! └── guards.rs     - Protected / GuestOnly route guards
//! ```
//!
//! All session mutations flow through [`AuthController`]; nothing else
//! writes to the store.

pub mod api;
pub mod controller;
pub mod guards;
pub mod store;

// Re-export commonly used types
pub use api::{AuthApi, LoginOutcome, RegisterOutcome};
pub use controller::{AuthController, AuthPhase, AuthView, LoginStatus, OtpChallenge};
pub use guards::{GuardDecision, NavRequest, RouteGuard};
pub use store::{MemorySessionStore, SessionStore, SqliteSessionStore};
