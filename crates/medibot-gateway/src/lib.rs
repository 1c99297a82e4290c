//! HTTP surface of the MediBot backend.
//!
//! Every endpoint answers with the same JSON envelope: `status` is `"OK"`
//! or `"Error"`, successful responses carry `data` and failures carry
//! `message`. Validation problems map to 400, missing entities to 404, and
//! everything else is logged in full but reported as a generic 500.

pub mod meds;
pub mod metrics;
pub mod response;
pub mod server;
pub mod sessions;

pub use response::{ApiError, ApiOk, ApiResult};
pub use server::{AppState, GatewayServer};
