//! Models Module
//!
//! Request and response DTOs for the diagnostics API.

mod requests;
mod responses;

pub use requests::SetRequest;
pub use responses::{
    DeleteResponse, ErrorResponse, GetResponse, HealthResponse, SetResponse, StatsResponse,
    StrategiesResponse,
};
