//! HTTP gateway: `POST /query` answered by the query pipeline, plus `GET /health`.

mod error;
mod handlers;
mod router;
mod server;
pub mod service;

pub use error::GatewayError;
pub use server::GatewayServer;
pub use service::{PipelineService, QueryFailure, QueryService};
