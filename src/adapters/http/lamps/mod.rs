//! HTTP surface for the `/lamps` resource.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CreateLampRequest, ErrorResponse, LampResponse, ListLampsQuery, ListLampsResponse,
    UpdateLampRequest,
};
pub use routes::lamp_routes;
