//! DTOs de la API HTTP

pub mod api_response;
pub mod owner_dto;
pub mod scan_dto;
pub mod vehicle_dto;

pub use api_response::ApiResponse;
pub use owner_dto::*;
pub use scan_dto::*;
pub use vehicle_dto::*;
