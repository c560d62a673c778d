//! Middleware del sistema
//!
//! Este módulo contiene el middleware de autenticación de escaneos y CORS.

pub mod cors;
pub mod scanner_auth;

pub use cors::*;
pub use scanner_auth::*;
