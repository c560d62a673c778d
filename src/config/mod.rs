//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos, variables de entorno
//! y la tabla de tarifas de peaje.

pub mod database;
pub mod environment;
pub mod toll_rates;

pub use environment::*;
pub use toll_rates::TollRateTable;
