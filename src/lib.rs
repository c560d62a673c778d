//! Backend de cobro electrónico de peajes
//!
//! Autentica escaneos RFID de los lectores en carretera, resuelve la
//! etiqueta al vehículo y su saldo prepago, debita el peaje y registra la
//! transacción. Incluye el ciclo de vida de vehículos (suspender/reactivar),
//! las recargas y los paneles de propietario y administración.

pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
