//! Session application layer.

pub mod controller;
pub mod views;
