//! The image metadata ingest domain: what a notification record is, how the
//! pipeline runs, and the ports it needs from the outside world.

pub mod decoder;
pub mod models;
pub mod ports;
pub mod service;
