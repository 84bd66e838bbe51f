//! Concrete implementations of the domain ports

pub mod connector;
pub mod postgres;
pub mod s3;
