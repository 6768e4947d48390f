//! API handlers

pub mod catalog;
pub mod colors;
pub mod customers;
pub mod documents;
pub mod jobs;
pub mod stock;
