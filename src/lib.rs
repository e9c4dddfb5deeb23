//! Species distribution mapper: looks up a species on GBIF and plots where it
//! has been observed.

pub mod config;
pub mod data;
pub mod errors;
pub mod gbif;
pub mod map_view;
pub mod plot;
pub mod screen;
pub mod spinner;
pub mod summary;
pub mod task;
pub mod view_model;

#[cfg(test)]
mod fake_source;
