pub mod abandonment;
pub mod analysis;
pub mod classification;
pub mod config;
pub mod discipline;
pub mod error;
pub mod fantasy;
pub mod generator;
pub mod race;
pub mod riders;
pub mod roster;
pub mod stages;
// cmd and reports belong to the binary.
