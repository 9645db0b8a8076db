// src/data_analysis/mod.rs

pub mod gain;
pub mod response;

// src/data_analysis/mod.rs
