// src/data_input/mod.rs

pub mod csv_io;
pub mod measurement;
pub mod session;

// src/data_input/mod.rs
