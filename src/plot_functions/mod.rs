// src/plot_functions/mod.rs

pub mod plot_bode;

// src/plot_functions/mod.rs
