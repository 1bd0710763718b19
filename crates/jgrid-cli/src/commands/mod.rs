pub mod completions;
pub mod config;
pub mod export;
pub mod graph;
pub mod impedance;
pub mod info;
pub mod stats;
