pub mod cli;
pub mod geo;
pub mod ingest;
pub mod linking;
pub mod logging;
pub mod model;
pub mod parallel;
pub mod report;
pub mod stats;
