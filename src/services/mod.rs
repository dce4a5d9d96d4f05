pub mod aggregator;
pub mod challenge;
pub mod color;
pub mod window;
