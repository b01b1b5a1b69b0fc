pub mod config;
pub mod decoding;
pub mod display;
pub mod encoding;
pub mod metrics;
pub mod network;
pub mod prize;
pub mod training;
