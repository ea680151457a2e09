// ABOUTME: Library exports for kgp CLI modules for testing and external use
// ABOUTME: Makes internal modules available to integration tests

pub mod cli;
pub mod config;
pub mod display;
pub mod output;
pub mod settings;
