// Frameworks: process bootstrap, configuration and the demo scene.

pub mod config;
pub mod demo;
pub mod runtime;
