// Infrastructure layer module
// Contains external service integrations
// Follows Hexagonal Architecture

pub mod report_generators;
pub mod retry;
