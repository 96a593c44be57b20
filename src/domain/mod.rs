// Domain layer module exports
// Pure incident workflow types and rules, plus the report generation port.
// Domain is independent of transport and infrastructure concerns

pub mod incident;
pub mod reporting;
