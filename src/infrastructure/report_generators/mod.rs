// Report generator implementations
// Adapters that implement the domain ReportGenerator port

pub mod chat_completion;
pub mod local;

pub use chat_completion::{ChatCompletionConfig, ChatCompletionReportGenerator};
pub use local::LocalReportGenerator;
