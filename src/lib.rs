pub mod builder;
pub mod caller;
pub mod env;
pub mod init;
pub mod layer;
pub mod logger;
pub mod noop_sink;
pub mod queue;
pub mod record;
pub mod sink;
pub mod stdout;

// Re-exported for the `log!` macro expansion.
pub use serde_json;
