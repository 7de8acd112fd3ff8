// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod articles;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod wrap;

pub use error::{Error, Result};
pub use session::{classify, CharState, KeystrokeOutcome, TypingSession};
pub use wrap::wrap;
