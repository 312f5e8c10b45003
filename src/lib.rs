pub mod config;
pub mod error;
pub mod logger;
pub mod playback;
pub mod stamp;
pub mod version_file;

pub use logger::*;
pub use config::{EngineConfig, Invocation, LogTarget, RunOptions};
pub use error::{StampError, IoStep};
pub use stamp::BuildStamp;
pub use version_file::{DefineScanner, DefineSpan, Symbol, VersionFile, MAX_FILE_SIZE};
