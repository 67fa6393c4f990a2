// Library interface for f1replay
// This allows integration tests and benches to access internal modules

pub mod config;
pub mod errors;
pub mod export;
pub mod metadata;
pub mod session;
pub mod telemetry;
pub mod track;
pub mod writer;

// Re-export commonly used types
pub use config::ExportConfig;
pub use errors::ExportError;
pub use export::{ExportBundle, ExportOptions, build_bundle};
pub use metadata::{DriverInfo, DriverMetadataResolver, TeamColorResolver};
pub use session::{RaceSession, SessionProvider};
pub use telemetry::{DriverState, Frame};
pub use track::TrackPoint;
pub use writer::write_bundle;
