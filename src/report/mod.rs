pub mod export;
pub mod format;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod xlsx;

pub use export::{write_artifact, ExportArtifact};
pub use model::Overrides;
pub use pipeline::ReportPipeline;
