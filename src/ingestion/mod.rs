pub mod pipeline;

pub use pipeline::{run_analysis, AnalysisOutcome, PipelineConfig, PipelineError, ReportRequest};
