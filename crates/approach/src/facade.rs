//! Re-exported APIs for consumers of the approach crate.

pub use crate::analysis::{
    AnalysisError, AnalysisReport, AnalysisRequest, AnalysisWarning, SampleRow, Threshold, run_analysis,
};
pub use crate::inputs::{Overlays, build_chain, load_overlays, request_from_config, resolve_threshold};
pub use iac_config::{AnalyzerConfig, DescentConfig};
pub use iac_profile::ConstraintPoint;

/// Resolve inputs, build the provider chain and run one analysis from configuration.
///
/// Provider setup warnings are merged ahead of those raised during the run.
pub fn analyze_config(config: &AnalyzerConfig) -> Result<AnalysisReport, AnalysisError> {
    let (chain, chain_warnings) = build_chain(&config.elevation);
    let mut request = request_from_config(config);
    request.warnings.splice(0..0, chain_warnings);
    run_analysis(&request, &chain)
}
