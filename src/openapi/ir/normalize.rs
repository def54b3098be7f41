//! Normalization from an OpenAPI document to API IR.
//!
//! Runs the pipeline up to (but excluding) text emission:
//! - Named definitions are registered in declaration order
//! - Operations are extracted and grouped
//! - Every group is synthesized into a service
//!
//! Warnings from every stage are gathered in stage order.

use tracing::{debug, info};

use super::api::ApiIR;
use super::extract::{OperationExtractor, group_operations};
use super::resolve::SchemaResolver;
use super::schema::build_definitions;
use super::synth::MethodSynthesizer;
use crate::openapi::config::GeneratorConfig;
use crate::openapi::error::{Diagnostics, GenerateError};
use crate::openapi::spec::OpenApiSpec;

/// Normalize an OpenAPI document into API IR.
pub fn normalize_spec(spec: &OpenApiSpec, config: &GeneratorConfig) -> Result<ApiIR, GenerateError> {
    let pattern = config.operation_id_pattern()?;

    let definitions = build_definitions(spec.schemas());
    let mut resolver = SchemaResolver::new(&definitions, config);
    resolver.register_all();
    debug!(types = resolver.registry().len(), "Registered named definitions.");

    let mut extractor = OperationExtractor::new(spec);
    let operations = extractor.extract();
    let groups = group_operations(operations, config, &pattern);
    debug!(groups = groups.len(), "Grouped operations.");

    let mut synthesizer = MethodSynthesizer::new(config, &pattern).with_definitions(&definitions);
    let services = groups
        .iter()
        .map(|group| synthesizer.synthesize_group(&mut resolver, group))
        .collect::<Result<Vec<_>, _>>()?;

    let (registry, resolver_diagnostics) = resolver.into_parts();
    let mut diagnostics = Diagnostics::default();
    diagnostics.absorb(resolver_diagnostics);
    diagnostics.absorb(extractor.into_diagnostics());
    diagnostics.absorb(synthesizer.into_diagnostics());

    let types = registry.into_definitions();
    info!(
        types = types.len(),
        services = services.len(),
        warnings = diagnostics.warnings().len(),
        "Normalized document."
    );

    Ok(ApiIR {
        types,
        services,
        warnings: diagnostics.into_warnings(),
    })
}
