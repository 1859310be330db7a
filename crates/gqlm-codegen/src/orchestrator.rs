//! Generation orchestrator: drives one full pipeline pass.
//!
//! Discovery → attribution → external generation → template normalization
//! → binding emission. Also the entry point for change-triggered
//! regeneration: the host build system feeds in document events and the
//! orchestrator decides whether a full re-run is needed.

use crate::emit::{Binding, BindingEmitter};
use crate::generator::{GenerateRequest, SdkGenerator};
use crate::normalize::normalize_template;
use gqlm_core::{GqlConfig, OperationRegistry, Result};
use gqlm_scanner::{DocumentEvent, discover_documents, scan_and_attribute};
use std::time::Instant;

/// Everything one generation pass produces.
#[derive(Debug)]
pub struct GeneratedOutput {
    /// Normalized SDK source text from the external generator.
    pub sdk: String,
    /// Runtime bindings module (exports + client map).
    pub bindings_module: String,
    /// Declaration-only typed aliases.
    pub declarations: String,
    /// Exported wrapper list with public names and owning clients.
    pub bindings: Vec<Binding>,
    /// Finalized operation registry for runtime dispatch.
    pub registry: OperationRegistry,
}

/// Drives the generation pipeline over a resolved configuration.
#[derive(Debug)]
pub struct Orchestrator {
    config: GqlConfig,
}

impl Orchestrator {
    /// Creates an orchestrator.
    #[must_use]
    pub const fn new(config: GqlConfig) -> Self {
        Self { config }
    }

    /// The configuration this orchestrator generates for.
    #[must_use]
    pub const fn config(&self) -> &GqlConfig {
        &self.config
    }

    /// Runs one full generation pass.
    ///
    /// Template normalization only runs when binding names can be
    /// ambiguous: more than one client, or a sole client not named
    /// `default`.
    ///
    /// # Errors
    ///
    /// Any scan, attribution, or generation error aborts the pass; there
    /// is no partial generation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gqlm_codegen::{Orchestrator, SdkGenerator};
    /// use gqlm_core::{ClientSource, GqlConfig};
    ///
    /// # fn example(generator: &dyn SdkGenerator) -> gqlm_core::Result<()> {
    /// let config = GqlConfig::builder()
    ///     .client("default", ClientSource::host("https://a.test"))
    ///     .document_path("queries")
    ///     .build()?;
    ///
    /// let output = Orchestrator::new(config).regenerate(generator)?;
    /// println!("{} bindings", output.bindings.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn regenerate(&self, generator: &dyn SdkGenerator) -> Result<GeneratedOutput> {
        let start = Instant::now();

        let documents = discover_documents(self.config.document_paths())?;
        tracing::debug!(documents = documents.len(), "Discovered documents");

        let mut registry = OperationRegistry::new();
        scan_and_attribute(&self.config, &documents, &mut registry)?;

        let request = GenerateRequest::from_config(&self.config, documents);
        let mut sdk = generator.generate(&request)?;

        if self.config.needs_normalization() {
            sdk = normalize_template(&sdk, &registry);
        }

        let emitter = BindingEmitter::new(self.config.function_prefix())?;
        let bindings = emitter.bindings(&sdk, &registry);
        let bindings_module = emitter.render_bindings(&bindings, &registry)?;
        let declarations = emitter.render_declarations(&bindings, &registry)?;

        tracing::info!(
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            operations = registry.len(),
            "Generation completed"
        );

        Ok(GeneratedOutput {
            sdk,
            bindings_module,
            declarations,
            bindings,
            registry,
        })
    }

    /// Handles a document change event.
    ///
    /// Re-runs the full pipeline when the event is relevant (document
    /// extension, and non-empty unless a removal); returns `Ok(None)` when
    /// it is not.
    ///
    /// # Errors
    ///
    /// Same as [`Orchestrator::regenerate`].
    pub fn handle_event(
        &self,
        event: &DocumentEvent,
        generator: &dyn SdkGenerator,
    ) -> Result<Option<GeneratedOutput>> {
        if !event.is_relevant() {
            tracing::debug!(path = %event.path.display(), "Ignoring irrelevant change event");
            return Ok(None);
        }
        self.regenerate(generator).map(Some)
    }
}
