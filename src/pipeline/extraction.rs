//! ExtractionPipeline implementation

use super::types::{ExtractionReport, PipelineConfig, PipelineState};
use crate::error::{Error, Result};
use crate::gate::FilterParseGate;
use crate::mapper::RecordMapper;
use crate::output::{ArtifactSink, BatchPersister};
use crate::source::RowSource;
use crate::utils::timed;
use tracing::{debug, error, info, info_span, Span};

/// Sequential page-by-page extraction run
pub struct ExtractionPipeline<R, S> {
    name: String,
    source: R,
    mapper: RecordMapper,
    gate: FilterParseGate,
    persister: BatchPersister<S>,
    config: PipelineConfig,
    state: PipelineState,
    /// Raw column list of the first non-empty page
    schema: Option<Vec<String>>,
    span: Span,
}

impl<R: RowSource, S: ArtifactSink> ExtractionPipeline<R, S> {
    /// Create a pipeline with a pass-through gate
    pub fn new(
        name: impl Into<String>,
        source: R,
        mapper: RecordMapper,
        sink: S,
        config: PipelineConfig,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::missing_field("name"));
        }
        let persister = BatchPersister::new(sink, config.max_size())?;
        let span = info_span!("extraction", run = %name);

        Ok(Self {
            name,
            source,
            mapper,
            gate: FilterParseGate::default(),
            persister,
            config,
            state: PipelineState::Init,
            schema: None,
            span,
        })
    }

    /// Set the filter/parse gate
    #[must_use]
    pub fn with_gate(mut self, gate: FilterParseGate) -> Self {
        self.gate = gate;
        self
    }

    /// Log inside the given span instead of the pipeline's own
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Run name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The persister, with the artifacts written so far
    pub fn persister(&self) -> &BatchPersister<S> {
        &self.persister
    }

    /// The logging span
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Run the extraction until the source is exhausted.
    ///
    /// Returns `Err` only if the pipeline cannot start. Failures after the
    /// first fetch end the run early; the report then carries the error and
    /// every artifact flushed before it.
    pub fn run(&mut self) -> Result<ExtractionReport> {
        if self.state != PipelineState::Init {
            return Err(Error::config(format!(
                "pipeline '{}' has already run (state: {})",
                self.name, self.state
            )));
        }

        let span = self.span.clone();
        let _entered = span.enter();
        info!(
            source = %self.source.describe(),
            page_size = self.config.page_size(),
            max_size = self.config.max_size(),
            "Starting extraction"
        );

        let name = self.name.clone();
        let mut report = ExtractionReport::new(&name);
        let (elapsed, result) = timed(&name, || self.drive(&mut report));
        report.elapsed_secs = elapsed.as_secs_f64();

        if let Err(e) = result {
            error!(state = %self.state, error = %e, "There was an error getting data");
            report.error = Some(e.to_string());
        }

        report.state = self.state;
        report.paths = self.persister.paths().to_vec();
        info!("Final amount of documents gathered: {}", report.gathered);
        info!(files = ?report.paths, "Files created: {}", report.paths.len());
        Ok(report)
    }

    fn drive(&mut self, report: &mut ExtractionReport) -> Result<()> {
        loop {
            self.transition(PipelineState::Fetching);
            let page = self.source.fetch_page(self.config.page_size())?;

            if page.is_empty() {
                self.transition(PipelineState::FlushFinal);
                self.persister.finish()?;
                self.transition(PipelineState::Done);
                return Ok(());
            }
            report.pages += 1;
            self.check_schema(page.columns())?;

            self.transition(PipelineState::Mapping);
            let records = self.mapper.map(&page)?;
            let first_position = report.gathered;
            report.gathered += records.len();

            self.transition(PipelineState::Gating);
            let outcome = self.gate.apply(records)?;
            report.accepted += outcome.accepted.len();
            report.filtered += outcome.filtered;
            report
                .parse_rejects
                .extend(outcome.rejected.into_iter().map(|mut rejected| {
                    rejected.position += first_position;
                    rejected
                }));
            info!(
                "Documents from page = {}, after filtering = {}",
                page.len(),
                outcome.accepted.len()
            );

            self.transition(PipelineState::Accumulating);
            self.persister.accumulate(outcome.accepted)?;
        }
    }

    /// Fix the schema on the first page and reject any later change
    fn check_schema(&mut self, columns: &[String]) -> Result<()> {
        if let Some(expected) = &self.schema {
            if expected.as_slice() != columns {
                return Err(Error::SchemaChanged {
                    expected: expected.clone(),
                    actual: columns.to_vec(),
                });
            }
            return Ok(());
        }

        self.mapper.validate_schema(columns)?;
        self.schema = Some(columns.to_vec());
        Ok(())
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "Pipeline state");
        self.state = next;
    }
}

impl<R, S> std::fmt::Debug for ExtractionPipeline<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionPipeline")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
