use crate::{
    agents::{Agent, ClinicalAgent, PatentAgent, PlannerAgent, Refiner, SynthesisAgent},
    llm::LLMClient,
    types::{AnalysisReport, AppError, Findings, Result},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, Instrument};
use uuid::Uuid;

/// Queries shorter than this (after trimming) are rejected
pub const MIN_QUERY_LEN: usize = 5;

/// Runs plan → (clinical ∥ patent) → synthesis for one query.
pub struct ResearchCoordinator {
    planner: PlannerAgent,
    clinical: ClinicalAgent,
    patent: PatentAgent,
    synthesis: SynthesisAgent,
}

impl ResearchCoordinator {
    /// Build all four stages over one shared client, with `refine_passes`
    /// review rounds for plan, clinical and patent.
    pub fn new(llm: Arc<dyn LLMClient>, refine_passes: usize) -> Self {
        let refiner = || Refiner::new(Arc::clone(&llm)).with_passes(refine_passes);

        Self {
            planner: PlannerAgent::new(Arc::clone(&llm), refiner()),
            clinical: ClinicalAgent::new(Arc::clone(&llm), refiner()),
            patent: PatentAgent::new(Arc::clone(&llm), refiner()),
            synthesis: SynthesisAgent::new(Arc::clone(&llm)),
        }
    }

    pub fn validate_query(query: &str) -> Result<&str> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_LEN {
            return Err(AppError::InvalidInput(format!(
                "Query must be at least {} characters",
                MIN_QUERY_LEN
            )));
        }
        Ok(trimmed)
    }

    /// Execute a full analysis.
    ///
    /// Clinical and patent run concurrently against the same plan. Both are
    /// awaited before any error is reported; if both fail the clinical error
    /// wins. Synthesis only runs when both succeeded.
    pub async fn analyze(&self, query: &str) -> Result<AnalysisReport> {
        let query = Self::validate_query(query)?;
        let analysis_id = Uuid::new_v4();
        let span = tracing::info_span!("analysis", id = %analysis_id);

        async move {
            let start = Instant::now();
            info!(query_len = query.len(), "Starting analysis");

            let plan = self.planner.run(query).await?;

            let (clinical, patent) = tokio::join!(self.clinical.run(&plan), self.patent.run(&plan));
            let (clinical, patent) = match (clinical, patent) {
                (Ok(clinical), Ok(patent)) => (clinical, patent),
                (Err(e), other) => {
                    if let Err(patent_err) = other {
                        error!(error = %patent_err, "Patent stage also failed");
                    }
                    return Err(e);
                }
                (Ok(_), Err(e)) => return Err(e),
            };

            let findings = Findings {
                plan,
                clinical,
                patent,
            };
            let synthesis = self.synthesis.run(&findings).await?;

            info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                score = synthesis.score(),
                "Analysis complete"
            );
            Ok(AnalysisReport::new(findings, synthesis))
        }
        .instrument(span)
        .await
    }
}
