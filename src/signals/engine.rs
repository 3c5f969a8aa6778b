//! End-to-end analysis pipeline.
//!
//! candles → indicators + structure → features → {model, advisory} → fusion →
//! trade plan. The model and the advisory call run concurrently; fusion waits
//! for both.

use std::sync::Arc;
use tracing::{info, warn};

use crate::advisory::{Advisor, AdvisoryContext, AdvisorySource};
use crate::config::{AdvisoryConfig, AnalysisConfig, AppConfig};
use crate::error::{AnalysisError, GeometryError};
use crate::features::FeatureAssembler;
use crate::indicators::{IndicatorEngine, StructureDetector, MIN_CANDLES};
use crate::inference::SequenceModel;
use crate::metrics::Metrics;
use crate::models::analysis::{AnalysisResult, Diagnostic, Mode};
use crate::models::credentials::AdvisoryCredentials;
use crate::models::indicators::Candle;
use crate::models::signal::SignalDirection;
use crate::services::market_data::Provenance;
use crate::signals::fusion::FusionPolicy;
use crate::signals::planner::TradePlanner;

/// Everything one analysis needs. Owned by the request.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub candles: Vec<Candle>,
    pub provenance: Provenance,
    pub advisory_credentials: Option<AdvisoryCredentials>,
}

pub struct AnalysisEngine {
    model: Arc<SequenceModel>,
    analysis: AnalysisConfig,
    advisory: AdvisoryConfig,
    policy: FusionPolicy,
    client: reqwest::Client,
    metrics: Option<Arc<Metrics>>,
}

impl AnalysisEngine {
    pub fn new(model: Arc<SequenceModel>, config: &AppConfig, client: reqwest::Client) -> Self {
        Self {
            model,
            analysis: config.analysis.clone(),
            advisory: config.advisory.clone(),
            policy: FusionPolicy::new(config.analysis.fusion_confidence_threshold),
            client,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn model(&self) -> &SequenceModel {
        &self.model
    }

    pub fn policy(&self) -> &FusionPolicy {
        &self.policy
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let symbol = request.symbol.clone();
        let result = self.run(request).await;

        if let Some(metrics) = &self.metrics {
            match &result {
                Ok(analysis) => metrics
                    .analyses_total
                    .with_label_values(&[analysis.mode.as_str(), analysis.final_signal.as_str()])
                    .inc(),
                Err(e) => metrics
                    .analysis_failures_total
                    .with_label_values(&[e.kind()])
                    .inc(),
            }
        }
        if let Err(e) = &result {
            warn!(symbol = %symbol, kind = e.kind(), error = %e, "Analysis failed");
        }

        result
    }

    async fn run(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let AnalysisRequest {
            symbol,
            candles,
            provenance,
            advisory_credentials,
        } = request;

        IndicatorEngine::validate(&candles)?;
        let indicators = IndicatorEngine::compute(&candles)?;
        let current = *candles.last().ok_or(AnalysisError::InsufficientData {
            required: MIN_CANDLES,
            available: 0,
        })?;

        let levels = StructureDetector::levels(&candles, self.analysis.support_resistance_window)
            .ok_or(AnalysisError::InsufficientData {
                required: 1,
                available: 0,
            })?;
        let breaker_blocks =
            StructureDetector::breaker_blocks(&candles, self.analysis.breaker_block_limit);
        let features = FeatureAssembler::assemble(&indicators, &current);
        let indicator_signal = IndicatorEngine::rule_signal(&candles, &indicators);

        let advisor = Advisor::select(
            self.client.clone(),
            self.advisory.clone(),
            advisory_credentials,
        );
        let ctx = AdvisoryContext {
            symbol: &symbol,
            current_price: current.close,
            indicators: &indicators,
            levels: &levels,
        };

        let model = Arc::clone(&self.model);
        let inference = tokio::task::spawn_blocking(move || model.predict(&features));
        let (inference, advisory) = tokio::join!(inference, advisor.decide(&ctx));
        let lstm_signal = inference.map_err(|e| {
            AnalysisError::ModelInference(format!("inference task failed: {}", e))
        })??;

        if advisory.source == AdvisorySource::Fallback {
            if let Some(metrics) = &self.metrics {
                metrics.advisory_fallbacks_total.inc();
            }
        }

        let fusion = self.policy.fuse(&lstm_signal, &advisory.decision);
        let mode = if provenance == Provenance::Authenticated
            && advisory.source == AdvisorySource::Live
        {
            Mode::Live
        } else {
            Mode::Simulated
        };

        let (final_signal, trade_setup, diagnostic) =
            match TradePlanner::plan(fusion.signal, current.close, &levels) {
                Ok(setup) => (fusion.signal, setup, None),
                Err(GeometryError::InvalidTradeGeometry(message)) => {
                    warn!(symbol = %symbol, signal = %fusion.signal, %message, "Trade setup withheld");
                    (
                        SignalDirection::Hold,
                        None,
                        Some(Diagnostic {
                            kind: "invalid_trade_geometry".to_string(),
                            message,
                        }),
                    )
                }
            };

        info!(
            symbol = %symbol,
            mode = mode.as_str(),
            provenance = provenance.as_str(),
            source = advisory.source.as_str(),
            model_signal = %lstm_signal.signal,
            model_confidence = lstm_signal.confidence,
            advisory_signal = %advisory.decision.signal,
            indicator_signal = %indicator_signal,
            rule = fusion.rule.as_str(),
            final_signal = %final_signal,
            "Analysis complete"
        );

        Ok(AnalysisResult {
            symbol,
            current_price: current.close,
            indicators,
            support_resistance: levels,
            breaker_blocks,
            lstm_signal,
            indicator_signal,
            ai_decision: advisory.decision,
            final_signal,
            trade_setup,
            mode,
            diagnostic,
        })
    }
}
