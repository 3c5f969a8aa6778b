//! Prometheus metrics for the HTTP surface and the analysis pipeline.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub analyses_total: IntCounterVec,
    pub analysis_failures_total: IntCounterVec,
    pub advisory_fallbacks_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = IntGauge::new(
            "http_requests_in_flight",
            "Number of HTTP requests currently being served",
        )?;
        let analyses_total = IntCounterVec::new(
            Opts::new("analyses_total", "Completed analyses by mode and final signal"),
            &["mode", "final_signal"],
        )?;
        let analysis_failures_total = IntCounterVec::new(
            Opts::new("analysis_failures_total", "Failed analyses by error kind"),
            &["kind"],
        )?;
        let advisory_fallbacks_total = IntCounter::new(
            "advisory_fallbacks_total",
            "Advisory decisions produced by the fallback rule engine",
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(analyses_total.clone()))?;
        registry.register(Box::new(analysis_failures_total.clone()))?;
        registry.register(Box::new(advisory_fallbacks_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            analyses_total,
            analysis_failures_total,
            advisory_fallbacks_total,
        })
    }

    /// Render all registered metrics in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
