use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub routes_submitted_total: IntCounter,
    pub badge_jobs_in_queue: IntGauge,
    pub badge_evaluations_total: IntCounterVec,
    pub badge_evaluation_latency_seconds: HistogramVec,
    pub badges_awarded_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let routes_submitted_total =
            IntCounter::new("routes_submitted_total", "Total routes accepted")
                .expect("valid routes_submitted_total metric");

        let badge_jobs_in_queue =
            IntGauge::new("badge_jobs_in_queue", "Current number of badge jobs in queue")
                .expect("valid badge_jobs_in_queue metric");

        let badge_evaluations_total = IntCounterVec::new(
            Opts::new("badge_evaluations_total", "Total badge evaluations by outcome"),
            &["outcome"],
        )
        .expect("valid badge_evaluations_total metric");

        let badge_evaluation_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "badge_evaluation_latency_seconds",
                "Latency of badge evaluation in seconds",
            ),
            &["outcome"],
        )
        .expect("valid badge_evaluation_latency_seconds metric");

        let badges_awarded_total = IntCounterVec::new(
            Opts::new("badges_awarded_total", "Total badges awarded by badge"),
            &["badge"],
        )
        .expect("valid badges_awarded_total metric");

        registry
            .register(Box::new(routes_submitted_total.clone()))
            .expect("register routes_submitted_total");
        registry
            .register(Box::new(badge_jobs_in_queue.clone()))
            .expect("register badge_jobs_in_queue");
        registry
            .register(Box::new(badge_evaluations_total.clone()))
            .expect("register badge_evaluations_total");
        registry
            .register(Box::new(badge_evaluation_latency_seconds.clone()))
            .expect("register badge_evaluation_latency_seconds");
        registry
            .register(Box::new(badges_awarded_total.clone()))
            .expect("register badges_awarded_total");

        Self {
            registry,
            routes_submitted_total,
            badge_jobs_in_queue,
            badge_evaluations_total,
            badge_evaluation_latency_seconds,
            badges_awarded_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
