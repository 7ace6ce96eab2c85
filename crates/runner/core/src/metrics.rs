use tracing::trace;

#[derive(Debug)]
pub(crate) struct Metrics;

impl Metrics {
    // --- Metric Names ---
    /// Identifier for created runs.
    /// Labels: `status`
    pub(crate) const RUNS_CREATED_TOTAL: &'static str = "runner_runs_created_total";

    /// Identifier for runs handed to the worker queue.
    pub(crate) const RUNS_ENQUEUED_TOTAL: &'static str = "runner_runs_enqueued_total";

    /// Identifier for resumed runs.
    /// Labels: `path`
    pub(crate) const RUNS_RESUMED_TOTAL: &'static str = "runner_runs_resumed_total";

    /// Identifier for per-run resume failures absorbed by the bulk paths.
    /// Labels: `path`
    pub(crate) const RUN_RESUME_ERROR_TOTAL: &'static str = "runner_run_resume_error_total";

    pub(crate) const PATH_PENDING: &'static str = "pending";
    pub(crate) const PATH_CONFIRMING: &'static str = "confirming";
    pub(crate) const PATH_CONNECTING: &'static str = "connecting";
    pub(crate) const PATH_IN_PROGRESS: &'static str = "in_progress";

    pub(crate) fn init() {
        Self::describe();
        Self::zero();
        trace!(target: "runner::metrics", "Initialized runner metrics");
    }

    fn describe() {
        metrics::describe_counter!(
            Self::RUNS_CREATED_TOTAL,
            metrics::Unit::Count,
            "Total number of job runs created by the run manager",
        );

        metrics::describe_counter!(
            Self::RUNS_ENQUEUED_TOTAL,
            metrics::Unit::Count,
            "Total number of job runs handed to the worker queue",
        );

        metrics::describe_counter!(
            Self::RUNS_RESUMED_TOTAL,
            metrics::Unit::Count,
            "Total number of job runs resumed by an external stimulus",
        );

        metrics::describe_counter!(
            Self::RUN_RESUME_ERROR_TOTAL,
            metrics::Unit::Count,
            "Total number of per-run resume failures absorbed by bulk resume paths",
        );
    }

    fn zero() {
        metrics::counter!(Self::RUNS_CREATED_TOTAL, "status" => "accepted").absolute(0);
        metrics::counter!(Self::RUNS_CREATED_TOTAL, "status" => "rejected").absolute(0);
        metrics::counter!(Self::RUNS_ENQUEUED_TOTAL).absolute(0);
        for path in [
            Self::PATH_PENDING,
            Self::PATH_CONFIRMING,
            Self::PATH_CONNECTING,
            Self::PATH_IN_PROGRESS,
        ] {
            metrics::counter!(Self::RUNS_RESUMED_TOTAL, "path" => path).absolute(0);
            metrics::counter!(Self::RUN_RESUME_ERROR_TOTAL, "path" => path).absolute(0);
        }
    }

    pub(crate) fn record_created(accepted: bool) {
        let status = if accepted { "accepted" } else { "rejected" };
        metrics::counter!(Self::RUNS_CREATED_TOTAL, "status" => status).increment(1);
    }

    pub(crate) fn record_enqueued() {
        metrics::counter!(Self::RUNS_ENQUEUED_TOTAL).increment(1);
    }

    pub(crate) fn record_resumed(path: &'static str) {
        metrics::counter!(Self::RUNS_RESUMED_TOTAL, "path" => path).increment(1);
    }

    pub(crate) fn record_resume_error(path: &'static str) {
        metrics::counter!(Self::RUN_RESUME_ERROR_TOTAL, "path" => path).increment(1);
    }
}
