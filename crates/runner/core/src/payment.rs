//! Admission-time payment validation.

use crate::{Config, RunnerError};
use alloy_primitives::U256;
use strand_runner_storage::BridgeStorageReader;
use strand_runner_types::{JobRun, JobSpec};
use tracing::debug;

/// Resolves the aggregate minimum payment a run of `spec` must clear.
///
/// The base floor is the job's own minimum when set, else the node
/// operator's configured floor. Every bridge-typed task adds its bridge's
/// minimum contract payment on top: each external call is paid
/// separately.
pub fn contract_cost<B>(config: &Config, spec: &JobSpec, bridges: &B) -> Result<U256, RunnerError>
where
    B: BridgeStorageReader + ?Sized,
{
    let mut cost = spec.min_payment.or(config.minimum_contract_payment).unwrap_or(U256::ZERO);

    for task in &spec.tasks {
        if let Some(bridge) = bridges.find_bridge(&task.task_type)? {
            cost += bridge.minimum_contract_payment.unwrap_or(U256::ZERO);
        }
    }

    debug!(target: "runner::payment", job = %spec.id, %cost, "Resolved aggregate contract cost");
    Ok(cost)
}

/// Checks the run's offered payment against the aggregate minimum.
///
/// A run below the floor is marked errored with the canonical rejection
/// message; a passing run is left untouched.
pub fn validate_run(run: &mut JobRun, contract_cost: &U256, now: u64) {
    let payment = run.payment.unwrap_or(U256::ZERO);
    if payment < *contract_cost {
        run.set_error(
            now,
            format!(
                "Rejecting job {} with payment {} below minimum threshold ({})",
                run.job_spec_id, payment, contract_cost
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_runner_types::{JobSpecId, RunRequest, RunStatus};

    fn run_with_payment(payment: u64) -> JobRun {
        let request = RunRequest { payment: Some(U256::from(payment)), ..Default::default() };
        JobRun::new(JobSpecId::random(), request)
    }

    #[test]
    fn payment_above_threshold_leaves_status_untouched() {
        let mut run = run_with_payment(2);
        validate_run(&mut run, &U256::from(1), 10);
        assert_eq!(run.status, RunStatus::Unstarted);
        assert!(run.result.error_message.is_none());
        assert!(run.finished_at.is_none());
    }

    #[test]
    fn payment_below_threshold_errors_with_canonical_message() {
        let mut run = run_with_payment(1);
        validate_run(&mut run, &U256::from(2), 10);

        assert_eq!(run.status, RunStatus::Errored);
        assert_eq!(run.finished_at, Some(10));
        let expected = format!(
            "Rejecting job {} with payment 1 below minimum threshold (2)",
            run.job_spec_id
        );
        assert_eq!(run.result.error_message.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn exact_payment_passes() {
        let mut run = run_with_payment(13);
        validate_run(&mut run, &U256::from(13), 10);
        assert_eq!(run.status, RunStatus::Unstarted);
    }

    mod cost {
        use super::*;
        use strand_runner_storage::MemoryStore;
        use strand_runner_types::{BridgeType, JobSpec, TaskSpec, TaskType};
        use url::Url;

        fn bridge(name: &str, minimum: u64) -> BridgeType {
            BridgeType::new(
                TaskType::new(name),
                Url::parse("https://localhost:80").unwrap(),
                0,
                Some(U256::from(minimum)),
            )
        }

        fn spec_with_bridge_task(min_payment: Option<u64>) -> JobSpec {
            JobSpec::new(
                vec![],
                vec![
                    TaskSpec::bare(TaskType::no_op()),
                    TaskSpec::bare(TaskType::new("expensivebridge")),
                ],
                min_payment.map(U256::from),
            )
        }

        #[test]
        fn job_minimum_takes_precedence_over_config() {
            let store = MemoryStore::new();
            let config = Config::new(0, Some(U256::from(13)));
            let spec = spec_with_bridge_task(Some(11));

            let cost = contract_cost(&config, &spec, &store).unwrap();
            assert_eq!(cost, U256::from(11));
        }

        #[test]
        fn config_minimum_applies_when_job_has_none() {
            let store = MemoryStore::new();
            let config = Config::new(0, Some(U256::from(13)));
            let spec = spec_with_bridge_task(None);

            let cost = contract_cost(&config, &spec, &store).unwrap();
            assert_eq!(cost, U256::from(13));
        }

        #[test]
        fn bridge_minima_are_additive() {
            let store = MemoryStore::new();
            store.insert_bridge(bridge("expensivebridge", 13)).unwrap();
            let config = Config::default();
            let spec = spec_with_bridge_task(Some(11));

            let cost = contract_cost(&config, &spec, &store).unwrap();
            assert_eq!(cost, U256::from(24));
        }
    }
}
