//! # Worker Supervision
//!
//! Real thread workers behind the dispatcher: deadlines, restarts, and
//! draining of jobs that were queued on a lost worker.

use super::fixtures::*;
use cat_04_job_dispatcher::{Deadline, JobError, WorkerState};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

const DEADLINE: Duration = Duration::from_millis(150);
const STALL: Duration = Duration::from_millis(900);

fn hanging_dispatcher(dir: &std::path::Path) -> cat_04_job_dispatcher::DispatcherHandle {
    start_thread_dispatcher(Arc::new(HangingHandler::new(dir, STALL)), DEADLINE)
}

#[tokio::test]
async fn test_timeout_restarts_worker_for_next_job() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = hanging_dispatcher(dir.path());

    let summary = dispatcher
        .simulate(argv(&["sim", HANG]), BLINKER, Deadline::Default)
        .await
        .unwrap();
    assert!(summary.is_none(), "stalled job should time out");

    let pt = dispatcher
        .basic_identify(BLINKER, 64, Deadline::Default)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pt.period, 2);

    let stats = dispatcher.stats().await.unwrap();
    assert_eq!(stats.timed_out, 1);
    assert_eq!(stats.restarts, 1);
    assert_eq!(stats.instance.get(), 2);
    assert_eq!(stats.state, WorkerState::Alive);
    dispatcher.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_jobs_queued_behind_a_timeout_fail_once() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = hanging_dispatcher(dir.path());

    let (stalled, queued) = tokio::join!(
        dispatcher.simulate(argv(&["sim", HANG]), BLINKER, Deadline::Default),
        dispatcher.basic_identify(GLIDER, 64, Deadline::Never),
    );
    assert!(stalled.unwrap().is_none());
    assert!(matches!(queued, Err(JobError::Worker(_))));

    // The old worker's late reply must not resolve anything or restart again.
    tokio::time::sleep(STALL).await;
    let stats = dispatcher.stats().await.unwrap();
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.restarts, 1);
    assert_eq!(stats.completed, 0);

    let pt = dispatcher
        .basic_identify(GLIDER, 64, Deadline::Default)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pt.period, 4);
    dispatcher.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_jobs_get_their_own_results() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = start_executor_dispatcher(dir.path());

    let mut jobs = JoinSet::new();
    for i in 0..16 {
        let dispatcher = dispatcher.clone();
        let (source, period) = if i % 2 == 0 { (BLINKER, 2) } else { (GLIDER, 4) };
        jobs.spawn(async move {
            let pt = dispatcher
                .basic_identify(source, 64, Deadline::Default)
                .await
                .unwrap()
                .unwrap();
            (pt.period, period)
        });
    }
    while let Some(result) = jobs.join_next().await {
        let (got, expected) = result.unwrap();
        assert_eq!(got, expected);
    }

    let stats = dispatcher.stats().await.unwrap();
    assert_eq!(stats.submitted, 16);
    assert_eq!(stats.completed, 16);
    assert_eq!(stats.restarts, 0);
    dispatcher.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_rejects_later_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = start_executor_dispatcher(dir.path());
    dispatcher.shutdown().await.unwrap();

    let err = dispatcher
        .basic_identify(BLINKER, 64, Deadline::Default)
        .await
        .unwrap_err();
    assert_eq!(err, JobError::SupervisorGone);
}
