//! Startup and periodic cycle scheduling.

use super::orchestrator::UpdateCycle;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Runs `job` once immediately and then once per `period` until `shutdown`
/// resolves.
///
/// Each run is awaited before the next tick is considered, so runs never
/// overlap. Ticks that elapse while a run is in progress are skipped rather
/// than queued. A run in progress when `shutdown` resolves is completed.
pub async fn run_periodic<S, F, Fut>(period: Duration, shutdown: S, mut job: F)
where
    S: Future<Output = ()>,
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => job().await,
        }
    }
}

/// Runs `cycle` at startup and on every update interval until `shutdown`.
///
/// Cycles execute on the blocking pool. A failed cycle is logged and the
/// next tick tries again.
pub async fn run_scheduled<S>(cycle: Arc<UpdateCycle>, shutdown: S)
where
    S: Future<Output = ()>,
{
    let period = cycle.settings().update_interval;
    tracing::info!(interval_secs = period.as_secs(), "Starting update schedule");

    run_periodic(period, shutdown, || {
        let cycle = Arc::clone(&cycle);
        async move {
            match tokio::task::spawn_blocking(move || cycle.run()).await {
                Ok(Ok(report)) => tracing::info!(
                    generated = report.generated.len(),
                    failed = report.failed.len(),
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "Update cycle complete"
                ),
                Ok(Err(e)) => tracing::error!(error = %e, "Update cycle failed"),
                Err(e) => tracing::error!(error = %e, "Update cycle task panicked"),
            }
        }
    })
    .await;

    tracing::info!("Update schedule stopped");
}
