//! Destination load: encode the plan, then drive the store through
//! truncate → bulk load → reconcile → purge → finalize.
//!
//! The five steps are independent statements. There is no rollback: a failure
//! after the truncate leaves the table empty or loaded-but-unreconciled, and
//! the returned [`StoreError`] names the step that failed.

pub mod encoder;
pub mod mysql;
pub mod store;

pub use encoder::{encode_rows, BulkPayload};
pub use mysql::{MySqlStore, MySqlStoreError};
pub use store::DestinationStore;

use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::config::DestinationConfig;
use crate::error::{PipelineResult, StoreError};
use crate::models::{LoadOutcome, LoadStep};
use crate::transform::pipeline::LoadPlan;

/// Everything a caller learns from one committed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows dropped for a blank sociedad.
    pub removed_sociedad: usize,
    /// Rows dropped by the exclusion set.
    pub excluded: usize,
    /// Rows sent to the bulk load.
    pub loaded: usize,
    pub outcome: LoadOutcome,
}

/// Run the five load steps against `store`.
pub async fn run_load<S: DestinationStore>(
    store: &mut S,
    payload: &BulkPayload,
) -> Result<LoadOutcome, StoreError> {
    log_info("🗑️  Truncating destination table...");
    store.truncate().await.map_err(|e| failed(LoadStep::Truncate, e))?;
    log_success("Table truncated");

    log_info(format!(
        "📥 Bulk loading {} rows ({} bytes)...",
        payload.rows(),
        payload.len()
    ));
    store
        .bulk_load(payload)
        .await
        .map_err(|e| failed(LoadStep::BulkLoad, e))?;
    log_success("Bulk load finished");

    log_info("🔍 Counting rows with an invalid date...");
    let inconsistent = store
        .count_invalid_dates()
        .await
        .map_err(|e| failed(LoadStep::Reconcile, e))?;
    if inconsistent > 0 {
        log_warning(format!("{} rows have an invalid date", inconsistent));
    }

    store
        .purge_invalid_dates()
        .await
        .map_err(|e| failed(LoadStep::Purge, e))?;
    if inconsistent > 0 {
        log_success(format!("{} inconsistent rows deleted", inconsistent));
    }

    let total_final = store
        .count_rows()
        .await
        .map_err(|e| failed(LoadStep::Finalize, e))?;
    log_success(format!("{} rows in destination", total_final));

    Ok(LoadOutcome {
        inconsistent,
        total_final,
    })
}

/// Encode `plan` into a scoped payload file and load it into `store`.
///
/// The payload file is removed when this returns, on success or failure.
pub async fn load_plan<S: DestinationStore>(store: &mut S, plan: &LoadPlan) -> PipelineResult<LoadReport> {
    let payload = BulkPayload::write(&plan.rows)?;
    let outcome = run_load(store, &payload).await?;

    Ok(LoadReport {
        removed_sociedad: plan.removed_sociedad,
        excluded: plan.excluded,
        loaded: payload.rows(),
        outcome,
    })
}

/// Load `plan` over a fresh MySQL connection, closed on every exit path.
pub async fn load_into_mysql(config: &DestinationConfig, plan: &LoadPlan) -> PipelineResult<LoadReport> {
    log_info(format!(
        "🔌 Connecting to {}:{} ({}.{})...",
        config.host, config.port, config.database, config.table
    ));
    let mut store = MySqlStore::connect(config)
        .await
        .map_err(|e| failed(LoadStep::Connect, e))?;

    let result = load_plan(&mut store, plan).await;

    if let Err(e) = store.close().await {
        log_warning(format!("Closing the connection failed: {}", e));
    }
    result
}

fn failed(step: LoadStep, source: impl std::fmt::Display) -> StoreError {
    let err = StoreError::new(step, source);
    log_error(err.to_string());
    err
}
