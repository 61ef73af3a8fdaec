//! The flush operation: read the sealed file, upload it, issue the load
//! command, delete the local copy.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use bytes::Bytes;
use gantry_warehouse::CopyCommand;
use tokio::time::Instant;

use crate::error::FlushError;
use crate::events::{FlushEvent, FlushOutcome, FlushStarted, FlushStats};
use crate::loader::LoaderShared;
use crate::spool::SpoolFile;

/// Runs one flush operation to completion and publishes the outcome.
pub(crate) async fn run(shared: Arc<LoaderShared>, started: FlushStarted) {
    let begin = Instant::now();
    let result = execute(&shared, &started.file, started.rows).await;

    match &result {
        Ok(stats) => {
            shared.metrics.record_flush_success(stats.rows, stats.bytes);
            tracing::info!(
                file = %started.file,
                rows = stats.rows,
                bytes = stats.bytes,
                "flush completed"
            );
        }
        Err(error) => {
            shared.metrics.record_flush_failure();
            tracing::error!(
                file = %started.file,
                stage = %error.stage(),
                error = %error,
                "flush failed"
            );
        }
    }

    let outcome = FlushOutcome {
        file: started.file,
        rows: started.rows,
        started_at: started.started_at,
        elapsed: begin.elapsed(),
        result,
    };

    // Quiescence checks must observe the decrement before the outcome
    // lands at any subscriber.
    shared.active_flushes.fetch_sub(1, Ordering::Relaxed);
    shared.events.publish(&FlushEvent::Completed(outcome));
}

async fn execute(
    shared: &LoaderShared,
    file: &SpoolFile,
    rows: u64,
) -> Result<FlushStats, FlushError> {
    let config = &shared.config;

    let contents = tokio::fs::read(&file.path)
        .await
        .map_err(|e| FlushError::read(&file.path, e))?;
    let bytes = contents.len() as u64;

    shared
        .store
        .put(&config.bucket, &file.key, Bytes::from(contents))
        .await
        .map_err(FlushError::upload)?;

    let sql = CopyCommand {
        table: &config.table,
        fields: &config.fields,
        bucket: &config.bucket,
        key: &file.key,
        access_key_id: &config.credentials.access_key_id,
        secret_access_key: &config.credentials.secret_access_key,
    }
    .render();

    // The local delete does not wait for load confirmation; a load
    // failure past this point leaves the object in the bucket and no
    // local copy.
    let (loaded, removed) = tokio::join!(
        shared.warehouse.execute(&sql),
        tokio::fs::remove_file(&file.path),
    );

    if let Err(error) = removed {
        tracing::warn!(file = %file, error = %error, "failed to remove uploaded spool file");
    }
    loaded.map_err(FlushError::load)?;

    Ok(FlushStats { rows, bytes })
}
