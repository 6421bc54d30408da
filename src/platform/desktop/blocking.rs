use anyhow::anyhow;

/// Runs a blocking call (HTTP, SQLite, file IO) on the blocking pool so the
/// UI keeps rendering while it is pending.
pub async fn run_blocking<F, T>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| anyhow!("background task failed: {err}"))
}
