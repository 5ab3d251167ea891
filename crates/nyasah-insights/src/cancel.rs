use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::InsightsError;

/// Race `fut` against `cancel`, dropping the in-flight call on cancellation.
pub(crate) async fn cancellable<T, E, F>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<T, InsightsError>
where
    F: Future<Output = Result<T, E>>,
    InsightsError: From<E>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(InsightsError::Cancelled),
        result = fut => result.map_err(InsightsError::from),
    }
}
