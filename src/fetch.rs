use crate::error::{PulseError, Result};
use crate::github::{PullRequestDetail, PullRequestSource, RepoId};
use crate::report::{normalize, PullRequestRecord};
use futures::future::try_join_all;
use std::future::Future;

/// Run `op` over `items` in consecutive chunks of at most `batch_size`.
///
/// Futures inside a chunk are driven concurrently; the next chunk starts only
/// once every future of the current one has resolved. Results come back in
/// input order regardless of completion order. The first error fails the
/// whole call: the rest of its chunk is dropped and later chunks never start.
pub async fn fetch_in_batches<I, T, F, Fut>(
    items: impl IntoIterator<Item = I>,
    batch_size: usize,
    mut op: F,
) -> Result<Vec<T>>
where
    F: FnMut(I) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let batch_size = batch_size.max(1);
    let mut items = items.into_iter().peekable();
    let mut results = Vec::new();
    let mut chunk_index = 0usize;

    while items.peek().is_some() {
        let chunk: Vec<Fut> = items.by_ref().take(batch_size).map(&mut op).collect();
        tracing::debug!(chunk = chunk_index, size = chunk.len(), "dispatching chunk");

        results.extend(try_join_all(chunk).await?);
        chunk_index += 1;
    }

    Ok(results)
}

/// Fetch full details for `numbers`, in order, at most `batch_size` at a time.
pub async fn fetch_details(
    source: &dyn PullRequestSource,
    repo: &RepoId,
    numbers: &[u64],
    batch_size: usize,
) -> Result<Vec<PullRequestDetail>> {
    tracing::debug!(repo = %repo, count = numbers.len(), batch_size, "fetching details");

    fetch_in_batches(numbers.iter().copied(), batch_size, |number| async move {
        source
            .get_detail(repo, number)
            .await
            .map_err(|e| PulseError::BatchFetch {
                number,
                source: Box::new(e),
            })
    })
    .await
}

/// Normalize every detail, keeping order. Comments are fetched only when
/// `include_comments` is set.
pub async fn normalize_all(
    source: &dyn PullRequestSource,
    repo: &RepoId,
    details: Vec<PullRequestDetail>,
    include_comments: bool,
    batch_size: usize,
) -> Result<Vec<PullRequestRecord>> {
    fetch_in_batches(details, batch_size, |detail| async move {
        let number = detail.number;
        normalize(source, repo, detail, include_comments)
            .await
            .map_err(|e| PulseError::BatchFetch {
                number,
                source: Box::new(e),
            })
    })
    .await
}
