//! Caller side of a streamed reply: forward each fragment, keep the whole text.

use std::future::Future;

use futures::{pin_mut, Stream, StreamExt};

use crate::ChatError;

/// Forwards every non-empty fragment to `forward` in arrival order and returns their
/// concatenation once the stream ends.
///
/// Each fragment is forwarded before the next one is pulled. A forward error stops the stream
/// and is returned as [`ChatError::Forward`].
pub async fn aggregate_stream<S, F, Fut>(fragments: S, mut forward: F) -> Result<String, ChatError>
where
    S: Stream<Item = String>,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    pin_mut!(fragments);
    let mut full_response = String::new();
    while let Some(fragment) = fragments.next().await {
        if fragment.is_empty() {
            continue;
        }
        full_response.push_str(&fragment);
        forward(fragment).await.map_err(ChatError::Forward)?;
    }
    Ok(full_response)
}
