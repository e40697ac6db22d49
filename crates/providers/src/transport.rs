//! Shared streaming transport plumbing.

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use fablecraft_core::error::ProviderError;

/// Forward a response's byte stream into a chunk channel verbatim.
///
/// Used by the backends that already speak the uniform `data: ...` framing.
/// Cancellation drops the response body (releasing the connection) and closes
/// the channel without an error; the decoder treats the closed channel as
/// normal completion.
pub(crate) fn spawn_passthrough(
    response: reqwest::Response,
    cancel: CancellationToken,
    provider: &'static str,
) -> mpsc::Receiver<std::result::Result<String, ProviderError>> {
    let (tx, rx) = mpsc::channel(64);

    tokio::spawn(async move {
        let mut byte_stream = response.bytes_stream();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(provider, "Generation cancelled, dropping stream");
                    return;
                }
                next = byte_stream.next() => {
                    match next {
                        None => return,
                        Some(Ok(bytes)) => {
                            let chunk = String::from_utf8_lossy(&bytes).into_owned();
                            if tx.send(Ok(chunk)).await.is_err() {
                                return; // receiver dropped
                            }
                        }
                        Some(Err(e)) => {
                            let _ = tx
                                .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                                .await;
                            return;
                        }
                    }
                }
            }
        }
    });

    rx
}
