use std::future::Future;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::api::{self, ByteStream};
use crate::domain::AppError;

use super::progress::ProgressRegistry;

/// Upper bound for the up-front buffer reservation
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Whether progress updates also carry the server-advertised length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalReporting {
    /// Keep the size the entry was registered with
    Registered,
    /// Replace it with the `Content-Length` of the response
    FromResponse,
}

/// Drive `request` to completion, buffering the body and streaming the byte
/// count into `registry` under `key`. Cancelling `cancel` at any point fails
/// the transfer with [`AppError::Aborted`].
pub async fn fetch_with_progress<F>(
    request: F,
    key: &str,
    registry: &dyn ProgressRegistry,
    cancel: &CancellationToken,
    reporting: TotalReporting,
) -> Result<Bytes, AppError>
where
    F: Future<Output = api::Result<(Option<u64>, ByteStream)>>,
{
    let (total, mut stream) = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(AppError::Aborted),
        response = request => response?,
    };

    let reported_total = match reporting {
        TotalReporting::Registered => None,
        TotalReporting::FromResponse => total,
    };

    let mut buffer = BytesMut::with_capacity(total.unwrap_or(0).min(MAX_PREALLOCATION) as usize);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AppError::Aborted),
            chunk = stream.next() => match chunk {
                Some(Ok(chunk)) => {
                    buffer.extend_from_slice(&chunk);
                    registry.update(key, buffer.len() as u64, reported_total);
                }
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        }
    }

    Ok(buffer.freeze())
}
