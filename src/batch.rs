//! Sequential batch conversion with progress events.
//!
//! Runs one shared [`ConversionRequest`] over an ordered list of inputs,
//! strictly one at a time: the result (or failure) of item *i* is settled
//! before item *i+1* begins. This trades throughput for bounded memory (one
//! decoded raster in flight) and deterministic ordering.
//!
//! ## Progress
//!
//! Observers receive [`BatchEvent`]s over an `mpsc` channel rather than
//! through a callback, so a consumer (e.g. the CLI printer thread) can live
//! on its own schedule. A dropped receiver never fails the batch; events are
//! simply discarded.
//!
//! ## Failure
//!
//! The batch is fail-fast: the first item that cannot convert aborts the
//! whole run with [`BatchError::Aborted`] carrying the item's 1-based
//! position and the underlying error. Work completed before the failure is
//! discarded, not returned, and no retry happens here.
//!
//! ## Cancellation
//!
//! A [`CancelToken`] shared with another thread stops the run at the next
//! item boundary. An item already inside the codec runs to completion; the
//! token only takes effect between items.

use crate::transform::{ConversionRequest, ConversionResult, ImageCodec, SourceImage,
    TransformError, convert};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    /// Item `index` (1-based) failed; earlier results are discarded.
    #[error("batch aborted at item {index}: {source}")]
    Aborted {
        index: usize,
        #[source]
        source: TransformError,
    },
    /// The cancel token fired between items.
    #[error("batch cancelled after {completed} of {total} items")]
    Cancelled { completed: usize, total: usize },
}

/// Progress notification sent after each successfully converted item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    ItemCompleted { completed: usize, total: usize },
}

/// Shared flag to stop a running batch at the next item boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Convert every input with the shared request, in order.
///
/// On success the result list matches the input list index for index. On the
/// first failure the whole batch aborts and nothing is returned — see the
/// [module docs](self) for the rationale.
pub fn run(
    codec: &impl ImageCodec,
    inputs: &[SourceImage],
    request: &ConversionRequest,
    progress: Option<Sender<BatchEvent>>,
    cancel: Option<&CancelToken>,
) -> Result<Vec<ConversionResult>, BatchError> {
    let total = inputs.len();
    let mut results = Vec::with_capacity(total);

    for (i, source) in inputs.iter().enumerate() {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(BatchError::Cancelled {
                    completed: i,
                    total,
                });
            }
        }

        let result = convert(codec, source, request).map_err(|source| BatchError::Aborted {
            index: i + 1,
            source,
        })?;
        results.push(result);

        if let Some(tx) = &progress {
            let _ = tx.send(BatchEvent::ItemCompleted {
                completed: i + 1,
                total,
            });
        }
    }

    Ok(results)
}
