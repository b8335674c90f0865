//! Cooperative cancellation.
//!
//! The engine never times out by itself. A caller that wants to abort a long
//! run (FODHNN and ACM-2DSCL on large images) keeps a clone of the
//! [`CancelToken`] and calls [`CancelToken::cancel`]; the pipeline polls the
//! flag between pixel blocks and fails with [`CipherError::Cancelled`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{CipherError, Result};

/// Shared cancellation flag for a single request.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next block boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(CipherError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Polls a [`CancelToken`] once per `block` units of work.
pub(crate) struct Checkpoint<'a> {
    token: &'a CancelToken,
    block: usize,
    done: usize,
}

impl<'a> Checkpoint<'a> {
    pub(crate) fn new(token: &'a CancelToken, block: usize) -> Self {
        Self {
            token,
            block: block.max(1),
            done: 0,
        }
    }

    /// Record one unit of work.
    #[inline]
    pub(crate) fn tick(&mut self) -> Result<()> {
        self.done += 1;
        if self.done >= self.block {
            self.done = 0;
            self.token.check()?;
        }
        Ok(())
    }
}
