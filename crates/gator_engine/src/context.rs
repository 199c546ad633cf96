use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::FetchError;

/// Cancellation signal plus optional deadline handed to every fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl FetchContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// A context cancelled together with `self`, optionally with a tighter deadline.
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let deadline = match (self.deadline, timeout.map(|t| Instant::now() + t)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fails if the context is already done.
    pub fn check(&self) -> Result<(), FetchError> {
        if self.token.is_cancelled() {
            return Err(FetchError::cancelled());
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Err(FetchError::deadline_exceeded()),
            _ => Ok(()),
        }
    }

    /// Drives `fut` until it finishes or the context is done.
    ///
    /// When the context wins, `fut` is dropped, which releases any open
    /// connection or body it holds.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        self.check()?;
        let bounded = async {
            match self.deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::deadline_exceeded()),
                },
                None => fut.await,
            }
        };
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(FetchError::cancelled()),
            result = bounded => result,
        }
    }
}
