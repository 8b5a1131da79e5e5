//! Deadline enforcement for gate runs.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use pin_project_lite::pin_project;

pin_project! {
    /// Races a unit of work against an optional time limit.
    ///
    /// Resolves to `Ok(output)` when the inner future finishes first and
    /// `Err(limit)` when the limit elapses first. Without a limit the
    /// adapter is transparent and never times out.
    #[must_use = "futures do nothing unless polled"]
    pub(crate) struct Deadline<F> {
        #[pin]
        inner: F,
        #[pin]
        sleep: Option<tokio::time::Sleep>,
        limit: Option<Duration>,
    }
}

impl<F: Future> Deadline<F> {
    pub(crate) fn new(inner: F, limit: Option<Duration>) -> Self {
        Self {
            inner,
            sleep: limit.map(tokio::time::sleep),
            limit,
        }
    }
}

impl<F: Future> Future for Deadline<F> {
    type Output = Result<F::Output, Duration>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        // The work gets the first look, so a result that is ready on the
        // same tick as the deadline still wins.
        if let Poll::Ready(output) = this.inner.poll(cx) {
            return Poll::Ready(Ok(output));
        }

        if let (Some(sleep), Some(limit)) = (this.sleep.as_pin_mut(), *this.limit) {
            if sleep.poll(cx).is_ready() {
                return Poll::Ready(Err(limit));
            }
        }
        Poll::Pending
    }
}
