//! Cancellable snapshot subscriptions.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::{Stream, StreamExt, future, stream::BoxStream};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Stream of full snapshots attached to a realtime source.
///
/// The listener is released when the subscription is detached or dropped,
/// whichever happens first. After detaching the stream yields `None`.
pub struct Subscription<T> {
    stream: Option<BoxStream<'static, T>>,
    detached: bool,
}

impl<T: Send + 'static> Subscription<T> {
    /// Wrap any snapshot stream.
    pub fn new(stream: impl Stream<Item = T> + Send + 'static) -> Self {
        Self {
            stream: Some(stream.boxed()),
            detached: false,
        }
    }

    /// Subscribe to a watch channel: the current value first, then every change.
    pub fn from_watch<S, F>(receiver: watch::Receiver<S>, map: F) -> Self
    where
        S: Clone + Send + Sync + 'static,
        F: FnMut(S) -> T + Send + 'static,
    {
        Self::new(WatchStream::new(receiver).map(map))
    }

    /// Transform every snapshot.
    pub fn map<U, F>(self, map: F) -> Subscription<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        Subscription {
            stream: self.stream.map(|stream| stream.map(map).boxed()),
            detached: self.detached,
        }
    }

    /// Transform snapshots, skipping those mapped to `None`.
    pub fn filter_map<U, F>(self, mut map: F) -> Subscription<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> Option<U> + Send + 'static,
    {
        Subscription {
            stream: self
                .stream
                .map(|stream| stream.filter_map(move |item| future::ready(map(item))).boxed()),
            detached: self.detached,
        }
    }

    /// Release the listener now. Returns `true` if this call performed the detach.
    pub fn detach(&mut self) -> bool {
        self.stream = None;
        !std::mem::replace(&mut self.detached, true)
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = &mut *self;
        let Some(stream) = this.stream.as_mut() else {
            return Poll::Ready(None);
        };
        match stream.as_mut().poll_next(cx) {
            Poll::Ready(None) => {
                this.stream = None;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_current_value_then_changes() {
        let (tx, rx) = watch::channel(1);
        let mut subscription = Subscription::from_watch(rx, |value| value * 10);

        assert_eq!(subscription.next().await, Some(10));
        tx.send_replace(2);
        assert_eq!(subscription.next().await, Some(20));
    }

    #[tokio::test]
    async fn detach_is_idempotent_and_releases_listener() {
        let (tx, rx) = watch::channel("a");
        let mut subscription = Subscription::from_watch(rx, |value| value);
        assert_eq!(tx.receiver_count(), 1);

        assert!(subscription.detach());
        assert!(!subscription.detach());
        assert_eq!(tx.receiver_count(), 0);
        assert_eq!(subscription.next().await, None);
    }

    #[tokio::test]
    async fn dropping_releases_listener_of_mapped_subscription() {
        let (tx, rx) = watch::channel(0);
        let subscription = Subscription::from_watch(rx, |value| value).map(|value| value + 1);
        assert_eq!(tx.receiver_count(), 1);

        drop(subscription);
        assert_eq!(tx.receiver_count(), 0);
    }

    #[tokio::test]
    async fn filter_map_skips_rejected_snapshots() {
        let (tx, rx) = watch::channel(1);
        let mut evens = Subscription::from_watch(rx, |value| value)
            .filter_map(|value: i32| (value % 2 == 0).then_some(value));

        tx.send_replace(3);
        tx.send_replace(4);
        assert_eq!(evens.next().await, Some(4));
    }
}
