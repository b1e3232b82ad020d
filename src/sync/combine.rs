//! Combine-latest over two snapshot streams.

use async_stream::stream;
use futures::{Stream, StreamExt};

/// Yield the latest pair of values every time either input produces a value.
///
/// Nothing is emitted until both inputs have produced at least once. The
/// combined stream ends when both inputs have ended, or as soon as one input
/// ends without ever having produced a value.
pub fn combine_latest<A, B, SA, SB>(left: SA, right: SB) -> impl Stream<Item = (A, B)>
where
    A: Clone,
    B: Clone,
    SA: Stream<Item = A>,
    SB: Stream<Item = B>,
{
    stream! {
        let mut left = Box::pin(left);
        let mut right = Box::pin(right);
        let mut latest_left: Option<A> = None;
        let mut latest_right: Option<B> = None;
        let mut left_done = false;
        let mut right_done = false;

        loop {
            let changed = tokio::select! {
                item = left.next(), if !left_done => match item {
                    Some(value) => {
                        latest_left = Some(value);
                        true
                    }
                    None => {
                        left_done = true;
                        false
                    }
                },
                item = right.next(), if !right_done => match item {
                    Some(value) => {
                        latest_right = Some(value);
                        true
                    }
                    None => {
                        right_done = true;
                        false
                    }
                },
                else => break,
            };

            if (left_done && latest_left.is_none()) || (right_done && latest_right.is_none()) {
                break;
            }

            if changed {
                if let (Some(l), Some(r)) = (&latest_left, &latest_right) {
                    yield (l.clone(), r.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;
    use tokio::sync::watch;
    use tokio_stream::wrappers::WatchStream;

    use super::*;

    #[tokio::test]
    async fn waits_for_both_inputs() {
        let combined: Vec<_> =
            combine_latest(stream::iter([1, 2]), stream::iter(["x"])).collect().await;
        // The pairing depends on interleaving, but every pair carries the right value.
        assert!(!combined.is_empty());
        assert!(combined.iter().all(|(_, r)| *r == "x"));
        assert_eq!(combined.last().map(|(l, _)| *l), Some(2));
    }

    #[tokio::test]
    async fn ends_when_one_side_never_produces() {
        let combined: Vec<(i32, i32)> =
            combine_latest(stream::iter([1, 2, 3]), stream::empty()).collect().await;
        assert!(combined.is_empty());
    }

    #[tokio::test]
    async fn recomputes_on_either_input() {
        let (left_tx, left_rx) = watch::channel(1);
        let (right_tx, right_rx) = watch::channel('a');
        let mut combined = Box::pin(combine_latest(
            WatchStream::new(left_rx),
            WatchStream::new(right_rx),
        ));

        assert_eq!(combined.next().await, Some((1, 'a')));

        right_tx.send_replace('b');
        assert_eq!(combined.next().await, Some((1, 'b')));

        left_tx.send_replace(2);
        assert_eq!(combined.next().await, Some((2, 'b')));
    }
}
