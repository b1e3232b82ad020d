//! One-off notices fanned out to every open session stream.

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::dto::sse::{GameFinishedEvent, ServerEvent};

/// SSE event name of a recorded game result.
pub const GAME_FINISHED_EVENT: &str = "game.finished";

/// Notices that have no realtime location of their own, such as recorded results.
pub struct NoticeHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl NoticeHub {
    /// Hub whose slowest subscriber may fall `capacity` notices behind before lagging.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Notices sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Announce a recorded result. Returns how many session streams received it.
    pub fn game_finished(&self, notice: &GameFinishedEvent) -> usize {
        let event = match ServerEvent::json(Some(GAME_FINISHED_EVENT.to_string()), notice) {
            Ok(event) => event,
            Err(err) => {
                warn!(game = %notice.key, error = %err, "failed to serialise game.finished notice");
                return 0;
            }
        };
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(game = %notice.key, receivers, "game.finished notice sent");
                receivers
            }
            Err(_) => {
                debug!(game = %notice.key, "no session stream listening for game.finished");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice() -> GameFinishedEvent {
        GameFinishedEvent {
            key: "k1".into(),
            win: vec!["a".into()],
            lose: vec!["b".into()],
        }
    }

    #[test]
    fn game_finished_without_streams_reaches_nobody() {
        let hub = NoticeHub::new(4);
        assert_eq!(hub.game_finished(&notice()), 0);
    }

    #[tokio::test]
    async fn game_finished_reaches_every_stream() {
        let hub = NoticeHub::new(4);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        assert_eq!(hub.game_finished(&notice()), 2);
        for receiver in [&mut first, &mut second] {
            let event = receiver.recv().await.unwrap();
            assert_eq!(event.event.as_deref(), Some(GAME_FINISHED_EVENT));
            assert_eq!(event.data, r#"{"key":"k1","win":["a"],"lose":["b"]}"#);
        }
    }
}
