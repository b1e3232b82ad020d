//! Per-client SSE stream of the live session views and notices.

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::{
    dto::{
        auth::IdentityResponse,
        game::GameSummary,
        member::MemberSummary,
        sse::{AuthStateEvent, ServerEvent, SessionStatusEvent},
    },
    state::SharedState,
    sync::{LiveState, Subscription, games_view, session_members_view},
};

/// Live subscriptions backing one session stream.
struct SessionViews {
    members: Subscription<Vec<MemberSummary>>,
    upcoming: Subscription<Vec<GameSummary>>,
    playing: Subscription<Vec<GameSummary>>,
    auth: Subscription<AuthStateEvent>,
    status: Subscription<SessionStatusEvent>,
}

impl SessionViews {
    fn attach(state: &SharedState) -> Self {
        let backend = state.backend();
        let roster = state.roster();
        Self {
            members: session_members_view(
                roster.subscribe(),
                backend.listen_to_session_member_ids(),
            )
            .map(|members| members.iter().map(MemberSummary::from).collect()),
            upcoming: games_view(roster.subscribe(), backend.listen_to_upcoming_games())
                .map(|games| games.iter().map(GameSummary::from).collect()),
            playing: games_view(roster.subscribe(), backend.listen_to_playing_games())
                .map(|games| games.iter().map(GameSummary::from).collect()),
            auth: backend.on_auth_state_changed().map(|identity| AuthStateEvent {
                identity: identity.map(IdentityResponse::from),
            }),
            status: backend
                .listen_to_session_open()
                .map(|open| SessionStatusEvent { open }),
        }
    }

    fn detach(&mut self) {
        self.members.detach();
        self.upcoming.detach();
        self.playing.detach();
        self.auth.detach();
        self.status.detach();
    }
}

/// Named SSE channel that only emits when its payload changes.
struct ViewChannel {
    name: &'static str,
    state: LiveState<String>,
}

impl ViewChannel {
    fn new(name: &'static str) -> Self {
        let mut state = LiveState::new();
        state.attach();
        Self { name, state }
    }

    fn detach(&mut self) {
        self.state.detach();
    }

    fn event<T: Serialize>(&mut self, payload: &T) -> Option<ServerEvent> {
        let event = ServerEvent::json(Some(self.name.to_string()), payload)
            .inspect_err(|err| warn!(event = self.name, error = %err, "failed to serialise SSE payload"))
            .ok()?;
        if self.state.apply(event.data.clone()) {
            Some(event)
        } else {
            debug!(event = self.name, "unchanged view skipped");
            None
        }
    }
}

/// Stream the live session views to one client.
///
/// Each client gets its own subscriptions; they are detached once the client
/// disconnects and the forwarder notices the closed channel.
pub fn session_stream(state: SharedState) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let keep_alive = state.config().sse_keep_alive();
    let stream = ReceiverStream::new(session_events(&state)).map(|payload| {
        let mut event = Event::default().data(payload.data);
        if let Some(name) = payload.event {
            event = event.event(name);
        }
        Ok::<_, Infallible>(event)
    });
    Sse::new(stream).keep_alive(KeepAlive::new().interval(keep_alive).text("keep-alive"))
}

/// Attach fresh views for one client and start forwarding them.
fn session_events(state: &SharedState) -> mpsc::Receiver<ServerEvent> {
    forward(SessionViews::attach(state), state.notices().subscribe())
}

/// Forward changed views and notices until the receiver is dropped.
fn forward(
    mut views: SessionViews,
    mut notices: broadcast::Receiver<ServerEvent>,
) -> mpsc::Receiver<ServerEvent> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<ServerEvent>(8);

    tokio::spawn(async move {
        let mut members = ViewChannel::new("session.members");
        let mut upcoming = ViewChannel::new("games.upcoming");
        let mut playing = ViewChannel::new("games.playing");
        let mut auth = ViewChannel::new("auth.state");
        let mut status = ViewChannel::new("session.status");

        loop {
            let payload = tokio::select! {
                _ = tx.closed() => break,
                Some(value) = views.members.next() => members.event(&value),
                Some(value) = views.upcoming.next() => upcoming.event(&value),
                Some(value) = views.playing.next() => playing.event(&value),
                Some(value) = views.auth.next() => auth.event(&value),
                Some(value) = views.status.next() => status.event(&value),
                recv_result = notices.recv() => match recv_result {
                    Ok(notice) => Some(notice),
                    Err(RecvError::Closed) => break,
                    // Skip lagged messages but keep the stream alive.
                    Err(RecvError::Lagged(_)) => None,
                },
            };

            let Some(payload) = payload else {
                continue;
            };
            if tx.send(payload).await.is_err() {
                break;
            }
        }

        views.detach();
        for channel in [&mut members, &mut upcoming, &mut playing, &mut auth, &mut status] {
            channel.detach();
        }
        info!("Session SSE stream disconnected");
    });

    rx
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::{sleep, timeout};

    use super::*;
    use crate::{
        dao::realtime::Location,
        dto::{
            game::{CreateGameRequest, GameCategoryDto},
            session::SetSessionMembersRequest,
        },
        services::{fixtures::organizer_state, game_service, session_service},
    };

    const ALL_LOCATIONS: [Location; 4] = [
        Location::Members,
        Location::Upcoming,
        Location::Playing,
        Location::Open,
    ];

    #[tokio::test]
    async fn stream_delivers_member_and_game_views() {
        let state = organizer_state().await;
        let mut events = session_events(&state);

        session_service::set_members(
            &state,
            SetSessionMembersRequest {
                ids: vec!["a".into(), "b".into()],
            },
        )
        .await
        .unwrap();
        game_service::create(
            &state,
            CreateGameRequest {
                member_ids: vec!["a".into(), "b".into()],
                category: GameCategoryDto::Upcoming,
            },
        )
        .await
        .unwrap();

        // Channels interleave freely; wait until each expected view has shown up.
        timeout(Duration::from_secs(2), async {
            let (mut members, mut upcoming, mut status) = (false, false, false);
            while !(members && upcoming && status) {
                let event = events.recv().await.unwrap();
                let data = event.data.as_str();
                match event.event.as_deref() {
                    Some("session.members") => {
                        members |= data.contains(r#""id":"a""#) && data.contains(r#""id":"b""#);
                    }
                    Some("games.upcoming") => upcoming |= data.contains(r#""id":"a""#),
                    Some("session.status") => status |= data == r#"{"open":true}"#,
                    _ => {}
                }
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn dropped_client_releases_every_listener() {
        let state = organizer_state().await;
        let realtime = state.backend().realtime().clone();
        let events = session_events(&state);
        for location in ALL_LOCATIONS {
            assert_eq!(realtime.listener_count(location), 1, "{location:?}");
        }

        drop(events);
        timeout(Duration::from_secs(2), async {
            while ALL_LOCATIONS
                .iter()
                .any(|location| realtime.listener_count(*location) > 0)
            {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[test]
    fn view_channel_emits_only_changes() {
        let mut channel = ViewChannel::new("session.status");
        let first = channel.event(&SessionStatusEvent { open: true }).unwrap();
        assert_eq!(first.event.as_deref(), Some("session.status"));
        assert_eq!(first.data, r#"{"open":true}"#);

        assert!(channel.event(&SessionStatusEvent { open: true }).is_none());
        assert!(channel.event(&SessionStatusEvent { open: false }).is_some());
    }
}
