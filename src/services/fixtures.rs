use crate::{
    config::AppConfig,
    dao::{
        identity::Identity,
        models::{MemberEntity, RoleEntity},
    },
    facade::SessionBackend,
    state::{AppState, SharedState},
};

pub(crate) fn identity(uid: &str, name: &str) -> Identity {
    Identity {
        uid: uid.into(),
        display_name: name.into(),
        email: None,
    }
}

fn rated(id: &str, name: &str, elo: i32, role: RoleEntity) -> MemberEntity {
    MemberEntity {
        id: id.into(),
        name: name.into(),
        elo,
        role,
    }
}

/// State with a loaded roster of four members and nobody signed in.
///
/// `org` (1100) organizes; `a` (1300), `b` (1200) and `c` (900) are members.
pub(crate) async fn roster_state() -> SharedState {
    let backend = SessionBackend::in_memory(vec![
        identity("org", "Olga"),
        identity("a", "Ann"),
    ]);
    backend
        .seed_members(&[
            rated("org", "Olga", 1100, RoleEntity::Organizer),
            rated("a", "Ann", 1300, RoleEntity::Member),
            rated("b", "Bob", 1200, RoleEntity::Member),
            rated("c", "Cid", 900, RoleEntity::Member),
        ])
        .await
        .unwrap();
    let state = AppState::new(backend, AppConfig::default());
    state.roster().refresh(state.backend()).await.unwrap();
    state
}

/// [`roster_state`] with the organizer signed in and the session open.
pub(crate) async fn organizer_state() -> SharedState {
    let state = roster_state().await;
    state.backend().sign_in(Some("org".into())).await.unwrap();
    state.backend().open_session().await.unwrap();
    state
}
