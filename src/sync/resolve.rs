//! Derivations turning raw id snapshots into member records.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    facade::model::{Game, GameEntry, Member, ResolvedGame},
    sync::{combine::combine_latest, subscription::Subscription},
};

/// Roster snapshot; `None` until the first load completes.
pub type Roster = Option<Vec<Member>>;

/// Members of the roster whose id is in `ids`, in roster order.
///
/// Returns `None` while the roster is not loaded: an unknown roster must read
/// as "pending", never as an empty session.
pub fn resolve_session_members(roster: Option<&[Member]>, ids: &[String]) -> Option<Vec<Member>> {
    let roster = roster?;
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    Some(
        roster
            .iter()
            .filter(|member| wanted.contains(member.id.as_str()))
            .cloned()
            .collect(),
    )
}

/// Replace every team member id with its roster record.
///
/// Returns `None` (skip this update) when the roster is empty or not loaded,
/// or when any id is missing from the roster.
pub fn resolve_games(roster: Option<&[Member]>, games: &[GameEntry]) -> Option<Vec<ResolvedGame>> {
    let roster = roster.filter(|roster| !roster.is_empty())?;
    let by_id: HashMap<&str, &Member> = roster
        .iter()
        .map(|member| (member.id.as_str(), member))
        .collect();

    games.iter().map(|game| resolve_game(&by_id, game)).collect()
}

fn resolve_game(by_id: &HashMap<&str, &Member>, game: &GameEntry) -> Option<ResolvedGame> {
    let team1 = resolve_team(by_id, &game.team1);
    let team2 = resolve_team(by_id, &game.team2);
    match (team1, team2) {
        (Some(team1), Some(team2)) => Some(Game {
            team1,
            team2,
            reference: game.reference.clone(),
        }),
        _ => {
            debug!(game = %game.reference, "game references members missing from roster; deferring");
            None
        }
    }
}

fn resolve_team(by_id: &HashMap<&str, &Member>, ids: &[String]) -> Option<Vec<Member>> {
    ids.iter()
        .map(|id| by_id.get(id.as_str()).map(|member| (*member).clone()))
        .collect()
}

/// Resolved session members, recomputed whenever the roster or the id list changes.
pub fn session_members_view(
    roster: Subscription<Roster>,
    ids: Subscription<Vec<String>>,
) -> Subscription<Vec<Member>> {
    Subscription::new(combine_latest(roster, ids))
        .filter_map(|(roster, ids)| resolve_session_members(roster.as_deref(), &ids))
}

/// Resolved games of one category, recomputed whenever the roster or the collection changes.
pub fn games_view(
    roster: Subscription<Roster>,
    games: Subscription<Vec<GameEntry>>,
) -> Subscription<Vec<ResolvedGame>> {
    Subscription::new(combine_latest(roster, games))
        .filter_map(|(roster, games)| resolve_games(roster.as_deref(), &games))
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use tokio::sync::watch;

    use super::*;
    use crate::facade::model::{GameCategory, GameRef, Role};

    fn member(id: &str) -> Member {
        Member {
            id: id.into(),
            name: id.to_uppercase(),
            elo: 1000,
            role: Role::Member,
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn entry(team1: &[&str], team2: &[&str]) -> GameEntry {
        Game {
            team1: ids(team1),
            team2: ids(team2),
            reference: GameRef {
                category: GameCategory::Upcoming,
                key: "k1".into(),
            },
        }
    }

    #[test]
    fn session_members_follow_roster_order() {
        let roster = vec![member("a"), member("b"), member("c")];
        let resolved = resolve_session_members(Some(roster.as_slice()), &ids(&["c", "a"])).unwrap();
        assert_eq!(resolved, vec![member("a"), member("c")]);
    }

    #[test]
    fn session_members_pending_without_roster() {
        assert_eq!(resolve_session_members(None, &ids(&["a"])), None);
        assert_eq!(
            resolve_session_members(Some(&[][..]), &ids(&["a"])),
            Some(Vec::new())
        );
    }

    #[test]
    fn unknown_session_ids_are_dropped() {
        let roster = vec![member("a")];
        let resolved = resolve_session_members(Some(roster.as_slice()), &ids(&["a", "ghost"])).unwrap();
        assert_eq!(resolved, vec![member("a")]);
    }

    #[test]
    fn games_resolve_to_full_records() {
        let roster = vec![member("a"), member("b"), member("c"), member("d")];
        let resolved = resolve_games(Some(roster.as_slice()), &[entry(&["a", "d"], &["b", "c"])]).unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].team1, vec![member("a"), member("d")]);
        assert_eq!(resolved[0].team2, vec![member("b"), member("c")]);
        assert_eq!(resolved[0].reference.key, "k1");
    }

    #[test]
    fn games_skip_update_with_empty_roster() {
        let games = [entry(&["a"], &["b"])];
        assert_eq!(resolve_games(Some(&[][..]), &games), None);
        assert_eq!(resolve_games(None, &games), None);
    }

    #[test]
    fn games_skip_update_with_unresolved_member() {
        let roster = vec![member("a")];
        assert_eq!(resolve_games(Some(roster.as_slice()), &[entry(&["a"], &["b"])]), None);
    }

    #[tokio::test]
    async fn session_view_recomputes_when_roster_arrives() {
        let (roster_tx, roster_rx) = watch::channel::<Roster>(None);
        let (ids_tx, ids_rx) = watch::channel(ids(&["b"]));
        let mut view = session_members_view(
            Subscription::from_watch(roster_rx, |roster| roster),
            Subscription::from_watch(ids_rx, |ids| ids),
        );

        roster_tx.send_replace(Some(vec![member("a"), member("b")]));
        assert_eq!(view.next().await, Some(vec![member("b")]));

        ids_tx.send_replace(ids(&["a", "b"]));
        assert_eq!(view.next().await, Some(vec![member("a"), member("b")]));
    }

    #[tokio::test]
    async fn detaching_view_releases_both_sources() {
        let (roster_tx, roster_rx) = watch::channel::<Roster>(Some(vec![member("a")]));
        let (ids_tx, ids_rx) = watch::channel(ids(&["a"]));
        let mut view = session_members_view(
            Subscription::from_watch(roster_rx, |roster| roster),
            Subscription::from_watch(ids_rx, |ids| ids),
        );
        assert_eq!(view.next().await, Some(vec![member("a")]));

        assert!(view.detach());
        assert!(!view.detach());
        assert_eq!(roster_tx.receiver_count(), 0);
        assert_eq!(ids_tx.receiver_count(), 0);
    }
}
