//! Balanced team split for a selection of members.

use crate::{error::ServiceError, facade::model::Member};

/// Two teams produced from a selection; `team_a` holds the highest rating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teams {
    /// Strongest player, plus the weakest in a four-player game.
    pub team_a: Vec<Member>,
    pub team_b: Vec<Member>,
}

/// Split two or four members into rating-balanced teams.
///
/// Members are ranked by descending elo (ties keep selection order). With four
/// players the strongest pairs with the weakest; with two each plays alone.
pub fn partition_teams(selected: &[Member]) -> Result<Teams, ServiceError> {
    let mut ranked = selected.to_vec();
    ranked.sort_by(|left, right| right.elo.cmp(&left.elo));

    match ranked.as_slice() {
        [first, second] => Ok(Teams {
            team_a: vec![first.clone()],
            team_b: vec![second.clone()],
        }),
        [first, second, third, fourth] => Ok(Teams {
            team_a: vec![first.clone(), fourth.clone()],
            team_b: vec![second.clone(), third.clone()],
        }),
        other => Err(ServiceError::InvalidInput(format!(
            "teams need 2 or 4 players, got {}",
            other.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::model::Role;

    fn rated(id: &str, elo: i32) -> Member {
        Member {
            id: id.into(),
            name: id.to_uppercase(),
            elo,
            role: Role::Member,
        }
    }

    fn ids(team: &[Member]) -> Vec<&str> {
        team.iter().map(|member| member.id.as_str()).collect()
    }

    #[test]
    fn four_players_pair_strongest_with_weakest() {
        let selected = [
            rated("c", 1100),
            rated("a", 1300),
            rated("d", 900),
            rated("b", 1200),
        ];
        let teams = partition_teams(&selected).unwrap();

        assert_eq!(ids(&teams.team_a), ["a", "d"]);
        assert_eq!(ids(&teams.team_b), ["b", "c"]);
    }

    #[test]
    fn two_players_put_higher_rated_on_team_a() {
        let teams = partition_teams(&[rated("low", 950), rated("high", 1050)]).unwrap();

        assert_eq!(ids(&teams.team_a), ["high"]);
        assert_eq!(ids(&teams.team_b), ["low"]);
    }

    #[test]
    fn equal_ratings_keep_selection_order() {
        let teams = partition_teams(&[rated("first", 1000), rated("second", 1000)]).unwrap();
        assert_eq!(ids(&teams.team_a), ["first"]);
    }

    #[test]
    fn other_sizes_are_rejected() {
        for size in [0, 1, 3, 5] {
            let selected: Vec<Member> = (0..size).map(|i| rated(&i.to_string(), 1000)).collect();
            let err = partition_teams(&selected).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)), "size {size}");
        }
    }
}
