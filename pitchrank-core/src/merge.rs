//! Union of the local roster and the external feed
use std::collections::HashSet;

use crate::player::Player;

/// Local players first, then feed players whose merge key is not taken yet.
///
/// Local records always win a collision; feed rows are never allowed to
/// overwrite or duplicate them. Both lists keep their original order.
#[must_use]
pub fn merge_players(local: &[Player], feed: &[Player]) -> Vec<Player> {
    let mut seen: HashSet<String> = HashSet::with_capacity(local.len() + feed.len());
    let mut merged = Vec::with_capacity(local.len() + feed.len());

    for player in local {
        seen.insert(player.merge_key());
        merged.push(player.clone());
    }
    for player in feed {
        if seen.insert(player.merge_key()) {
            merged.push(player.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: Option<u64>, name: &str, team: &str) -> Player {
        Player {
            id,
            name: name.to_string(),
            team_name: team.to_string(),
            ..Player::default()
        }
    }

    #[test]
    fn local_entry_wins_collision() {
        let local = vec![player(Some(1), "A", "X")];
        let feed = vec![player(None, "A", "X"), player(None, "B", "Y")];
        let merged = merge_players(&local, &feed);
        assert_eq!(merged, vec![player(Some(1), "A", "X"), player(None, "B", "Y")]);
    }

    #[test]
    fn collision_is_case_insensitive() {
        let local = vec![player(Some(1), "Lia", "Storm")];
        let feed = vec![player(Some(50), "LIA", "storm")];
        assert_eq!(merge_players(&local, &feed).len(), 1);
    }

    #[test]
    fn duplicate_feed_rows_collapse_to_first() {
        let feed = vec![
            player(Some(5), "Ana", "Fire"),
            player(Some(6), "ana", "FIRE"),
            player(Some(7), "Bea", "Fire"),
        ];
        let merged = merge_players(&[], &feed);
        let ids: Vec<_> = merged.iter().filter_map(|p| p.id).collect();
        assert_eq!(ids, vec![5, 7]);
    }
}
