//! Pure leaderboard ranking over membership rows.

use std::cmp::Ordering;

use crate::{dao::models::MembershipEntity, dto::game::RankedMember};

/// Rank a roster into leaderboard order.
///
/// Total order: `credits` descending, then `current_tile` descending, then
/// `joined_at` ascending, then `participant_id` ascending. The final key is
/// unique per game, so the ordering is deterministic regardless of the input
/// permutation. Ranks are 1-based positions, not dense ranks.
pub fn rank(mut members: Vec<MembershipEntity>) -> Vec<RankedMember> {
    members.sort_by(compare);
    members
        .into_iter()
        .enumerate()
        .map(|(index, member)| RankedMember {
            rank: index as u32 + 1,
            participant_id: member.participant_id,
            credits: member.credits,
            available_credits: member.available_credits,
            current_tile: member.current_tile,
        })
        .collect()
}

fn compare(a: &MembershipEntity, b: &MembershipEntity) -> Ordering {
    b.credits
        .cmp(&a.credits)
        .then(b.current_tile.cmp(&a.current_tile))
        .then(a.joined_at.cmp(&b.joined_at))
        .then(a.participant_id.cmp(&b.participant_id))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use uuid::Uuid;

    use super::*;

    fn member(id: &str, credits: i64, tile: u32, joined_offset_secs: u64) -> MembershipEntity {
        MembershipEntity {
            game_id: Uuid::nil(),
            participant_id: id.to_owned(),
            credits,
            available_credits: credits,
            current_tile: tile,
            joined_at: SystemTime::UNIX_EPOCH + Duration::from_secs(joined_offset_secs),
        }
    }

    fn ids(ranked: &[RankedMember]) -> Vec<&str> {
        ranked
            .iter()
            .map(|row| row.participant_id.as_str())
            .collect()
    }

    #[test]
    fn credits_dominate_then_tile_breaks_ties() {
        let ranked = rank(vec![
            member("alice", 40, 5, 0),
            member("bob", 60, 1, 0),
            member("carol", 40, 7, 0),
        ]);
        assert_eq!(ids(&ranked), ["bob", "carol", "alice"]);
        assert_eq!(
            ranked.iter().map(|row| row.rank).collect::<Vec<_>>(),
            [1, 2, 3]
        );
    }

    #[test]
    fn join_order_breaks_full_score_ties() {
        let ranked = rank(vec![
            member("late", 50, 3, 20),
            member("early", 50, 3, 10),
        ]);
        assert_eq!(ids(&ranked), ["early", "late"]);
    }

    #[test]
    fn participant_id_is_the_deterministic_final_key() {
        let forward = rank(vec![member("b", 50, 3, 10), member("a", 50, 3, 10)]);
        let backward = rank(vec![member("a", 50, 3, 10), member("b", 50, 3, 10)]);
        assert_eq!(forward, backward);
        assert_eq!(ids(&forward), ["a", "b"]);
    }

    #[test]
    fn empty_roster_ranks_to_nothing() {
        assert!(rank(Vec::new()).is_empty());
    }
}
