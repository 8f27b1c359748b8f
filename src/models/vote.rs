use crate::error::{AppError, Result};

/// Direction of a vote on a post or a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteKind {
    Up,
    Down,
}

impl VoteKind {
    fn verb(&self) -> &'static str {
        match self {
            VoteKind::Up => "upvoted",
            VoteKind::Down => "downvoted",
        }
    }
}

/// Adds `user_id` to the set matching `kind`, removing it from the opposite
/// set first. A user id is never present in both sets after this returns.
///
/// Fails when the user already cast the same vote; the sets are left
/// untouched in that case.
pub(crate) fn cast(
    kind: VoteKind,
    target: &'static str,
    upvote: &mut Vec<String>,
    downvote: &mut Vec<String>,
    user_id: &str,
) -> Result<()> {
    let (chosen, opposite) = match kind {
        VoteKind::Up => (upvote, downvote),
        VoteKind::Down => (downvote, upvote),
    };

    if chosen.iter().any(|id| id == user_id) {
        return Err(AppError::Validation(format!(
            "You have already {} this {}",
            kind.verb(),
            target
        )));
    }

    opposite.retain(|id| id != user_id);
    chosen.push(user_id.to_string());

    Ok(())
}

/// Removes `user_id` from the set matching `kind`.
///
/// Fails when the user never cast that vote. Applied uniformly to posts and
/// comments.
pub(crate) fn retract(
    kind: VoteKind,
    target: &'static str,
    upvote: &mut Vec<String>,
    downvote: &mut Vec<String>,
    user_id: &str,
) -> Result<()> {
    let chosen = match kind {
        VoteKind::Up => upvote,
        VoteKind::Down => downvote,
    };

    if !chosen.iter().any(|id| id == user_id) {
        return Err(AppError::Validation(format!(
            "You have not {} this {}",
            kind.verb(),
            target
        )));
    }

    chosen.retain(|id| id != user_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sets() -> (Vec<String>, Vec<String>) {
        (Vec::new(), Vec::new())
    }

    #[test]
    fn upvote_then_downvote_switches_sets() {
        let (mut up, mut down) = sets();

        cast(VoteKind::Up, "post", &mut up, &mut down, "u1").unwrap();
        assert_eq!(up, vec!["u1"]);
        assert!(down.is_empty());

        cast(VoteKind::Down, "post", &mut up, &mut down, "u1").unwrap();
        assert!(up.is_empty());
        assert_eq!(down, vec!["u1"]);
    }

    #[test]
    fn double_upvote_is_rejected_and_sets_unchanged() {
        let (mut up, mut down) = sets();
        cast(VoteKind::Up, "post", &mut up, &mut down, "u1").unwrap();

        let err = cast(VoteKind::Up, "post", &mut up, &mut down, "u1").unwrap_err();
        assert!(err.to_string().contains("already upvoted"));
        assert_eq!(up, vec!["u1"]);
        assert!(down.is_empty());
    }

    #[test]
    fn retracting_a_vote_never_cast_is_rejected() {
        let (mut up, mut down) = sets();

        let err = retract(VoteKind::Up, "comment", &mut up, &mut down, "u1").unwrap_err();
        assert!(err.to_string().contains("have not upvoted"));

        cast(VoteKind::Down, "comment", &mut up, &mut down, "u1").unwrap();
        let err = retract(VoteKind::Up, "comment", &mut up, &mut down, "u1").unwrap_err();
        assert!(err.to_string().contains("have not upvoted"));
        assert_eq!(down, vec!["u1"]);
    }

    #[test]
    fn retract_removes_only_the_requested_user() {
        let (mut up, mut down) = sets();
        cast(VoteKind::Up, "post", &mut up, &mut down, "u1").unwrap();
        cast(VoteKind::Up, "post", &mut up, &mut down, "u2").unwrap();

        retract(VoteKind::Up, "post", &mut up, &mut down, "u1").unwrap();
        assert_eq!(up, vec!["u2"]);
    }

    #[test]
    fn votes_from_different_users_accumulate() {
        let (mut up, mut down) = sets();
        cast(VoteKind::Up, "post", &mut up, &mut down, "u1").unwrap();
        cast(VoteKind::Down, "post", &mut up, &mut down, "u2").unwrap();

        assert_eq!(up, vec!["u1"]);
        assert_eq!(down, vec!["u2"]);
    }

    proptest! {
        /// Mutual exclusion holds under any sequence of vote operations:
        /// no user id ever ends up in both sets, and no set holds duplicates.
        #[test]
        fn mutual_exclusion_holds_for_any_op_sequence(
            ops in prop::collection::vec((0u8..4, 0usize..4), 0..64)
        ) {
            let users = ["a", "b", "c", "d"];
            let (mut up, mut down) = sets();

            for (op, user) in ops {
                let user = users[user];
                let _ = match op {
                    0 => cast(VoteKind::Up, "post", &mut up, &mut down, user),
                    1 => cast(VoteKind::Down, "post", &mut up, &mut down, user),
                    2 => retract(VoteKind::Up, "post", &mut up, &mut down, user),
                    _ => retract(VoteKind::Down, "post", &mut up, &mut down, user),
                };

                for id in &up {
                    prop_assert!(!down.contains(id));
                }
                for user in users {
                    prop_assert!(up.iter().filter(|id| *id == user).count() <= 1);
                    prop_assert!(down.iter().filter(|id| *id == user).count() <= 1);
                }
            }
        }
    }
}
