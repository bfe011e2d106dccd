//! Profile statistics
use serde::{Deserialize, Serialize};

use crate::matching::{Match, matches_for_user};
use crate::user::SessionUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfileStats {
    pub total_matches: usize,
    pub total_posts: usize,
    pub quests_completed: usize,
}

impl ProfileStats {
    #[must_use]
    pub fn compute(user: &SessionUser, matches: &[Match]) -> Self {
        let own = matches_for_user(matches, &user.uid);
        Self {
            total_matches: own.len(),
            total_posts: user.my_posts.len(),
            quests_completed: own.iter().map(|m| m.completed_quests()).sum(),
        }
    }
}
