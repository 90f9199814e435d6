//! Fixed reward table for the periodic training cycle.

use activity_log::ActivityType;

/// Reward for a user's most recent activity. No activity scores 0.
pub fn reward_for(activity: Option<ActivityType>) -> f32 {
    match activity {
        Some(ActivityType::Favourite) => 3.0,
        Some(ActivityType::Select) => 2.0,
        Some(ActivityType::View) => 1.0,
        Some(ActivityType::RemoveFromCart) => -1.0,
        Some(ActivityType::Search) | Some(ActivityType::Purchase) | None => 0.0,
    }
}
