use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::activity_log_error::ActivityLogError;

/// Closed set of user actions the log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    View,
    Select,
    Purchase,
    RemoveFromCart,
    #[serde(alias = "favorite")]
    Favourite,
    Search,
}

impl ActivityType {
    pub const ALL: [ActivityType; 6] = [
        ActivityType::View,
        ActivityType::Select,
        ActivityType::Purchase,
        ActivityType::RemoveFromCart,
        ActivityType::Favourite,
        ActivityType::Search,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::View => "view",
            ActivityType::Select => "select",
            ActivityType::Purchase => "purchase",
            ActivityType::RemoveFromCart => "remove_from_cart",
            ActivityType::Favourite => "favourite",
            ActivityType::Search => "search",
        }
    }

    /// Rank of this type's group in the interaction list (lower comes first).
    /// `None` for types that never contribute to the list.
    pub fn priority(self) -> Option<u8> {
        match self {
            ActivityType::Select => Some(0),
            ActivityType::Favourite => Some(1),
            ActivityType::View => Some(2),
            ActivityType::Search => Some(3),
            ActivityType::Purchase | ActivityType::RemoveFromCart => None,
        }
    }
}

impl FromStr for ActivityType {
    type Err = ActivityLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "view" => Ok(ActivityType::View),
            "select" => Ok(ActivityType::Select),
            "purchase" => Ok(ActivityType::Purchase),
            "remove_from_cart" => Ok(ActivityType::RemoveFromCart),
            "favourite" | "favorite" => Ok(ActivityType::Favourite),
            "search" => Ok(ActivityType::Search),
            _ => Err(ActivityLogError::UnknownActivityType(s.to_string())),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_every_label() {
        for t in ActivityType::ALL {
            assert_eq!(t.as_str().parse::<ActivityType>().unwrap(), t);
        }
        assert_eq!(" Favorite ".parse::<ActivityType>().unwrap(), ActivityType::Favourite);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "like".parse::<ActivityType>().unwrap_err();
        assert!(matches!(err, ActivityLogError::UnknownActivityType(s) if s == "like"));
    }

    #[test]
    fn priority_orders_select_first() {
        let mut ranked: Vec<ActivityType> = ActivityType::ALL
            .into_iter()
            .filter(|t| t.priority().is_some())
            .collect();
        ranked.sort_by_key(|t| t.priority());
        assert_eq!(
            ranked,
            vec![
                ActivityType::Select,
                ActivityType::Favourite,
                ActivityType::View,
                ActivityType::Search
            ]
        );
    }
}
