// Event domain types
//
// These types represent the Event entity, the sole record users manage.
// Used by the action layer, the storage backends and the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Sport types offered by the event form and the category filter.
/// Stored as free text, so values outside this list are still accepted.
pub const SPORT_TYPES: &[&str] = &[
    "Soccer",
    "Basketball",
    "Tennis",
    "Baseball",
    "Football",
    "Hockey",
    "Golf",
    "Swimming",
    "Volleyball",
    "Cricket",
    "Rugby",
    "Boxing",
    "MMA",
    "Athletics",
    "Other",
];

/// Category filter value meaning "no sport type filter"
pub const ALL_SPORTS: &str = "all";

/// Check whether a sport type is one of the offered categories
pub fn is_known_sport_type(value: &str) -> bool {
    SPORT_TYPES.contains(&value)
}

/// Event - a sports event owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Event {
    pub id: Uuid,
    /// Owner of the event; never taken from caller input
    pub user_id: Uuid,
    pub name: String,
    pub sport_type: String,
    pub date_time: DateTime<Utc>,
    pub description: Option<String>,
    pub venues: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated, caller-editable fields of an event
#[derive(Debug, Clone, PartialEq)]
pub struct EventFields {
    pub name: String,
    pub sport_type: String,
    pub date_time: DateTime<Utc>,
    pub description: Option<String>,
    pub venues: Vec<String>,
}

/// Input for inserting a new event row
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub user_id: Uuid,
    pub fields: EventFields,
}

/// Validated list filter
///
/// `None` means "do not filter on this column".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub search: Option<String>,
    pub sport_type: Option<String>,
}

impl EventQuery {
    /// Check whether an event passes this filter (case-insensitive name substring
    /// plus exact sport type)
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(search) = &self.search {
            if !event
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if let Some(sport_type) = &self.sport_type {
            if &event.sport_type != sport_type {
                return false;
            }
        }
        true
    }
}

/// Payload returned by the delete action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DeletedEvent {
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(name: &str, sport_type: &str) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::now_v7(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            sport_type: sport_type.to_string(),
            date_time: now,
            description: None,
            venues: vec!["Main Stadium".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_known_sport_types() {
        assert!(is_known_sport_type("Soccer"));
        assert!(is_known_sport_type("MMA"));
        assert!(!is_known_sport_type("soccer"));
        assert!(!is_known_sport_type(ALL_SPORTS));
    }

    #[test]
    fn test_query_matches_name_case_insensitively() {
        let event = sample_event("City Derby Final", "Soccer");
        let query = EventQuery {
            search: Some("derby".to_string()),
            sport_type: None,
        };
        assert!(query.matches(&event));

        let query = EventQuery {
            search: Some("league".to_string()),
            sport_type: None,
        };
        assert!(!query.matches(&event));
    }

    #[test]
    fn test_query_matches_sport_type_exactly() {
        let event = sample_event("Open", "Tennis");
        assert!(EventQuery::default().matches(&event));
        assert!(EventQuery {
            search: None,
            sport_type: Some("Tennis".to_string()),
        }
        .matches(&event));
        assert!(!EventQuery {
            search: None,
            sport_type: Some("tennis".to_string()),
        }
        .matches(&event));
    }

    #[test]
    fn test_event_serializes_owner_as_user_id() {
        let event = sample_event("Marathon", "Athletics");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["user_id"], Uuid::nil().to_string());
        assert_eq!(json["venues"][0], "Main Stadium");
        assert!(json["description"].is_null());
    }
}
