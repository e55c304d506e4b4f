use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::common::{Extra, Label};

// ---------------------------------------------------------------------------
// Story enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryType {
    Feature,
    Bug,
    Chore,
    Release,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryState {
    Unscheduled,
    Unstarted,
    Planned,
    Started,
    Finished,
    Delivered,
    Accepted,
    Rejected,
    #[serde(other)]
    Unknown,
}

// ---------------------------------------------------------------------------
// Story
// ---------------------------------------------------------------------------

/// A story as sent to or returned by Tracker.
///
/// Every member is optional so the same type serves as a creation payload
/// (`name` and friends only) and as a full server representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Story {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_type: Option<StoryType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_state: Option<StoryState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_ids: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<Label>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Story {
    /// A minimal creation payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_type(mut self, story_type: StoryType) -> Self {
        self.story_type = Some(story_type);
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Label::named).collect());
        self
    }

    /// Names of the attached labels, in server order.
    pub fn label_names(&self) -> Vec<&str> {
        self.labels
            .iter()
            .flatten()
            .map(|l| l.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn creation_payload_only_serializes_set_fields() {
        let story = Story::new("Fix login")
            .with_type(StoryType::Bug)
            .with_labels(["auth"]);
        let value = serde_json::to_value(&story).unwrap();
        assert_eq!(
            value,
            json!({"name": "Fix login", "story_type": "bug", "labels": [{"name": "auth"}]})
        );
    }

    #[test]
    fn unknown_fields_are_kept_in_extra() {
        let story: Story = serde_json::from_value(json!({
            "id": 1,
            "name": "Ship it",
            "current_state": "started",
            "follower_ids": [4, 5]
        }))
        .unwrap();
        assert_eq!(story.current_state, Some(StoryState::Started));
        assert_eq!(story.extra.get("follower_ids"), Some(&json!([4, 5])));
    }

    #[test]
    fn unrecognised_state_maps_to_unknown() {
        let story: Story = serde_json::from_value(json!({"current_state": "archived"})).unwrap();
        assert_eq!(story.current_state, Some(StoryState::Unknown));
    }

    #[test]
    fn label_names_in_order() {
        let story: Story = serde_json::from_value(json!({
            "labels": [{"id": 1, "name": "bug"}, {"id": 2, "name": "urgent"}]
        }))
        .unwrap();
        assert_eq!(story.label_names(), vec!["bug", "urgent"]);
    }
}
