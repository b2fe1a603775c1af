//! Schema types for the cached EventSub listing and user records.
//!
//! Decoding is lenient: unknown fields are ignored and missing fields take
//! their default value. `null` arrays (as written by older tooling) decode as
//! empty lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// EventSub type emitted when a broadcaster goes live.
pub const STREAM_ONLINE: &str = "stream.online";
/// EventSub type emitted when a broadcaster ends a stream.
pub const STREAM_OFFLINE: &str = "stream.offline";

/// One webhook registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    pub id: String,
    /// e.g. `enabled`, `webhook_callback_verification_pending`; kept opaque.
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub cost: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub condition: Condition,
    pub transport: Transport,
}

impl Subscription {
    pub fn broadcaster_id(&self) -> &str {
        &self.condition.broadcaster_user_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub broadcaster_user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transport {
    pub method: String,
    pub callback: String,
}

/// Pagination cursor returned with a listing. Stored, never followed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub cursor: String,
}

/// Full `eventsub/subscriptions` listing as captured in `subs.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionSnapshot {
    #[serde(deserialize_with = "null_as_empty")]
    pub data: Vec<Subscription>,
    pub pagination: Pagination,
    /// Reported by the API; not checked against `data.len()`.
    pub total: i64,
}

/// A broadcaster/account record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub login: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub broadcaster_type: String,
    pub description: String,
    pub profile_image_url: String,
    pub offline_image_url: String,
    pub view_count: i64,
    pub email: String,
}

impl User {
    /// True for the default sentinel returned by lookups that found nothing.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

/// Response body of `api get users`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserResponse {
    #[serde(deserialize_with = "null_as_empty")]
    pub data: Vec<User>,
}

/// Persisted user directory, stored as `{ "Users": [...] }` in `users.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserDirectory {
    #[serde(rename = "Users", deserialize_with = "null_as_empty")]
    pub users: Vec<User>,
}

impl UserDirectory {
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn find_by_login(&self, login: &str) -> Option<&User> {
        self.users.iter().find(|u| u.login == login)
    }

    /// Insert users, replacing any existing entry with the same id.
    pub fn upsert(&mut self, users: impl IntoIterator<Item = User>) {
        for user in users {
            match self.users.iter_mut().find(|u| u.id == user.id) {
                Some(existing) => *existing = user,
                None => self.users.push(user),
            }
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
