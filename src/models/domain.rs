use serde::{Deserialize, Serialize};
use mongodb::bson::{oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string};

// Logged-in user as resolved by the auth extractor
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub first_name: String,
}

/// Cross-user view of a user: only the safe fields are ever loaded.
///
/// `bio` is populated only where the query asked for it, and omitted from the
/// JSON otherwise.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Ignored,
    Interested,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Ignored => "ignored",
            ConnectionStatus::Interested => "interested",
            ConnectionStatus::Accepted => "accepted",
            ConnectionStatus::Rejected => "rejected",
        }
    }
}

// Stored shape of the connectionrequests collection
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub from_user_id: ObjectId,
    pub to_user_id: ObjectId,
    pub status: ConnectionStatus,
}

// Only the two endpoints; used to build the feed exclusion set
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEdge {
    #[serde(default)]
    pub from_user_id: Option<ObjectId>,
    #[serde(default)]
    pub to_user_id: Option<ObjectId>,
}

/// A pending request with the sender's profile attached in place of the raw id.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedRequest {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    pub from_user_id: Option<UserProfile>,
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub to_user_id: ObjectId,
    pub status: ConnectionStatus,
}

/// An accepted connection with both sides populated.
#[derive(Debug, Clone)]
pub struct PopulatedConnection {
    pub from_user_id: ObjectId,
    pub from_user: Option<UserProfile>,
    pub to_user: Option<UserProfile>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: ObjectId,
}

// Envelope shared by every endpoint
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Raw feed query values. When a key repeats, the first occurrence wins.
#[derive(Debug, Default, PartialEq)]
pub struct FeedQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl FeedQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = FeedQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut query.page,
                "limit" => &mut query.limit,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}
