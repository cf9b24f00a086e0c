use anyhow::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{FindOneOptions, FindOptions},
};
use std::collections::{HashMap, HashSet};

use crate::db::{connection, DatabaseConnection};
use crate::models::{
    Connection, ConnectionEdge, ConnectionStatus, PopulatedConnection, ReceivedRequest, Session,
    User, UserProfile,
};
use crate::utils::Pagination;

/// Read side of the social graph used by the user endpoints.
#[async_trait]
pub trait SocialStore: Send + Sync {
    /// Resolve a session token to its user, if both still exist
    async fn find_session_user(&self, token: &str) -> Result<Option<User>>;

    /// Pending (`interested`) requests addressed to `user_id`, sender populated with bio
    async fn received_requests(&self, user_id: &ObjectId) -> Result<Vec<ReceivedRequest>>;

    /// Accepted connections in either direction, both sides populated without bio
    async fn accepted_connections(&self, user_id: &ObjectId) -> Result<Vec<PopulatedConnection>>;

    /// Endpoints of every connection record involving `user_id`, any status
    async fn connection_edges(&self, user_id: &ObjectId) -> Result<Vec<ConnectionEdge>>;

    /// One page of users outside `excluded`, in natural order, without bio.
    /// Fails when the pagination resolves to a negative skip.
    async fn feed_users(
        &self,
        excluded: &HashSet<ObjectId>,
        pagination: Pagination,
    ) -> Result<Vec<UserProfile>>;
}

/// Projection for the safe profile fields.
pub fn safe_projection(with_bio: bool) -> Document {
    let mut projection = doc! {
        "firstName": 1,
        "lastName": 1,
        "gender": 1,
        "skills": 1,
        "profilePicture": 1,
    };
    if with_bio {
        projection.insert("bio", 1);
    }
    projection
}

/// Every user id related to `user_id` by any record, plus `user_id` itself.
pub fn feed_exclusion_set(user_id: &ObjectId, edges: &[ConnectionEdge]) -> HashSet<ObjectId> {
    let mut hidden: HashSet<ObjectId> = edges
        .iter()
        .flat_map(|edge| [edge.from_user_id, edge.to_user_id])
        .flatten()
        .collect();
    hidden.insert(*user_id);
    hidden
}

/// Maps each accepted connection to the party that is not `user_id`.
///
/// Rows whose counterpart could not be populated are dropped.
pub fn connection_counterparts(
    user_id: &ObjectId,
    rows: Vec<PopulatedConnection>,
) -> Vec<UserProfile> {
    rows.into_iter()
        .filter_map(|row| {
            let counterpart = if row.from_user_id == *user_id {
                row.to_user
            } else {
                row.from_user
            };
            if counterpart.is_none() {
                tracing::warn!(%user_id, "skipping connection whose counterpart no longer exists");
            }
            counterpart
        })
        .collect()
}

pub struct MongoSocialService {
    db: DatabaseConnection,
}

impl MongoSocialService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_profiles(
        &self,
        ids: Vec<ObjectId>,
        with_bio: bool,
    ) -> Result<HashMap<ObjectId, UserProfile>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let collection = self.db.get_collection::<UserProfile>(connection::USERS);
        let options = FindOptions::builder()
            .projection(safe_projection(with_bio))
            .build();

        let cursor = collection
            .find(doc! { "_id": { "$in": ids } }, options)
            .await?;
        let profiles: Vec<UserProfile> = cursor.try_collect().await?;

        Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
    }
}

#[async_trait]
impl SocialStore for MongoSocialService {
    async fn find_session_user(&self, token: &str) -> Result<Option<User>> {
        let sessions = self.db.get_collection::<Session>(connection::SESSIONS);
        let Some(session) = sessions.find_one(doc! { "token": token }, None).await? else {
            return Ok(None);
        };

        let users = self.db.get_collection::<User>(connection::USERS);
        let options = FindOneOptions::builder()
            .projection(doc! { "firstName": 1 })
            .build();
        let user = users
            .find_one(doc! { "_id": session.user_id }, options)
            .await?;

        Ok(user)
    }

    async fn received_requests(&self, user_id: &ObjectId) -> Result<Vec<ReceivedRequest>> {
        let collection = self
            .db
            .get_collection::<Connection>(connection::CONNECTION_REQUESTS);
        let filter = doc! {
            "toUserId": *user_id,
            "status": ConnectionStatus::Interested.as_str(),
        };

        let cursor = collection.find(filter, None).await?;
        let requests: Vec<Connection> = cursor.try_collect().await?;

        let sender_ids = requests.iter().map(|r| r.from_user_id).collect();
        let senders = self.load_profiles(sender_ids, true).await?;

        Ok(requests
            .into_iter()
            .map(|request| ReceivedRequest {
                id: request.id,
                from_user_id: senders.get(&request.from_user_id).cloned(),
                to_user_id: request.to_user_id,
                status: request.status,
            })
            .collect())
    }

    async fn accepted_connections(&self, user_id: &ObjectId) -> Result<Vec<PopulatedConnection>> {
        let collection = self
            .db
            .get_collection::<Connection>(connection::CONNECTION_REQUESTS);
        let accepted = ConnectionStatus::Accepted.as_str();
        let filter = doc! {
            "$or": [
                { "toUserId": *user_id, "status": accepted },
                { "fromUserId": *user_id, "status": accepted },
            ]
        };

        let cursor = collection.find(filter, None).await?;
        let rows: Vec<Connection> = cursor.try_collect().await?;

        let ids: HashSet<ObjectId> = rows
            .iter()
            .flat_map(|row| [row.from_user_id, row.to_user_id])
            .collect();
        let profiles = self.load_profiles(ids.into_iter().collect(), false).await?;

        Ok(rows
            .into_iter()
            .map(|row| PopulatedConnection {
                from_user_id: row.from_user_id,
                from_user: profiles.get(&row.from_user_id).cloned(),
                to_user: profiles.get(&row.to_user_id).cloned(),
            })
            .collect())
    }

    async fn connection_edges(&self, user_id: &ObjectId) -> Result<Vec<ConnectionEdge>> {
        let collection = self
            .db
            .get_collection::<ConnectionEdge>(connection::CONNECTION_REQUESTS);
        let filter = doc! {
            "$or": [
                { "fromUserId": *user_id },
                { "toUserId": *user_id },
            ]
        };
        let options = FindOptions::builder()
            .projection(doc! { "fromUserId": 1, "toUserId": 1 })
            .build();

        let cursor = collection.find(filter, options).await?;
        let edges: Vec<ConnectionEdge> = cursor.try_collect().await?;

        Ok(edges)
    }

    async fn feed_users(
        &self,
        excluded: &HashSet<ObjectId>,
        pagination: Pagination,
    ) -> Result<Vec<UserProfile>> {
        let collection = self.db.get_collection::<UserProfile>(connection::USERS);
        let excluded: Vec<ObjectId> = excluded.iter().copied().collect();

        // A negative limit is passed through: the driver turns it into one batch
        let options = FindOptions::builder()
            .projection(safe_projection(false))
            .skip(pagination.skip()?)
            .limit(pagination.limit)
            .build();

        let cursor = collection
            .find(doc! { "_id": { "$nin": excluded } }, options)
            .await?;
        let users: Vec<UserProfile> = cursor.try_collect().await?;

        Ok(users)
    }
}
