use async_trait::async_trait;
use bson::{doc, DateTime};
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::IndexModel;

use crate::db::models::{parse_object_id, NotificationDocument};
use crate::error::AppError;
use crate::models::notification::{NewNotification, Notification};

/// Repository trait for the notification log.
///
/// Notifications are append-only; the only mutation is flipping `read`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Record a new unread notification stamped with the current time.
    async fn record(&self, notification: NewNotification) -> Result<Notification, AppError>;

    /// The most recent notifications, newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<Notification>, AppError>;

    /// Number of unread notifications.
    async fn count_unread(&self) -> Result<u64, AppError>;

    /// Mark one notification as read. Returns `None` if the id is unknown.
    async fn mark_read(&self, id: &str) -> Result<Option<Notification>, AppError>;

    /// Mark every unread notification as read, returning how many changed.
    async fn mark_all_read(&self) -> Result<u64, AppError>;
}

/// MongoDB implementation of the NotificationRepository.
pub struct MongoNotificationRepository {
    collection: mongodb::Collection<NotificationDocument>,
}

impl MongoNotificationRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("notifications"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        self.collection
            .create_index(IndexModel::builder().keys(doc! { "timestamp": -1 }).build())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for MongoNotificationRepository {
    async fn record(&self, notification: NewNotification) -> Result<Notification, AppError> {
        let doc = NotificationDocument::from_new(notification, DateTime::now());
        self.collection.insert_one(&doc).await?;
        Ok(doc.into())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Notification>, AppError> {
        // _id breaks ties between events recorded within the same millisecond
        let options = FindOptions::builder()
            .sort(doc! { "timestamp": -1, "_id": -1 })
            .limit(limit)
            .build();

        let docs: Vec<NotificationDocument> = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        Ok(docs.into_iter().map(Notification::from).collect())
    }

    async fn count_unread(&self) -> Result<u64, AppError> {
        Ok(self
            .collection
            .count_documents(doc! { "read": { "$ne": true } })
            .await?)
    }

    async fn mark_read(&self, id: &str) -> Result<Option<Notification>, AppError> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": { "read": true } })
            .with_options(options)
            .await?;

        Ok(updated.map(Notification::from))
    }

    async fn mark_all_read(&self) -> Result<u64, AppError> {
        let result = self
            .collection
            .update_many(doc! { "read": { "$ne": true } }, doc! { "$set": { "read": true } })
            .await?;
        Ok(result.modified_count)
    }
}
