use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::models::notification::{NewNotification, Notification, NotificationKind};
use crate::models::post::{Comment, Like, NewPost, Post};

/// A post as stored in the `posts` collection.
///
/// Field names on disk are camelCase so documents written by earlier
/// deployments of the blog deserialize unchanged. Engagement fields may be
/// missing on old documents and default to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    pub body: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured_image: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub trending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub likes: Vec<LikeDocument>,
    #[serde(default)]
    pub comments: Vec<CommentDocument>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeDocument {
    pub name: String,
    pub timestamp: DateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentDocument {
    pub name: String,
    pub comment: String,
    pub timestamp: DateTime,
}

impl PostDocument {
    /// Build the document for a freshly created post.
    pub fn from_new(post: NewPost, now: DateTime) -> Self {
        Self {
            id: ObjectId::new(),
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            body: post.body,
            author: post.author,
            tags: post.tags,
            featured_image: post.featured_image,
            published: post.published,
            trending: post.trending,
            category: post.category,
            views: 0,
            likes: vec![],
            comments: vec![],
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<PostDocument> for Post {
    fn from(doc: PostDocument) -> Self {
        Post {
            id: doc.id.to_hex(),
            title: doc.title,
            slug: doc.slug,
            excerpt: doc.excerpt,
            body: doc.body,
            author: doc.author,
            tags: doc.tags,
            featured_image: doc.featured_image,
            published: doc.published,
            trending: doc.trending,
            category: doc.category,
            views: doc.views,
            likes: doc.likes.into_iter().map(Like::from).collect(),
            comments: doc.comments.into_iter().map(Comment::from).collect(),
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
        }
    }
}

impl From<LikeDocument> for Like {
    fn from(doc: LikeDocument) -> Self {
        Like {
            name: doc.name,
            timestamp: doc.timestamp.to_chrono(),
        }
    }
}

impl From<&Like> for LikeDocument {
    fn from(like: &Like) -> Self {
        LikeDocument {
            name: like.name.clone(),
            timestamp: DateTime::from_chrono(like.timestamp),
        }
    }
}

impl From<CommentDocument> for Comment {
    fn from(doc: CommentDocument) -> Self {
        Comment {
            name: doc.name,
            comment: doc.comment,
            timestamp: doc.timestamp.to_chrono(),
        }
    }
}

impl From<&Comment> for CommentDocument {
    fn from(comment: &Comment) -> Self {
        CommentDocument {
            name: comment.name.clone(),
            comment: comment.comment.clone(),
            timestamp: DateTime::from_chrono(comment.timestamp),
        }
    }
}

/// A notification as stored in the `notifications` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub post_title: String,
    pub post_slug: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub read: bool,
    pub timestamp: DateTime,
}

impl NotificationDocument {
    /// Build the document for a new, unread notification.
    pub fn from_new(notification: NewNotification, now: DateTime) -> Self {
        Self {
            id: ObjectId::new(),
            kind: notification.kind,
            post_title: notification.post_title,
            post_slug: notification.post_slug,
            user_name: notification.user_name,
            comment: notification.comment,
            read: false,
            timestamp: now,
        }
    }
}

impl From<NotificationDocument> for Notification {
    fn from(doc: NotificationDocument) -> Self {
        Notification {
            id: doc.id.to_hex(),
            kind: doc.kind,
            post_title: doc.post_title,
            post_slug: doc.post_slug,
            user_name: doc.user_name,
            comment: doc.comment,
            read: doc.read,
            timestamp: doc.timestamp.to_chrono(),
        }
    }
}

/// Parse a hex id coming from a URL. Malformed ids cannot match any stored
/// document, so they are reported as `None` rather than as an error.
pub fn parse_object_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}
