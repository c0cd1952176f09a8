use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::post::Post;

/// Kind of engagement event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Comment,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Like => write!(f, "like"),
            NotificationKind::Comment => write!(f, "comment"),
        }
    }
}

/// A recorded like/comment event shown on the admin dashboard.
///
/// `post_title` and `post_slug` are copied from the post when the event is
/// recorded; they are not kept in sync with later edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub post_title: String,
    pub post_slug: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub read: bool,
    pub timestamp: DateTime<Utc>,
}

/// A notification about to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub post_title: String,
    pub post_slug: String,
    pub user_name: String,
    pub comment: Option<String>,
}

impl NewNotification {
    pub fn like(post: &Post, user_name: &str) -> Self {
        Self {
            kind: NotificationKind::Like,
            post_title: post.title.clone(),
            post_slug: post.slug.clone(),
            user_name: user_name.to_string(),
            comment: None,
        }
    }

    pub fn comment(post: &Post, user_name: &str, comment: &str) -> Self {
        Self {
            kind: NotificationKind::Comment,
            post_title: post.title.clone(),
            post_slug: post.slug.clone(),
            user_name: user_name.to_string(),
            comment: Some(comment.to_string()),
        }
    }
}
