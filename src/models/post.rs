use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A blog post as exposed through the API.
///
/// Field names follow the JSON shape the blog front end consumes
/// (`_id`, `featuredImage`, `createdAt`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Hex-encoded ObjectId.
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    /// URL-safe identifier derived from the title; unique across posts.
    pub slug: String,
    pub excerpt: String,
    /// Markdown body.
    pub body: String,
    pub author: String,
    pub tags: Vec<String>,
    pub featured_image: String,
    /// Only published posts are reachable through public read paths.
    pub published: bool,
    /// Trending posts are featured on the home page.
    pub trending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub views: i64,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub name: String,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
}

/// A fully resolved post ready to be inserted.
///
/// Slug, excerpt and defaults are already applied; the repository only assigns
/// the id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub body: String,
    pub author: String,
    pub tags: Vec<String>,
    pub featured_image: String,
    pub published: bool,
    pub trending: bool,
    pub category: Option<String>,
}

/// Field changes for an existing post. `None` leaves the field untouched.
///
/// `category: Some(None)` clears the category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub published: Option<bool>,
    pub trending: Option<bool>,
    pub category: Option<Option<String>>,
}

/// Filter for the public post listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    /// Only posts flagged as trending.
    pub trending_only: bool,
    /// Only posts not flagged as trending.
    pub exclude_trending: bool,
    pub category: Option<String>,
}

impl PostFilter {
    /// Whether a published post passes this filter.
    pub fn matches(&self, post: &Post) -> bool {
        if self.trending_only && !post.trending {
            return false;
        }
        if self.exclude_trending && post.trending {
            return false;
        }
        match &self.category {
            Some(category) => post.category.as_deref() == Some(category.as_str()),
            None => true,
        }
    }
}
