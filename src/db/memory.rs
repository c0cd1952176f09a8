//! In-memory repository doubles for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;

use crate::db::health::DatabaseHealth;
use crate::db::notification_repository::NotificationRepository;
use crate::db::post_repository::PostRepository;
use crate::db::settings_repository::{SettingsRepository, SiteSettings};
use crate::error::AppError;
use crate::models::notification::{NewNotification, Notification};
use crate::models::post::{Comment, Like, NewPost, Post, PostFilter, PostUpdate};

#[derive(Default)]
pub struct MemoryPostRepository {
    posts: Mutex<Vec<Post>>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
        // Stable sort keeps later inserts first on equal timestamps after the reverse
        posts.reverse();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    fn mutate_published<F>(&self, slug: &str, f: F) -> Option<Post>
    where
        F: FnOnce(&mut Post),
    {
        let mut posts = self.posts.lock().unwrap();
        let post = posts.iter_mut().find(|p| p.slug == slug && p.published)?;
        f(post);
        Some(post.clone())
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn insert(&self, post: NewPost) -> Result<Post, AppError> {
        let mut posts = self.posts.lock().unwrap();
        if posts.iter().any(|p| p.slug == post.slug) {
            return Err(AppError::Conflict(format!(
                "A post with slug '{}' already exists",
                post.slug
            )));
        }

        let now = Utc::now();
        let stored = Post {
            id: ObjectId::new().to_hex(),
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
        };
        posts.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, AppError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        require_published: bool,
    ) -> Result<Option<Post>, AppError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.slug == slug && (p.published || !require_published))
            .cloned())
    }

    async fn list_published(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError> {
        let posts = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.published && filter.matches(p))
            .cloned()
            .collect();
        Ok(Self::newest_first(posts))
    }

    async fn list_all(&self) -> Result<Vec<Post>, AppError> {
        let posts = self.posts.lock().unwrap().clone();
        Ok(Self::newest_first(posts))
    }

    async fn update(&self, id: &str, update: PostUpdate) -> Result<Option<Post>, AppError> {
        let mut posts = self.posts.lock().unwrap();

        if let Some(slug) = &update.slug {
            if posts.iter().any(|p| &p.slug == slug && p.id != id) {
                return Err(AppError::Conflict(format!(
                    "A post with slug '{}' already exists",
                    slug
                )));
            }
        }

        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if let Some(v) = update.title {
            post.title = v;
        }
        if let Some(v) = update.slug {
            post.slug = v;
        }
        if let Some(v) = update.excerpt {
            post.excerpt = v;
        }
        if let Some(v) = update.body {
            post.body = v;
        }
        if let Some(v) = update.author {
            post.author = v;
        }
        if let Some(v) = update.tags {
            post.tags = v;
        }
        if let Some(v) = update.featured_image {
            post.featured_image = v;
        }
        if let Some(v) = update.published {
            post.published = v;
        }
        if let Some(v) = update.trending {
            post.trending = v;
        }
        if let Some(v) = update.category {
            post.category = v;
        }
        post.updated_at = Utc::now();

        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }

    async fn increment_views(&self, slug: &str) -> Result<Option<i64>, AppError> {
        Ok(self
            .mutate_published(slug, |p| p.views += 1)
            .map(|p| p.views))
    }

    async fn push_like(&self, slug: &str, like: Like) -> Result<Option<Post>, AppError> {
        Ok(self.mutate_published(slug, |p| p.likes.push(like)))
    }

    async fn push_comment(&self, slug: &str, comment: Comment) -> Result<Option<Post>, AppError> {
        Ok(self.mutate_published(slug, |p| p.comments.push(comment)))
    }

    async fn replace_comments(
        &self,
        slug: &str,
        expected: &[Comment],
        comments: Vec<Comment>,
    ) -> Result<Option<Post>, AppError> {
        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts
            .iter_mut()
            .find(|p| p.slug == slug && p.comments == expected)
        else {
            return Ok(None);
        };
        post.comments = comments;
        Ok(Some(post.clone()))
    }
}

#[derive(Default)]
pub struct MemoryNotificationRepository {
    notifications: Mutex<Vec<Notification>>,
}

impl MemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn record(&self, notification: NewNotification) -> Result<Notification, AppError> {
        let stored = Notification {
            id: ObjectId::new().to_hex(),
            kind: notification.kind,
            post_title: notification.post_title,
            post_slug: notification.post_slug,
            user_name: notification.user_name,
            comment: notification.comment,
            read: false,
            timestamp: Utc::now(),
        };
        self.notifications.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Notification>, AppError> {
        let mut all = self.notifications.lock().unwrap().clone();
        all.reverse();
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        all.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(all)
    }

    async fn count_unread(&self) -> Result<u64, AppError> {
        Ok(self
            .notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| !n.read)
            .count() as u64)
    }

    async fn mark_read(&self, id: &str) -> Result<Option<Notification>, AppError> {
        let mut all = self.notifications.lock().unwrap();
        Ok(all.iter_mut().find(|n| n.id == id).map(|n| {
            n.read = true;
            n.clone()
        }))
    }

    async fn mark_all_read(&self) -> Result<u64, AppError> {
        let mut all = self.notifications.lock().unwrap();
        let mut changed = 0;
        for n in all.iter_mut().filter(|n| !n.read) {
            n.read = true;
            changed += 1;
        }
        Ok(changed)
    }
}

#[derive(Default)]
pub struct MemorySettingsRepository {
    settings: Mutex<Option<SiteSettings>>,
}

#[async_trait]
impl SettingsRepository for MemorySettingsRepository {
    async fn get_settings(&self) -> Result<SiteSettings, AppError> {
        Ok(self
            .settings
            .lock()
            .unwrap()
            .get_or_insert_with(SiteSettings::default)
            .clone())
    }

    async fn set_trending_text(&self, text: &str) -> Result<SiteSettings, AppError> {
        let mut settings = self.settings.lock().unwrap();
        let current = settings.get_or_insert_with(SiteSettings::default);
        current.trending_text = text.to_string();
        Ok(current.clone())
    }
}

pub struct AlwaysHealthy;

#[async_trait]
impl DatabaseHealth for AlwaysHealthy {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
