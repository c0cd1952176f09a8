use async_trait::async_trait;
use bson::{doc, Bson, DateTime, Document};
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::IndexModel;

use crate::db::models::{parse_object_id, CommentDocument, LikeDocument, PostDocument};
use crate::error::AppError;
use crate::models::post::{Comment, Like, NewPost, Post, PostFilter, PostUpdate};

/// Repository trait for post storage.
///
/// Every engagement mutation is a single document-level update on the store
/// side, so concurrent likes, comments and view bumps never lose writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post. Fails with `Conflict` if the slug is taken.
    async fn insert(&self, post: NewPost) -> Result<Post, AppError>;

    /// Find a post by its id. Malformed ids yield `None`.
    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, AppError>;

    /// Find a post by slug, optionally restricted to published posts.
    async fn find_by_slug(
        &self,
        slug: &str,
        require_published: bool,
    ) -> Result<Option<Post>, AppError>;

    /// List published posts matching the filter, newest first.
    async fn list_published(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError>;

    /// List every post including drafts, newest first.
    async fn list_all(&self) -> Result<Vec<Post>, AppError>;

    /// Apply field changes. Returns the updated post, or `None` if the id is unknown.
    async fn update(&self, id: &str, update: PostUpdate) -> Result<Option<Post>, AppError>;

    /// Delete a post. Returns `false` if nothing was deleted.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;

    /// Atomically bump the view counter of a published post.
    async fn increment_views(&self, slug: &str) -> Result<Option<i64>, AppError>;

    /// Atomically append a like to a published post.
    async fn push_like(&self, slug: &str, like: Like) -> Result<Option<Post>, AppError>;

    /// Atomically append a comment to a published post.
    async fn push_comment(&self, slug: &str, comment: Comment) -> Result<Option<Post>, AppError>;

    /// Overwrite the comment list of a post, but only if it still equals
    /// `expected`. Returns `None` when the post is gone or its comments changed.
    async fn replace_comments(
        &self,
        slug: &str,
        expected: &[Comment],
        comments: Vec<Comment>,
    ) -> Result<Option<Post>, AppError>;
}

/// MongoDB implementation of the PostRepository.
pub struct MongoPostRepository {
    collection: mongodb::Collection<PostDocument>,
}

impl MongoPostRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("posts"),
        }
    }

    /// Create the unique slug index and the listing index.
    ///
    /// The slug index is sparse to match `slug_1` as earlier deployments
    /// created it; differing options would make index creation fail.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        let slug_index = IndexModel::builder()
            .keys(doc! { "slug": 1 })
            .options(IndexOptions::builder().unique(true).sparse(true).build())
            .build();
        let listing_index = IndexModel::builder()
            .keys(doc! { "published": 1, "createdAt": -1 })
            .build();

        self.collection
            .create_indexes([slug_index, listing_index])
            .await?;

        Ok(())
    }

    async fn find_sorted(&self, filter: Document) -> Result<Vec<Post>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .build();

        let docs: Vec<PostDocument> = self
            .collection
            .find(filter)
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        Ok(docs.into_iter().map(Post::from).collect())
    }

    async fn update_published(&self, slug: &str, update: Document) -> Result<Option<Post>, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(doc! { "slug": slug, "published": true }, update)
            .with_options(options)
            .await?;

        Ok(updated.map(Post::from))
    }
}

/// Server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn slug_conflict(slug: &str) -> AppError {
    AppError::Conflict(format!("A post with slug '{}' already exists", slug))
}

fn to_bson<T: serde::Serialize>(value: &T) -> Result<Bson, AppError> {
    bson::to_bson(value).map_err(|e| AppError::Internal(format!("BSON encoding failed: {}", e)))
}

/// Translate a `PostUpdate` into a MongoDB update document.
fn update_document(update: PostUpdate, now: DateTime) -> Document {
    let mut set = doc! { "updatedAt": now };
    let mut unset = Document::new();

    if let Some(title) = update.title {
        set.insert("title", title);
    }
    if let Some(slug) = update.slug {
        set.insert("slug", slug);
    }
    if let Some(excerpt) = update.excerpt {
        set.insert("excerpt", excerpt);
    }
    if let Some(body) = update.body {
        set.insert("body", body);
    }
    if let Some(author) = update.author {
        set.insert("author", author);
    }
    if let Some(tags) = update.tags {
        set.insert("tags", tags);
    }
    if let Some(featured_image) = update.featured_image {
        set.insert("featuredImage", featured_image);
    }
    if let Some(published) = update.published {
        set.insert("published", published);
    }
    if let Some(trending) = update.trending {
        set.insert("trending", trending);
    }
    match update.category {
        Some(Some(category)) => {
            set.insert("category", category);
        }
        Some(None) => {
            unset.insert("category", "");
        }
        None => {}
    }

    let mut update_doc = doc! { "$set": set };
    if !unset.is_empty() {
        update_doc.insert("$unset", unset);
    }
    update_doc
}

fn published_filter(filter: &PostFilter) -> Document {
    let mut query = doc! { "published": true };
    if filter.trending_only {
        query.insert("trending", true);
    } else if filter.exclude_trending {
        query.insert("trending", doc! { "$ne": true });
    }
    if let Some(category) = &filter.category {
        query.insert("category", category.as_str());
    }
    query
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn insert(&self, post: NewPost) -> Result<Post, AppError> {
        let doc = PostDocument::from_new(post, DateTime::now());

        match self.collection.insert_one(&doc).await {
            Ok(_) => Ok(doc.into()),
            Err(e) if is_duplicate_key(&e) => Err(slug_conflict(&doc.slug)),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, AppError> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };

        let found = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(found.map(Post::from))
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        require_published: bool,
    ) -> Result<Option<Post>, AppError> {
        let mut filter = doc! { "slug": slug };
        if require_published {
            filter.insert("published", true);
        }

        let found = self.collection.find_one(filter).await?;
        Ok(found.map(Post::from))
    }

    async fn list_published(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError> {
        self.find_sorted(published_filter(filter)).await
    }

    async fn list_all(&self) -> Result<Vec<Post>, AppError> {
        self.find_sorted(Document::new()).await
    }

    async fn update(&self, id: &str, update: PostUpdate) -> Result<Option<Post>, AppError> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };

        let new_slug = update.slug.clone();
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let result = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, update_document(update, DateTime::now()))
            .with_options(options)
            .await;

        match result {
            Ok(updated) => Ok(updated.map(Post::from)),
            Err(e) if is_duplicate_key(&e) => {
                Err(slug_conflict(new_slug.as_deref().unwrap_or_default()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(false);
        };

        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn increment_views(&self, slug: &str) -> Result<Option<i64>, AppError> {
        let updated = self
            .update_published(slug, doc! { "$inc": { "views": 1_i64 } })
            .await?;
        Ok(updated.map(|post| post.views))
    }

    async fn push_like(&self, slug: &str, like: Like) -> Result<Option<Post>, AppError> {
        let like = to_bson(&LikeDocument::from(&like))?;
        self.update_published(slug, doc! { "$push": { "likes": like } })
            .await
    }

    async fn push_comment(&self, slug: &str, comment: Comment) -> Result<Option<Post>, AppError> {
        let comment = to_bson(&CommentDocument::from(&comment))?;
        self.update_published(slug, doc! { "$push": { "comments": comment } })
            .await
    }

    async fn replace_comments(
        &self,
        slug: &str,
        expected: &[Comment],
        comments: Vec<Comment>,
    ) -> Result<Option<Post>, AppError> {
        let expected: Vec<CommentDocument> = expected.iter().map(CommentDocument::from).collect();
        let comments: Vec<CommentDocument> = comments.iter().map(CommentDocument::from).collect();

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        // Whole-array equality makes this a compare-and-set on the comment list.
        let filter = doc! { "slug": slug, "comments": to_bson(&expected)? };
        let update = doc! {
            "$set": { "comments": to_bson(&comments)?, "updatedAt": DateTime::now() }
        };

        let updated = self
            .collection
            .find_one_and_update(filter, update)
            .with_options(options)
            .await?;

        Ok(updated.map(Post::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_document_sets_only_present_fields() {
        let update = PostUpdate {
            title: Some("New Title".to_string()),
            slug: Some("new-title".to_string()),
            published: Some(true),
            ..Default::default()
        };

        let doc = update_document(update, DateTime::now());
        let set = doc.get_document("$set").unwrap();
        assert_eq!(set.get_str("title").unwrap(), "New Title");
        assert_eq!(set.get_str("slug").unwrap(), "new-title");
        assert!(set.get_bool("published").unwrap());
        assert!(set.get_datetime("updatedAt").is_ok());
        assert!(!set.contains_key("body"));
        assert!(!set.contains_key("excerpt"));
        assert!(!doc.contains_key("$unset"));
    }

    #[test]
    fn test_update_document_clears_category() {
        let update = PostUpdate {
            category: Some(None),
            ..Default::default()
        };

        let doc = update_document(update, DateTime::now());
        assert!(doc.get_document("$unset").unwrap().contains_key("category"));
        assert!(!doc.get_document("$set").unwrap().contains_key("category"));
    }

    #[test]
    fn test_published_filter() {
        let filter = published_filter(&PostFilter::default());
        assert_eq!(filter, doc! { "published": true });

        let filter = published_filter(&PostFilter {
            trending_only: true,
            category: Some("life".to_string()),
            ..Default::default()
        });
        assert_eq!(
            filter,
            doc! { "published": true, "trending": true, "category": "life" }
        );

        let filter = published_filter(&PostFilter {
            exclude_trending: true,
            ..Default::default()
        });
        assert_eq!(
            filter,
            doc! { "published": true, "trending": { "$ne": true } }
        );
    }
}
