use async_trait::async_trait;
use bson::{doc, Document};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::IndexModel;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Tagline shown on the home page until the admin changes it.
pub const DEFAULT_TRENDING_TEXT: &str = "Raw thoughts, unfiltered stories, and real reflections on life, growth, and everything in between.";

/// Site-wide settings stored in MongoDB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    /// Settings document key (always "global").
    pub key: String,
    /// Home page tagline.
    #[serde(default = "default_trending_text")]
    pub trending_text: String,
}

fn default_trending_text() -> String {
    DEFAULT_TRENDING_TEXT.to_string()
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            key: "global".to_string(),
            trending_text: default_trending_text(),
        }
    }
}

/// Repository trait for site settings.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Get the global settings, creating the document with defaults on first read.
    async fn get_settings(&self) -> Result<SiteSettings, AppError>;

    /// Update the home page tagline, creating the document if needed.
    async fn set_trending_text(&self, text: &str) -> Result<SiteSettings, AppError>;
}

/// MongoDB implementation of the SettingsRepository.
pub struct MongoSettingsRepository {
    collection: mongodb::Collection<SiteSettings>,
    /// Keyless singleton written by earlier deployments of the blog.
    legacy: mongodb::Collection<Document>,
}

impl MongoSettingsRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("settings"),
            legacy: db.collection("sitesettings"),
        }
    }

    /// Tagline to store when the global document is first created: the one
    /// saved by an earlier deployment if there is one, else the default.
    async fn initial_trending_text(&self) -> Result<String, AppError> {
        let legacy = self
            .legacy
            .find_one(doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(legacy
            .as_ref()
            .and_then(|d| d.get_str("trendingText").ok())
            .map(str::to_string)
            .unwrap_or_else(default_trending_text))
    }

    /// A unique `key` keeps concurrent first reads from inserting twice.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        let index = IndexModel::builder()
            .keys(doc! { "key": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection
            .create_index(index)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

fn upsert_returning_new() -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .upsert(true)
        .return_document(ReturnDocument::After)
        .build()
}

#[async_trait]
impl SettingsRepository for MongoSettingsRepository {
    async fn get_settings(&self) -> Result<SiteSettings, AppError> {
        let existing = self
            .collection
            .find_one(doc! { "key": "global" })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if let Some(settings) = existing {
            return Ok(settings);
        }

        // $setOnInsert makes the lazy creation a single atomic upsert
        let initial = self.initial_trending_text().await?;
        let settings = self
            .collection
            .find_one_and_update(
                doc! { "key": "global" },
                doc! { "$setOnInsert": { "key": "global", "trendingText": initial.as_str() } },
            )
            .with_options(upsert_returning_new())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(settings.unwrap_or(SiteSettings {
            trending_text: initial,
            ..SiteSettings::default()
        }))
    }

    async fn set_trending_text(&self, text: &str) -> Result<SiteSettings, AppError> {
        let settings = self
            .collection
            .find_one_and_update(
                doc! { "key": "global" },
                doc! { "$set": { "key": "global", "trendingText": text } },
            )
            .with_options(upsert_returning_new())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(settings.unwrap_or_else(|| SiteSettings {
            trending_text: text.to_string(),
            ..SiteSettings::default()
        }))
    }
}
