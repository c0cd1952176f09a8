pub mod app;
pub mod config;
pub mod demo_seeder;
pub mod error;
pub mod slug;
pub mod models {
    pub mod notification;
    pub mod post;
}
pub mod db {
    pub mod health;
    pub mod models;
    pub mod notification_repository;
    pub mod post_repository;
    pub mod settings_repository;

    #[cfg(test)]
    pub mod memory;
}
pub mod auth {
    pub mod credential;
    pub mod gate;
}
pub mod api {
    pub mod auth;
    pub mod engagement;
    pub mod errors;
    pub mod health;
    pub mod notifications;
    pub mod posts;
    pub mod settings;
}
