pub mod auth_service;
pub mod feed_service;
pub mod follow_service;
pub mod forms;
pub mod pagination;
pub mod post_service;
pub mod response_cache;
