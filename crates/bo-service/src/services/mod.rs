pub mod access_filter;
pub mod meeting_scheduler;
pub mod meeting_service;
pub mod product_service;
pub mod team_service;
pub mod tenancy;
pub mod token_service;
pub mod user_service;
pub mod validation;
