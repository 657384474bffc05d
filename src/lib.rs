//! In-memory book recommendation engine
//!
//! A books CSV is loaded once into an immutable [`dataset::Table`], encoded
//! into a [`services::FeatureMatrix`] and indexed by cosine similarity.
//! Recommendations are served through an [`engine::EngineHandle`] using one
//! of three strategies: content, popularity or hybrid.

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;

pub use engine::{initialize, EngineHandle, EngineOptions, SharedEngine};
pub use error::{AppError, AppResult, DataLoadError};
pub use models::{BookRecord, EngineStats, Recommendation, RecommendationResult, Strategy};
