#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod ranking_service;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::{CatalogService, SubjectCatalog, TestSetSummary};
pub use error::{LoadError, PersistError, ServicesError, SessionError};
pub use ranking_service::{RankingService, TestRanking};

pub use sessions::{
    Advance, AdvanceOutcome, CompletionReport, ResultRecorder, SessionProgress, TestSession,
    TestSessionService,
};
