pub mod download_orchestrator;
pub mod i18n;
pub mod notification;
pub mod platform;
pub mod progress;
pub mod transfer;

pub use download_orchestrator::{DownloadOrchestrator, DownloadReport};
