pub mod asset;
pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{
    DownloadPhase, DownloadPlan, DownloadPlanRequest, DownloadPreferences, DownloadTarget,
    TargetSpec,
};
