use crate::api::models::{DownloadArchiveInfo, DownloadInfoDto, DownloadResponseDto};

/// What a download plan should cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    Album(String),
    Assets(Vec<String>),
}

/// Outbound request for a partition plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlanRequest {
    pub target: TargetSpec,
    /// Preferred maximum archive size in bytes; the server default applies when unset
    pub archive_size: Option<u64>,
}

impl From<DownloadPlanRequest> for DownloadInfoDto {
    fn from(request: DownloadPlanRequest) -> Self {
        let mut dto = DownloadInfoDto {
            archive_size: request.archive_size,
            ..Default::default()
        };
        match request.target {
            TargetSpec::Album(id) => dto.album_id = Some(id),
            TargetSpec::Assets(ids) => dto.asset_ids = Some(ids),
        }
        dto
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescriptor {
    pub asset_ids: Vec<String>,
    pub size: u64,
}

impl From<DownloadArchiveInfo> for ArchiveDescriptor {
    fn from(info: DownloadArchiveInfo) -> Self {
        Self {
            asset_ids: info.asset_ids,
            size: info.size,
        }
    }
}

/// Ordered archives as partitioned by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub archives: Vec<ArchiveDescriptor>,
    pub total_size: u64,
}

impl DownloadPlan {
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }
}

impl From<DownloadResponseDto> for DownloadPlan {
    fn from(response: DownloadResponseDto) -> Self {
        Self {
            archives: response.archives.into_iter().map(Into::into).collect(),
            total_size: response.total_size,
        }
    }
}

/// One file of a single-asset download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub filename: String,
    pub id: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadPreferences {
    pub archive_size: Option<u64>,
    pub include_embedded_videos: bool,
}

/// Lifecycle of a single archive or target transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    Pending,
    Registered,
    Transferring,
    Completed,
    Failed,
    Cleared,
}

impl DownloadPhase {
    pub fn can_advance_to(self, next: DownloadPhase) -> bool {
        use DownloadPhase::*;
        matches!(
            (self, next),
            (Pending, Registered)
                | (Registered, Transferring)
                | (Registered, Failed)
                | (Transferring, Completed)
                | (Transferring, Failed)
                | (Completed, Cleared)
                | (Failed, Cleared)
        )
    }
}
