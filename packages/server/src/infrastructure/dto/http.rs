//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::RoomSummary;

/// Live room summary for the debug list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub kind: String,
    /// Number of connections currently joined
    pub members: usize,
}

impl From<RoomSummary> for RoomSummaryDto {
    fn from(summary: RoomSummary) -> Self {
        Self {
            id: summary.id.into_string(),
            kind: summary.kind.to_string(),
            members: summary.member_count,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub connections: usize,
}
