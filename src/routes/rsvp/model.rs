use serde::Deserialize;

use crate::utils::flexible_i32;

#[derive(Debug, Deserialize)]
pub struct UpdateAttendanceRequest {
    pub is_attending: bool,
    #[serde(deserialize_with = "flexible_i32")]
    pub attending_guest_count: i32,
}
