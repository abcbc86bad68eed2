//! Lookup result types and the well-known status strings.

use serde::{Deserialize, Serialize};

/// Status reported once the parcel has been handed over.
pub const STATUS_DELIVERED: &str = "配達完了";
/// Failure status: the carrier has not indexed the number yet.
pub const STATUS_NOT_REGISTERED: &str = "伝票番号未登録";
/// Failure status: the number is malformed or does not exist.
pub const STATUS_INVALID_NUMBER: &str = "伝票番号誤り";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultCode {
    Success,
    Failure,
}

/// `(result code, status text)` for one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    pub code: ResultCode,
    pub status: String,
}

impl LookupResult {
    pub fn success(status: impl Into<String>) -> Self {
        Self {
            code: ResultCode::Success,
            status: status.into(),
        }
    }

    pub fn failure(status: impl Into<String>) -> Self {
        Self {
            code: ResultCode::Failure,
            status: status.into(),
        }
    }

    /// What a lookup reports when the service could not be reached.
    pub fn transport_fault() -> Self {
        Self::failure("")
    }

    pub fn is_success(&self) -> bool {
        self.code == ResultCode::Success
    }
}

/// Wire shape of the lookup service: `{"result": "0", "status": "..."}`
/// where `"0"` means the lookup succeeded.
#[derive(Debug, Deserialize)]
pub(crate) struct TrackResponse {
    pub result: String,
    #[serde(default)]
    pub status: String,
}

impl From<TrackResponse> for LookupResult {
    fn from(resp: TrackResponse) -> Self {
        if resp.result == "0" {
            Self::success(resp.status)
        } else {
            Self::failure(resp.status)
        }
    }
}
