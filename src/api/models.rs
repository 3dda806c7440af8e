use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::core::errors::{FieldError, LedgerError};
use crate::core::ledger::SplitRequest;
use crate::core::models::{BalanceScope, Role};
use crate::core::services::NewMember;
use crate::infrastructure::storage::{DateRange, ExpenseFilter, ExpenseStatus};

// Request structs for JSON payloads. The acting member always comes from the
// bearer token, never from the body.
#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub members: Vec<NewMember>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub member_id: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Member
}

#[derive(Deserialize, ToSchema)]
pub struct RemoveMemberRequest {
    pub member_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AddExpenseRequest {
    pub payer_id: String,
    pub description: String,
    /// Minor currency units.
    pub amount: i64,
    pub split: SplitRequest,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BalanceQuery {
    #[serde(default)]
    pub scope: BalanceScope,
    /// Only count expenses created at or after this RFC 3339 instant.
    #[param(value_type = Option<String>)]
    pub start: Option<DateTime<Utc>>,
    /// Only count expenses created at or before this RFC 3339 instant.
    #[param(value_type = Option<String>)]
    pub end: Option<DateTime<Utc>>,
}

impl BalanceQuery {
    pub fn range(&self) -> Result<DateRange, LedgerError> {
        DateRange::new(self.start, self.end)
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    #[param(value_type = Option<String>)]
    pub start: Option<DateTime<Utc>>,
    #[param(value_type = Option<String>)]
    pub end: Option<DateTime<Utc>>,
}

impl SummaryQuery {
    pub fn range(&self) -> Result<DateRange, LedgerError> {
        DateRange::new(self.start, self.end)
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpenseQuery {
    /// One of `all`, `unsettled`, `settled`.
    pub status: Option<String>,
    #[param(value_type = Option<String>)]
    pub start: Option<DateTime<Utc>>,
    #[param(value_type = Option<String>)]
    pub end: Option<DateTime<Utc>>,
}

impl ExpenseQuery {
    pub fn filter(&self) -> Result<ExpenseFilter, LedgerError> {
        let status = match self.status.as_deref() {
            None | Some("all") => ExpenseStatus::All,
            Some("unsettled") => ExpenseStatus::Unsettled,
            Some("settled") => ExpenseStatus::Settled,
            Some(other) => {
                return Err(LedgerError::InvalidInput(
                    "status".to_string(),
                    FieldError {
                        field: "status".to_string(),
                        title: "Invalid status".to_string(),
                        description: format!("Unknown expense status filter '{}'", other),
                    },
                ));
            }
        };
        Ok(ExpenseFilter {
            status,
            range: DateRange::new(self.start, self.end)?,
        })
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub member_id: String,
    pub role: Role,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for LedgerError to implement IntoResponse
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LedgerError::AllocationMismatch { .. }
            | LedgerError::EmptySplit
            | LedgerError::InvalidPercentage(_)
            | LedgerError::DuplicateMember(_)
            | LedgerError::InvalidAmount(_)
            | LedgerError::InvalidShares
            | LedgerError::InvalidSplitMember(_)
            | LedgerError::InvalidRole(_)
            | LedgerError::InvalidOwnerCount(_)
            | LedgerError::InvalidInput(..) => StatusCode::BAD_REQUEST,
            LedgerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LedgerError::NotGroupMember(_) | LedgerError::InsufficientRole(_) | LedgerError::OwnerCannotBeRemoved => {
                StatusCode::FORBIDDEN
            }
            LedgerError::AllocationNotFound { .. }
            | LedgerError::ExpenseNotFound(_)
            | LedgerError::GroupNotFound(_)
            | LedgerError::MemberNotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::AlreadyGroupMember(_) => StatusCode::CONFLICT,
            LedgerError::InternalServerError(_) | LedgerError::StorageError(_) | LedgerError::LoggingError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let error_message = match &self.0 {
            LedgerError::InvalidInput(_, field_error) => {
                format!("{}: {}", field_error.title, field_error.description)
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}
