use crate::{
    api::models::*,
    auth::jwt::Claims,
    core::{
        errors::LedgerError,
        models::{
            BalanceReport, Expense, Group, GroupSummary, PaymentRecord, SettlementPlan,
            audit::{AppLog, GroupAudit},
        },
        services::{LedgerService, NewExpense, NewMember},
    },
    infrastructure::{
        logging::in_memory::InMemoryLogging,
        storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, Request, State},
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
};
use http::header;

use std::sync::Arc;

pub type AppService = LedgerService<InMemoryLogging, InMemoryStorage>;

/// Middleware to validate JWT
async fn auth_middleware(
    State(service): State<Arc<AppService>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| LedgerError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| LedgerError::Unauthorized("Invalid Authorization header".to_string()))?;

    let claims = service.validate_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub fn api_routes(service: Arc<AppService>) -> Router {
    Router::new()
        .route("/groups", post(create_group).get(list_groups))
        .route("/groups/{group_id}", get(get_group))
        .route("/groups/{group_id}/members", post(add_member))
        .route("/groups/{group_id}/members/remove", post(remove_member))
        .route("/groups/{group_id}/members/role", post(update_member_role))
        .route("/groups/{group_id}/expenses", post(add_expense).get(list_expenses))
        .route("/groups/{group_id}/balances", get(get_balances))
        .route("/groups/{group_id}/settlement", get(get_settlement_plan))
        .route("/groups/{group_id}/summary", get(get_group_summary))
        .route("/groups/{group_id}/audits", get(get_group_audits))
        .route("/expenses/{expense_id}", get(get_expense))
        .route("/expenses/{expense_id}/allocations/{member_id}/paid", post(mark_paid))
        .route("/expenses/{expense_id}/allocations/{member_id}/unpaid", post(mark_unpaid))
        .route("/logs", get(get_app_logs))
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware))
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 200, description = "Group created successfully", body = Group),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 409, description = "Member listed twice", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_group(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<Json<Group>, ApiError> {
    let group = service.create_group(req.name, req.members, &claims.sub).await?;
    Ok(Json(group))
}

#[utoipa::path(
    get,
    path = "/api/groups",
    responses(
        (status = 200, description = "Groups the caller belongs to, oldest first", body = Vec<Group>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn list_groups(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Group>>, ApiError> {
    Ok(Json(service.list_groups(&claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Group details", body = Group),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_group(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
) -> Result<Json<Group>, ApiError> {
    Ok(Json(service.get_group(&group_id, &claims.sub).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/members",
    request_body = AddMemberRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Member added successfully", body = Group),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 403, description = "Not authorized", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn add_member(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> Result<Json<Group>, ApiError> {
    let member = NewMember {
        member_id: req.member_id,
        role: req.role,
    };
    Ok(Json(service.add_member(&group_id, member, &claims.sub).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/members/remove",
    request_body = RemoveMemberRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Member removed successfully", body = Group),
        (status = 403, description = "Not authorized or owner targeted", body = ErrorResponse),
        (status = 404, description = "Group or member not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn remove_member(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
    Json(req): Json<RemoveMemberRequest>,
) -> Result<Json<Group>, ApiError> {
    Ok(Json(service.remove_member(&group_id, &req.member_id, &claims.sub).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/members/role",
    request_body = UpdateRoleRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Role updated", body = Group),
        (status = 400, description = "Owner targeted or owner role requested", body = ErrorResponse),
        (status = 403, description = "Not an owner or admin", body = ErrorResponse),
        (status = 404, description = "Group or member not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_member_role(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<Group>, ApiError> {
    Ok(Json(
        service
            .update_member_role(&group_id, &req.member_id, req.role, &claims.sub)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/expenses",
    request_body = AddExpenseRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Expense recorded", body = Expense),
        (status = 400, description = "Invalid split, amount, or participant outside the group", body = ErrorResponse),
        (status = 403, description = "Not authorized", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn add_expense(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
    Json(req): Json<AddExpenseRequest>,
) -> Result<Json<Expense>, ApiError> {
    let new_expense = NewExpense {
        payer_id: req.payer_id,
        description: req.description,
        amount: req.amount,
        split: req.split,
    };
    Ok(Json(service.add_expense(&group_id, new_expense, &claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/expenses",
    params(
        ("group_id" = String, Path, description = "ID of the group"),
        ExpenseQuery
    ),
    responses(
        (status = 200, description = "Expenses, oldest first", body = Vec<Expense>),
        (status = 400, description = "Unknown status filter or invalid date range", body = ErrorResponse),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn list_expenses(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let filter = query.filter()?;
    Ok(Json(service.list_expenses(&group_id, filter, &claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/expenses/{expense_id}",
    params(
        ("expense_id" = String, Path, description = "ID of the expense")
    ),
    responses(
        (status = 200, description = "Expense with its allocations", body = Expense),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_expense(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(expense_id): Path<String>,
) -> Result<Json<Expense>, ApiError> {
    Ok(Json(service.get_expense(&expense_id, &claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/balances",
    params(
        ("group_id" = String, Path, description = "ID of the group"),
        BalanceQuery
    ),
    responses(
        (status = 200, description = "Net balance per member", body = BalanceReport),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_balances(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalanceReport>, ApiError> {
    let range = query.range()?;
    Ok(Json(service.get_balances(&group_id, query.scope, range, &claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/settlement",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Suggested payments that clear all balances", body = SettlementPlan),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_settlement_plan(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
) -> Result<Json<SettlementPlan>, ApiError> {
    Ok(Json(service.get_settlement_plan(&group_id, &claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/summary",
    params(
        ("group_id" = String, Path, description = "ID of the group"),
        SummaryQuery
    ),
    responses(
        (status = 200, description = "Group totals and balances", body = GroupSummary),
        (status = 400, description = "Invalid date range", body = ErrorResponse),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_group_summary(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<GroupSummary>, ApiError> {
    let range = query.range()?;
    Ok(Json(service.get_group_summary(&group_id, range, &claims.sub).await?))
}

#[utoipa::path(
    post,
    path = "/api/expenses/{expense_id}/allocations/{member_id}/paid",
    params(
        ("expense_id" = String, Path, description = "ID of the expense"),
        ("member_id" = String, Path, description = "Member whose allocation is settled")
    ),
    responses(
        (status = 200, description = "Allocation marked paid", body = PaymentRecord),
        (status = 403, description = "Not authorized", body = ErrorResponse),
        (status = 404, description = "Allocation not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn mark_paid(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path((expense_id, member_id)): Path<(String, String)>,
) -> Result<Json<PaymentRecord>, ApiError> {
    Ok(Json(service.mark_paid(&expense_id, &member_id, &claims.sub).await?))
}

#[utoipa::path(
    post,
    path = "/api/expenses/{expense_id}/allocations/{member_id}/unpaid",
    params(
        ("expense_id" = String, Path, description = "ID of the expense"),
        ("member_id" = String, Path, description = "Member whose allocation is reopened")
    ),
    responses(
        (status = 200, description = "Allocation marked unpaid", body = PaymentRecord),
        (status = 403, description = "Not authorized", body = ErrorResponse),
        (status = 404, description = "Allocation not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn mark_unpaid(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path((expense_id, member_id)): Path<(String, String)>,
) -> Result<Json<PaymentRecord>, ApiError> {
    Ok(Json(service.mark_unpaid(&expense_id, &member_id, &claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Actions performed by the caller", body = Vec<AppLog>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_app_logs(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<AppLog>>, ApiError> {
    Ok(Json(service.get_app_logs(&claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/audits",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Group audit trail", body = Vec<GroupAudit>),
        (status = 403, description = "Not a group member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_group_audits(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<GroupAudit>>, ApiError> {
    Ok(Json(service.get_group_audits(&group_id, &claims.sub).await?))
}
