use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    api::models::{
        AddExpenseRequest, AddMemberRequest, CreateGroupRequest, ErrorResponse, RemoveMemberRequest, UpdateRoleRequest,
    },
    core::{
        errors::LedgerWarning,
        ledger::{CustomAmount, PercentageShare, SplitRequest, WeightedShare},
        models::{
            Allocation, BalanceReport, BalanceScope, Expense, Group, GroupMember, GroupSummary, MemberBalance,
            PaymentRecord, Role, SettlementInstruction, SettlementPlan, SplitKind,
            audit::{AppLog, GroupAudit},
        },
        services::NewMember,
    },
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::create_group,
        super::handlers::list_groups,
        super::handlers::get_group,
        super::handlers::add_member,
        super::handlers::remove_member,
        super::handlers::update_member_role,
        super::handlers::add_expense,
        super::handlers::list_expenses,
        super::handlers::get_expense,
        super::handlers::get_balances,
        super::handlers::get_settlement_plan,
        super::handlers::get_group_summary,
        super::handlers::mark_paid,
        super::handlers::mark_unpaid,
        super::handlers::get_app_logs,
        super::handlers::get_group_audits
    ),
    components(schemas(
        CreateGroupRequest,
        AddMemberRequest,
        RemoveMemberRequest,
        UpdateRoleRequest,
        AddExpenseRequest,
        NewMember,
        SplitRequest,
        PercentageShare,
        CustomAmount,
        WeightedShare,
        ErrorResponse,
        Group,
        GroupMember,
        Role,
        Expense,
        Allocation,
        SplitKind,
        MemberBalance,
        BalanceScope,
        BalanceReport,
        SettlementInstruction,
        SettlementPlan,
        PaymentRecord,
        GroupSummary,
        LedgerWarning,
        AppLog,
        GroupAudit
    )),
    modifiers(&BearerAuth),
    info(
        title = "Tally API",
        description = "API for splitting group expenses and settling balances",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
