use crate::auth::jwt::{Claims, JwtService};
use crate::constants::{
    ALLOCATION_PAID, ALLOCATION_UNPAID, EXPENSE_ADDED, GROUP_CREATED, MAX_DESCRIPTION_LENGTH, MAX_EXPENSE_AMOUNT,
    MAX_NAME_LENGTH, MEMBER_ADDED, MEMBER_REMOVED, MEMBER_ROLE_UPDATED,
};
use crate::core::errors::{FieldError, LedgerError};
use crate::core::ledger::{
    SettlementRecorder, SplitRequest, compute_balances_with, compute_settleable_balances, plan_settlement,
    summarize_group, validate_allocations,
};
use crate::core::models::{
    BalanceReport, BalanceScope, Expense, Group, GroupMember, GroupSummary, MemberId, PaymentRecord, Role,
    SettlementPlan,
    audit::{AppLog, GroupAudit},
};
use crate::infrastructure::logging::{LogEvent, LoggingService};
use crate::infrastructure::storage::{DateRange, ExpenseFilter, Storage};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NewMember {
    pub member_id: MemberId,
    pub role: Role,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NewExpense {
    pub payer_id: MemberId,
    pub description: String,
    /// Total in minor currency units.
    pub amount: i64,
    pub split: SplitRequest,
}

pub struct LedgerService<L: LoggingService, S: Storage> {
    storage: S,
    logging: L,
    jwt_service: JwtService,
}

impl<L: LoggingService, S: Storage> LedgerService<L, S> {
    pub fn new(storage: S, logging: L, jwt_secret: String) -> Self {
        LedgerService {
            storage,
            logging,
            jwt_service: JwtService::new(jwt_secret),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, LedgerError> {
        self.jwt_service.validate_token(token)
    }

    async fn load_group(&self, group_id: &str) -> Result<Group, LedgerError> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or_else(|| LedgerError::GroupNotFound(group_id.to_string()))
    }

    async fn validate_group_membership(&self, group_id: &str, member_id: &str) -> Result<(Group, Role), LedgerError> {
        let group = self.load_group(group_id).await?;
        let role = group
            .role_of(member_id)
            .cloned()
            .ok_or_else(|| LedgerError::NotGroupMember(member_id.to_string()))?;
        Ok((group, role))
    }

    async fn validate_group_manager(&self, group_id: &str, member_id: &str) -> Result<Group, LedgerError> {
        let (group, role) = self.validate_group_membership(group_id, member_id).await?;
        if !role.can_manage() {
            warn!("Member {} ({}) tried to manage group {}", member_id, role, group_id);
            return Err(LedgerError::InsufficientRole(member_id.to_string()));
        }
        Ok(group)
    }

    async fn log_and_audit(
        &self,
        group_id: Option<&str>,
        action: &str,
        log_details: serde_json::Value,
        member_id: Option<&str>,
    ) -> Result<(), LedgerError> {
        let entry = self
            .logging
            .record(LogEvent {
                action,
                group_id,
                member_id,
                details: log_details,
            })
            .await?;
        if let Some(gid) = group_id {
            self.storage.save_group_audit(GroupAudit::from_log(entry, gid)).await?;
        }
        Ok(())
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), LedgerError> {
        if value.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("Invalid {}", field),
                    description: format!("{} cannot be empty", field),
                },
            ));
        }
        if value.len() > max_length {
            return Err(LedgerError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("{} Too Long", field),
                    description: format!("{} cannot exceed {} characters", field, max_length),
                },
            ));
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(LedgerError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("Invalid {}", field),
                    description: format!("{} contains invalid characters", field),
                },
            ));
        }
        Ok(())
    }

    fn validate_amount_input(&self, field: &str, amount: i64) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if amount > MAX_EXPENSE_AMOUNT {
            return Err(LedgerError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: "Amount Too Large".to_string(),
                    description: format!("Amount cannot exceed {} minor units", MAX_EXPENSE_AMOUNT),
                },
            ));
        }
        Ok(())
    }

    fn validate_group_roles(&self, group: &Group) -> Result<(), LedgerError> {
        let owner_count = group.members.iter().filter(|m| m.role == Role::Owner).count();
        if owner_count != 1 {
            return Err(LedgerError::InvalidOwnerCount(owner_count));
        }
        if group.role_of(&group.owner_id) != Some(&Role::Owner) {
            return Err(LedgerError::InvalidRole(format!(
                "owner {} must hold the owner role",
                group.owner_id
            )));
        }
        Ok(())
    }

    // GROUPS

    /// Creates a group owned by `created_by`. Other members may hold any role
    /// except owner.
    pub async fn create_group(
        &self,
        name: String,
        members: Vec<NewMember>,
        created_by: &str,
    ) -> Result<Group, LedgerError> {
        info!("Creating group '{}' for owner {}", name, created_by);
        self.validate_string_input("name", &name, MAX_NAME_LENGTH)?;
        self.validate_string_input("created_by", created_by, MAX_NAME_LENGTH)?;

        let now = Utc::now();
        let mut group_members = vec![GroupMember {
            member_id: created_by.to_string(),
            role: Role::Owner,
            joined_at: now,
        }];
        for member in members {
            self.validate_string_input("member_id", &member.member_id, MAX_NAME_LENGTH)?;
            if member.role == Role::Owner {
                return Err(LedgerError::InvalidRole(format!(
                    "{} cannot be added as a second owner",
                    member.member_id
                )));
            }
            if group_members.iter().any(|m| m.member_id == member.member_id) {
                return Err(LedgerError::AlreadyGroupMember(member.member_id));
            }
            group_members.push(GroupMember {
                member_id: member.member_id,
                role: member.role,
                joined_at: now,
            });
        }

        let group = Group {
            id: Uuid::new_v4().to_string(),
            name,
            owner_id: created_by.to_string(),
            members: group_members,
            created_at: now,
        };

        self.validate_group_roles(&group)?;
        self.storage.save_group(group.clone()).await?;

        self.log_and_audit(
            Some(&group.id),
            GROUP_CREATED,
            json!({
                "group_id": group.id,
                "name": group.name,
                "member_ids": group.members.iter().map(|m| m.member_id.clone()).collect::<Vec<_>>()
            }),
            Some(created_by),
        )
        .await?;

        debug!("Group created with ID: {}", group.id);
        Ok(group)
    }

    pub async fn get_group(&self, group_id: &str, queried_by: &str) -> Result<Group, LedgerError> {
        let (group, _) = self.validate_group_membership(group_id, queried_by).await?;
        Ok(group)
    }

    pub async fn list_groups(&self, member_id: &str) -> Result<Vec<Group>, LedgerError> {
        let groups = self.storage.list_groups(member_id).await?;
        debug!("Member {} belongs to {} groups", member_id, groups.len());
        Ok(groups)
    }

    pub async fn add_member(
        &self,
        group_id: &str,
        member: NewMember,
        added_by: &str,
    ) -> Result<Group, LedgerError> {
        info!("Member {} adding {} to group {}", added_by, member.member_id, group_id);
        let mut group = self.validate_group_manager(group_id, added_by).await?;
        self.validate_string_input("member_id", &member.member_id, MAX_NAME_LENGTH)?;

        if member.role == Role::Owner {
            return Err(LedgerError::InvalidRole(format!(
                "{} cannot be added as a second owner",
                member.member_id
            )));
        }
        if group.is_member(&member.member_id) {
            return Err(LedgerError::AlreadyGroupMember(member.member_id));
        }

        group.members.push(GroupMember {
            member_id: member.member_id.clone(),
            role: member.role.clone(),
            joined_at: Utc::now(),
        });
        self.validate_group_roles(&group)?;
        self.storage.save_group(group.clone()).await?;

        self.log_and_audit(
            Some(group_id),
            MEMBER_ADDED,
            json!({ "group_id": group_id, "member_id": member.member_id, "role": member.role }),
            Some(added_by),
        )
        .await?;
        Ok(group)
    }

    /// Removes a member. Expenses they paid stay in the ledger and show up as
    /// orphaned until their allocations are settled.
    pub async fn remove_member(&self, group_id: &str, member_id: &str, removed_by: &str) -> Result<Group, LedgerError> {
        info!("Member {} removing {} from group {}", removed_by, member_id, group_id);
        let mut group = self.validate_group_manager(group_id, removed_by).await?;

        if member_id == group.owner_id {
            return Err(LedgerError::OwnerCannotBeRemoved);
        }
        if !group.is_member(member_id) {
            return Err(LedgerError::MemberNotFound(member_id.to_string()));
        }

        group.members.retain(|m| m.member_id != member_id);
        self.validate_group_roles(&group)?;
        self.storage.save_group(group.clone()).await?;

        self.log_and_audit(
            Some(group_id),
            MEMBER_REMOVED,
            json!({ "group_id": group_id, "member_id": member_id }),
            Some(removed_by),
        )
        .await?;
        Ok(group)
    }

    /// Changes a member's role. Ownership is fixed at creation, so the owner's
    /// role cannot change and nobody can be promoted to owner.
    pub async fn update_member_role(
        &self,
        group_id: &str,
        member_id: &str,
        role: Role,
        updated_by: &str,
    ) -> Result<Group, LedgerError> {
        info!(
            "Member {} setting role of {} in group {} to {}",
            updated_by, member_id, group_id, role
        );
        let mut group = self.validate_group_manager(group_id, updated_by).await?;

        if member_id == group.owner_id {
            return Err(LedgerError::InvalidRole("the owner's role cannot be changed".to_string()));
        }
        if role == Role::Owner {
            return Err(LedgerError::InvalidRole(format!("{} cannot be promoted to owner", member_id)));
        }
        let member = group
            .members
            .iter_mut()
            .find(|m| m.member_id == member_id)
            .ok_or_else(|| LedgerError::MemberNotFound(member_id.to_string()))?;
        let previous = std::mem::replace(&mut member.role, role.clone());
        if previous == role {
            return Ok(group);
        }

        self.validate_group_roles(&group)?;
        self.storage.save_group(group.clone()).await?;

        self.log_and_audit(
            Some(group_id),
            MEMBER_ROLE_UPDATED,
            json!({ "group_id": group_id, "member_id": member_id, "from": previous, "to": role }),
            Some(updated_by),
        )
        .await?;
        Ok(group)
    }

    // EXPENSES

    pub async fn add_expense(
        &self,
        group_id: &str,
        new_expense: NewExpense,
        created_by: &str,
    ) -> Result<Expense, LedgerError> {
        info!(
            "Adding expense of {} to group {} by {}",
            new_expense.amount, group_id, created_by
        );
        let (group, role) = self.validate_group_membership(group_id, created_by).await?;
        if !role.can_add_expenses() {
            warn!("Viewer {} tried to add an expense to group {}", created_by, group_id);
            return Err(LedgerError::InsufficientRole(created_by.to_string()));
        }
        if !group.is_member(&new_expense.payer_id) {
            warn!("Payer {} is not in group {}", new_expense.payer_id, group_id);
            return Err(LedgerError::InvalidSplitMember(new_expense.payer_id));
        }

        self.validate_string_input("description", &new_expense.description, MAX_DESCRIPTION_LENGTH)?;
        self.validate_amount_input("amount", new_expense.amount)?;

        if let Some(outsider) = new_expense.split.members().into_iter().find(|m| !group.is_member(m)) {
            warn!("Split member {} is not in group {}", outsider, group_id);
            return Err(LedgerError::InvalidSplitMember(outsider.to_string()));
        }

        let allocations = validate_allocations(new_expense.amount, &new_expense.split)?;

        let mut expense = Expense {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.to_string(),
            payer_id: new_expense.payer_id,
            description: new_expense.description,
            amount: new_expense.amount,
            split_kind: new_expense.split.kind(),
            allocations,
            created_at: Utc::now(),
            is_settled: false,
        };
        expense.refresh_settled();

        self.storage.save_expense(expense.clone()).await?;

        self.log_and_audit(
            Some(group_id),
            EXPENSE_ADDED,
            json!({
                "expense_id": expense.id,
                "group_id": group_id,
                "amount": expense.amount,
                "payer_id": expense.payer_id,
                "split_kind": expense.split_kind
            }),
            Some(created_by),
        )
        .await?;

        debug!("Expense created with ID: {}", expense.id);
        Ok(expense)
    }

    pub async fn get_expense(&self, expense_id: &str, queried_by: &str) -> Result<Expense, LedgerError> {
        let expense = self
            .storage
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| LedgerError::ExpenseNotFound(expense_id.to_string()))?;
        self.validate_group_membership(&expense.group_id, queried_by).await?;
        Ok(expense)
    }

    pub async fn list_expenses(
        &self,
        group_id: &str,
        filter: ExpenseFilter,
        queried_by: &str,
    ) -> Result<Vec<Expense>, LedgerError> {
        self.validate_group_membership(group_id, queried_by).await?;
        self.storage.list_expenses(group_id, filter).await
    }

    // BALANCES & SETTLEMENT

    /// Recomputed from the stored allocations on every call. Only expenses
    /// created inside `range` contribute.
    pub async fn get_balances(
        &self,
        group_id: &str,
        scope: BalanceScope,
        range: DateRange,
        queried_by: &str,
    ) -> Result<BalanceReport, LedgerError> {
        let (group, _) = self.validate_group_membership(group_id, queried_by).await?;
        let report = match scope {
            BalanceScope::Outstanding => {
                let expenses = self
                    .storage
                    .list_expenses(group_id, ExpenseFilter::unsettled().within(range))
                    .await?;
                compute_settleable_balances(&group, &expenses)
            }
            BalanceScope::Historical => {
                let expenses = self
                    .storage
                    .list_expenses(group_id, ExpenseFilter::all().within(range))
                    .await?;
                BalanceReport {
                    group_id: group.id.clone(),
                    scope,
                    balances: compute_balances_with(&group.id, &expenses, scope),
                    warnings: Vec::new(),
                }
            }
        };

        for warning in &report.warnings {
            warn!("Group {}: {}", group_id, warning);
        }
        debug!("Computed {} balances for group {}", report.balances.len(), group_id);
        Ok(report)
    }

    pub async fn get_settlement_plan(&self, group_id: &str, queried_by: &str) -> Result<SettlementPlan, LedgerError> {
        let report = self
            .get_balances(group_id, BalanceScope::Outstanding, DateRange::default(), queried_by)
            .await?;
        let instructions = plan_settlement(&report.balances);
        debug!(
            "Settlement plan for group {} has {} instructions",
            group_id,
            instructions.len()
        );
        Ok(SettlementPlan {
            group_id: report.group_id,
            instructions,
            warnings: report.warnings,
        })
    }

    pub async fn get_group_summary(
        &self,
        group_id: &str,
        range: DateRange,
        queried_by: &str,
    ) -> Result<GroupSummary, LedgerError> {
        let (group, _) = self.validate_group_membership(group_id, queried_by).await?;
        let expenses = self
            .storage
            .list_expenses(group_id, ExpenseFilter::all().within(range))
            .await?;
        Ok(summarize_group(&group, &expenses))
    }

    pub async fn mark_paid(&self, expense_id: &str, member_id: &str, acting: &str) -> Result<PaymentRecord, LedgerError> {
        self.record_payment(expense_id, member_id, true, acting).await
    }

    pub async fn mark_unpaid(
        &self,
        expense_id: &str,
        member_id: &str,
        acting: &str,
    ) -> Result<PaymentRecord, LedgerError> {
        self.record_payment(expense_id, member_id, false, acting).await
    }

    /// Members settle their own allocations; owners and admins may settle on
    /// behalf of others.
    async fn record_payment(
        &self,
        expense_id: &str,
        member_id: &str,
        paid: bool,
        acting: &str,
    ) -> Result<PaymentRecord, LedgerError> {
        info!(
            "Member {} marking allocation {}/{} paid={}",
            acting, expense_id, member_id, paid
        );
        let expense = self
            .storage
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| LedgerError::AllocationNotFound {
                expense_id: expense_id.to_string(),
                member_id: member_id.to_string(),
            })?;

        let (_, role) = self.validate_group_membership(&expense.group_id, acting).await?;
        if acting != member_id && !role.can_manage() {
            warn!("Member {} tried to settle for {} without permission", acting, member_id);
            return Err(LedgerError::InsufficientRole(acting.to_string()));
        }

        let recorder = SettlementRecorder::new(&self.storage);
        let record = if paid {
            recorder.mark_paid(expense_id, member_id).await?
        } else {
            recorder.mark_unpaid(expense_id, member_id).await?
        };

        if record.changed {
            self.log_and_audit(
                Some(&expense.group_id),
                if paid { ALLOCATION_PAID } else { ALLOCATION_UNPAID },
                json!({
                    "expense_id": expense_id,
                    "member_id": member_id,
                    "expense_settled": record.expense_settled
                }),
                Some(acting),
            )
            .await?;
        }
        Ok(record)
    }

    // AUDIT

    pub async fn get_group_audits(&self, group_id: &str, queried_by: &str) -> Result<Vec<GroupAudit>, LedgerError> {
        self.validate_group_membership(group_id, queried_by).await?;
        self.storage.get_group_audits(group_id).await
    }

    /// Actions the caller performed, across every group.
    pub async fn get_app_logs(&self, queried_by: &str) -> Result<Vec<AppLog>, LedgerError> {
        self.logging.logs_for_member(queried_by).await
    }
}
