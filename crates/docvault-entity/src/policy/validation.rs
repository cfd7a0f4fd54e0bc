//! Policy field validation.

use docvault_core::{AppError, AppResult};

use super::action::{ActionSet, PolicyAction};
use super::model::{NewAccessPolicy, SubjectType, UpdateAccessPolicy};

/// Lowest accepted priority value (highest precedence).
pub const MIN_PRIORITY: i32 = 1;
/// Highest accepted priority value.
pub const MAX_PRIORITY: i32 = 1000;

const MAX_NAME_LENGTH: usize = 255;

/// Priorities are within 1..=1000.
pub fn validate_priority(priority: i32) -> AppResult<i32> {
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        return Err(AppError::validation(format!(
            "Priority must be between {MIN_PRIORITY} and {MAX_PRIORITY}, got {priority}"
        )));
    }
    Ok(priority)
}

/// Action lists are non-empty; duplicates collapse into vocabulary order.
pub fn validate_actions(actions: &[PolicyAction]) -> AppResult<Vec<PolicyAction>> {
    let set: ActionSet = actions.iter().copied().collect();
    if set.is_empty() {
        return Err(AppError::validation("A policy must grant at least one action"));
    }
    Ok(set.to_vec())
}

/// User subjects carry a UUID; role subjects carry a non-blank role name.
pub fn validate_subject(subject_type: SubjectType, subject_id: &str) -> AppResult<String> {
    let trimmed = subject_id.trim();
    match subject_type {
        SubjectType::User => uuid::Uuid::parse_str(trimmed)
            .map(|id| id.to_string())
            .map_err(|_| AppError::validation(format!("Invalid user subject id: '{subject_id}'"))),
        SubjectType::Role => {
            if trimmed.is_empty() {
                Err(AppError::validation("Role name cannot be empty"))
            } else {
                Ok(trimmed.to_string())
            }
        }
    }
}

/// Validate and normalize a new policy.
pub fn validate_new_policy(input: NewAccessPolicy) -> AppResult<NewAccessPolicy> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::validation("Policy name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Policy name exceeds {MAX_NAME_LENGTH} characters"
        )));
    }
    let subject_id = validate_subject(input.subject_type, &input.subject_id)?;
    let actions = validate_actions(&input.actions)?;
    let priority = validate_priority(input.priority)?;

    Ok(NewAccessPolicy {
        name,
        description: input.description.filter(|d| !d.trim().is_empty()),
        subject_type: input.subject_type,
        subject_id,
        resource_type: input.resource_type,
        resource_id: input.resource_id,
        actions,
        is_active: input.is_active,
        priority,
    })
}

/// Validate the set fields of an update.
pub fn validate_update(input: UpdateAccessPolicy) -> AppResult<UpdateAccessPolicy> {
    if input.is_empty() {
        return Err(AppError::validation("No policy fields to update"));
    }
    Ok(UpdateAccessPolicy {
        actions: input.actions.as_deref().map(validate_actions).transpose()?,
        priority: input.priority.map(validate_priority).transpose()?,
        is_active: input.is_active,
    })
}
