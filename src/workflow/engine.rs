//! Status transition rules

use thiserror::Error;

use crate::models::{Role, Task, TaskStatus, User};

/// Rejection of a proposed workflow action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("moving this task to {} is not allowed", .target.as_str())]
    TransitionNotAllowed {
        from: TaskStatus,
        target: TaskStatus,
    },
    #[error("task is already completed")]
    AlreadyCompleted,
    #[error("completing this task is not allowed")]
    CompletionNotAllowed,
}

fn is_creator(task: &Task, actor: &User) -> bool {
    task.created_by == actor.id
}

fn is_assignee(task: &Task, actor: &User) -> bool {
    task.assignee_id == Some(actor.id)
}

/// Decide whether `actor` may move `task` to `target`.
///
/// Rules, in order:
/// 1. admins move anything anywhere;
/// 2. cancellation is reserved to the task's creator or an organizer;
/// 3. a guest assignee may only move strictly forward along
///    TODO -> IN_PROGRESS -> COMPLETED;
/// 4. an organizer who is assignee or creator may move freely;
/// 5. everyone else may not move the task at all.
pub fn can_move_to(task: &Task, target: TaskStatus, actor: &User) -> bool {
    if actor.role == Role::Admin {
        return true;
    }
    if target == TaskStatus::Cancelled {
        return is_creator(task, actor) || actor.role == Role::Organizer;
    }
    match actor.role {
        Role::Admin => true,
        Role::Guest => {
            is_assignee(task, actor)
                && match (task.status.forward_order(), target.forward_order()) {
                    (Some(current), Some(next)) => next > current,
                    _ => false,
                }
        }
        Role::Organizer => is_assignee(task, actor) || is_creator(task, actor),
    }
}

/// `can_move_to` as a typed result naming the disallowed target
pub fn check_move(task: &Task, target: TaskStatus, actor: &User) -> Result<(), WorkflowError> {
    if can_move_to(task, target, actor) {
        Ok(())
    } else {
        Err(WorkflowError::TransitionNotAllowed {
            from: task.status,
            target,
        })
    }
}

/// Coarse gate: may `actor` change this task's status at all
/// (board draggability), independent of the target status.
pub fn can_update_task(task: &Task, actor: &User) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Organizer => is_assignee(task, actor) || is_creator(task, actor),
        Role::Guest => is_assignee(task, actor),
    }
}

/// May `actor` edit the task's descriptive fields (title, description,
/// priority, assignee, due date). Governs Edit/Delete controls.
pub fn can_edit_details(task: &Task, actor: &User) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Organizer => is_creator(task, actor),
        Role::Guest => false,
    }
}

/// May `actor` alter the completion proof of a task
pub fn can_edit_completion_details(task: &Task, actor: &User) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Organizer => is_creator(task, actor),
        Role::Guest => is_assignee(task, actor) && task.status == TaskStatus::Completed,
    }
}

/// May `actor` complete this task (with proof capture)
pub fn can_complete(task: &Task, actor: &User) -> bool {
    task.status != TaskStatus::Completed
        && (actor.role == Role::Admin || is_assignee(task, actor) || is_creator(task, actor))
}

/// `can_complete` as a typed result
pub fn check_complete(task: &Task, actor: &User) -> Result<(), WorkflowError> {
    if task.status == TaskStatus::Completed {
        return Err(WorkflowError::AlreadyCompleted);
    }
    if can_complete(task, actor) {
        Ok(())
    } else {
        Err(WorkflowError::CompletionNotAllowed)
    }
}

/// The statuses other than the current one that `actor` may move `task` to
pub fn legal_targets(task: &Task, actor: &User) -> Vec<TaskStatus> {
    TaskStatus::ALL
        .into_iter()
        .filter(|s| *s != task.status && can_move_to(task, *s, actor))
        .collect()
}
