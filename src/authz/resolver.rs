//! Permission resolver
//!
//! Pure function of (role, resource, action, ownership refs). Fail closed:
//! a conditioned grant with no instance data available is a denial.

use crate::models::{Role, Task, User};

use super::permission::{Action, Policy, ResourceKind, ResourceRefs};

/// Evaluates grant tables for a user against a target resource
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    policy: Policy,
}

impl Resolver {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    /// Decide whether `user` may perform `action` on `resource`.
    ///
    /// `refs` carries the target instance's ownership fields; conditioned
    /// grants deny when it is absent.
    pub fn has_permission(
        &self,
        user: &User,
        resource: ResourceKind,
        action: Action,
        refs: Option<&ResourceRefs>,
    ) -> bool {
        self.policy
            .for_role(user.role)
            .iter()
            .filter(|g| g.resource == resource && g.action == action)
            .any(|g| match (g.condition, refs) {
                (None, _) => true,
                (Some(cond), Some(refs)) => cond.evaluate(user, refs),
                (Some(_), None) => false,
            })
    }

    pub fn is_admin(&self, user: &User) -> bool {
        user.role == Role::Admin
    }

    pub fn can_create_event(&self, user: &User) -> bool {
        self.has_permission(user, ResourceKind::Events, Action::Create, None)
    }

    pub fn can_create_task(&self, user: &User) -> bool {
        self.has_permission(user, ResourceKind::Tasks, Action::Create, None)
    }

    pub fn can_manage_task(&self, user: &User, task: &Task) -> bool {
        self.has_permission(
            user,
            ResourceKind::Tasks,
            Action::Update,
            Some(&ResourceRefs::for_task(task)),
        )
    }

    pub fn can_delete_task(&self, user: &User, task: &Task) -> bool {
        self.has_permission(
            user,
            ResourceKind::Tasks,
            Action::Delete,
            Some(&ResourceRefs::for_task(task)),
        )
    }

    pub fn can_rsvp(&self, user: &User) -> bool {
        self.has_permission(user, ResourceKind::Events, Action::Rsvp, None)
    }

    pub fn can_vote(&self, user: &User) -> bool {
        self.has_permission(user, ResourceKind::Polls, Action::Vote, None)
    }

    pub fn can_write_chat(&self, user: &User) -> bool {
        self.has_permission(user, ResourceKind::Chat, Action::Write, None)
    }
}
