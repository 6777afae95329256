//! Permission model: resources, actions, conditions and role grant tables

use serde::{Deserialize, Serialize};

use crate::models::{Event, Poll, Role, Task, User};
use uuid::Uuid;

/// Category of entity an action applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Users,
    Events,
    Tasks,
    Polls,
    Chat,
    Admin,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Users => "users",
            ResourceKind::Events => "events",
            ResourceKind::Tasks => "tasks",
            ResourceKind::Polls => "polls",
            ResourceKind::Chat => "chat",
            ResourceKind::Admin => "admin",
        }
    }
}

/// Action a role may be granted on a resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Vote,
    Rsvp,
    Write,
    Manage,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Vote => "vote",
            Action::Rsvp => "rsvp",
            Action::Write => "write",
            Action::Manage => "manage",
        }
    }
}

/// Ownership snapshot of a target instance, the only fields conditions read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceRefs {
    pub created_by: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
}

impl ResourceRefs {
    pub fn for_task(task: &Task) -> Self {
        Self {
            created_by: Some(task.created_by),
            assignee_id: task.assignee_id,
        }
    }

    pub fn for_event(event: &Event) -> Self {
        Self {
            created_by: Some(event.organizer_id),
            assignee_id: None,
        }
    }

    pub fn for_poll(poll: &Poll) -> Self {
        Self {
            created_by: Some(poll.created_by),
            assignee_id: None,
        }
    }
}

/// Predicate refining a grant to instance-level ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    IsCreator,
    IsAssignee,
    IsCreatorOrAssignee,
}

impl Condition {
    pub fn evaluate(&self, user: &User, refs: &ResourceRefs) -> bool {
        let is_creator = refs.created_by == Some(user.id);
        let is_assignee = refs.assignee_id == Some(user.id);
        match self {
            Condition::IsCreator => is_creator,
            Condition::IsAssignee => is_assignee,
            Condition::IsCreatorOrAssignee => is_creator || is_assignee,
        }
    }
}

/// One row of a role's grant table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub resource: ResourceKind,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Grant {
    /// Unconditional grant
    pub fn new(resource: ResourceKind, action: Action) -> Self {
        Self {
            resource,
            action,
            condition: None,
        }
    }

    /// Grant refined by an ownership condition
    pub fn when(resource: ResourceKind, action: Action, condition: Condition) -> Self {
        Self {
            resource,
            action,
            condition: Some(condition),
        }
    }
}

fn organizer_grants() -> Vec<Grant> {
    use Action::*;
    use Condition::*;
    use ResourceKind::*;
    vec![
        Grant::new(Events, Create),
        Grant::new(Events, Read),
        Grant::when(Events, Update, IsCreator),
        Grant::when(Events, Delete, IsCreator),
        Grant::new(Events, Rsvp),
        Grant::new(Tasks, Create),
        Grant::new(Tasks, Read),
        Grant::when(Tasks, Update, IsCreatorOrAssignee),
        Grant::when(Tasks, Delete, IsCreator),
        Grant::new(Polls, Create),
        Grant::new(Polls, Read),
        Grant::when(Polls, Update, IsCreator),
        Grant::when(Polls, Delete, IsCreator),
        Grant::new(Polls, Vote),
        Grant::new(Chat, Read),
        Grant::new(Chat, Write),
        Grant::new(Users, Read),
    ]
}

fn guest_grants() -> Vec<Grant> {
    use Action::*;
    use Condition::*;
    use ResourceKind::*;
    vec![
        Grant::new(Events, Read),
        Grant::new(Events, Rsvp),
        Grant::new(Tasks, Read),
        Grant::when(Tasks, Update, IsAssignee),
        Grant::new(Polls, Read),
        Grant::new(Polls, Vote),
        Grant::new(Chat, Read),
        Grant::new(Chat, Write),
        Grant::new(Users, Read),
    ]
}

/// Every (resource, action) pair present in any role's table, unconditional,
/// plus the admin-only surface (user management, admin panel).
fn admin_grants() -> Vec<Grant> {
    use Action::*;
    use ResourceKind::*;

    let mut pairs: Vec<(ResourceKind, Action)> = organizer_grants()
        .into_iter()
        .chain(guest_grants())
        .map(|g| (g.resource, g.action))
        .collect();
    pairs.extend([
        (Users, Create),
        (Users, Update),
        (Users, Delete),
        (Admin, Manage),
    ]);
    pairs.sort_by_key(|(r, a)| (*r as u8, *a as u8));
    pairs.dedup();
    pairs
        .into_iter()
        .map(|(resource, action)| Grant::new(resource, action))
        .collect()
}

/// Immutable role -> grant-table configuration.
///
/// Constructed once at startup and injected into the resolver; never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct Policy {
    admin: Vec<Grant>,
    organizer: Vec<Grant>,
    guest: Vec<Grant>,
}

impl Policy {
    pub fn for_role(&self, role: Role) -> &[Grant] {
        match role {
            Role::Admin => &self.admin,
            Role::Organizer => &self.organizer,
            Role::Guest => &self.guest,
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            admin: admin_grants(),
            organizer: organizer_grants(),
            guest: guest_grants(),
        }
    }
}
