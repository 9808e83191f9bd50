//! Stakeholder sets: who receives a notification and why.
//!
//! A set is computed per event and never persisted. It is keyed by user id,
//! so a user who qualifies several ways still receives one notification.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use atelier_core::types::id::UserId;

/// Which designated role made a user the direct target of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRole {
    /// Uploaded the design file.
    Uploader,
    /// Is assigned the task.
    Assignee,
    /// Submitted the expense.
    Submitter,
}

/// Why a user was included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "reason", content = "role", rename_all = "snake_case")]
pub enum InclusionReason {
    /// The entity's single designated recipient.
    DirectTarget(TargetRole),
    /// Mentioned by `@handle` in the event text.
    Mentioned,
    /// The project's administrative owner.
    ProjectOwner,
    /// A member of the project, for project-wide events.
    ProjectMember,
    /// Holds a role that receives scheduled reminders.
    DesignatedRole,
}

impl InclusionReason {
    /// Higher wins when a user qualifies more than once.
    fn precedence(&self) -> u8 {
        match self {
            Self::DirectTarget(_) => 4,
            Self::Mentioned => 3,
            Self::ProjectOwner => 2,
            Self::DesignatedRole => 1,
            Self::ProjectMember => 0,
        }
    }
}

impl fmt::Display for InclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectTarget(TargetRole::Uploader) => f.write_str("as uploader"),
            Self::DirectTarget(TargetRole::Assignee) => f.write_str("as assignee"),
            Self::DirectTarget(TargetRole::Submitter) => f.write_str("as submitter"),
            Self::Mentioned => f.write_str("as mentioned"),
            Self::ProjectOwner => f.write_str("as project owner"),
            Self::ProjectMember => f.write_str("as project member"),
            Self::DesignatedRole => f.write_str("as site lead"),
        }
    }
}

/// One recipient and the reason they were included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stakeholder {
    /// The recipient.
    pub user_id: UserId,
    /// Why they receive it.
    pub reason: InclusionReason,
}

/// The deduplicated recipients of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeholderSet {
    actor: Option<UserId>,
    members: BTreeMap<UserId, InclusionReason>,
}

impl StakeholderSet {
    /// An empty set that rejects `actor`.
    pub fn excluding(actor: UserId) -> Self {
        Self {
            actor: Some(actor),
            members: BTreeMap::new(),
        }
    }

    /// An empty set that accepts anyone, including the actor.
    pub fn open() -> Self {
        Self {
            actor: None,
            members: BTreeMap::new(),
        }
    }

    /// A set with exactly one recipient.
    pub fn single(user_id: UserId, reason: InclusionReason) -> Self {
        let mut set = Self::open();
        set.insert(user_id, reason);
        set
    }

    /// Add a recipient.
    ///
    /// Returns `false` for the excluded actor. A user already present keeps
    /// whichever reason has higher precedence.
    pub fn insert(&mut self, user_id: UserId, reason: InclusionReason) -> bool {
        if self.actor == Some(user_id) {
            return false;
        }
        self.members
            .entry(user_id)
            .and_modify(|existing| {
                if reason.precedence() > existing.precedence() {
                    *existing = reason;
                }
            })
            .or_insert(reason);
        true
    }

    /// Number of distinct recipients.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether there is nobody to notify.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `user_id` is a recipient.
    pub fn contains(&self, user_id: UserId) -> bool {
        self.members.contains_key(&user_id)
    }

    /// The retained reason for `user_id`.
    pub fn reason_for(&self, user_id: UserId) -> Option<InclusionReason> {
        self.members.get(&user_id).copied()
    }

    /// Iterate recipients in user-id order.
    pub fn iter(&self) -> impl Iterator<Item = Stakeholder> + '_ {
        self.members.iter().map(|(user_id, reason)| Stakeholder {
            user_id: *user_id,
            reason: *reason,
        })
    }

    /// Recipient ids in user-id order.
    pub fn recipients(&self) -> Vec<UserId> {
        self.members.keys().copied().collect()
    }
}
