//! User entity.

use super::{DisplayName, Identifiable, IdentitySlot, UserId, ValidationError};
use serde::{Deserialize, Serialize};

/// A person who can be assigned tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: Option<UserId>,
    name: DisplayName,
    active: bool,
}

impl User {
    /// Creates a new, unsaved, active user.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] for a blank name.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            name: DisplayName::new(name)?,
            active: true,
        })
    }

    pub(crate) const fn restore(id: UserId, name: DisplayName, active: bool) -> Self {
        Self {
            id: Some(id),
            name,
            active,
        }
    }

    /// Returns the durable key, if persisted.
    #[must_use]
    pub const fn id(&self) -> Option<UserId> {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Returns whether the user is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Renames the user.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] for a blank name; the user is
    /// left unchanged.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name = DisplayName::new(name)?;
        Ok(())
    }

    /// Sets the active flag.
    pub const fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl Identifiable for User {
    type Id = UserId;

    fn identity(&self) -> Option<UserId> {
        self.id
    }
}

impl IdentitySlot for User {
    fn identity_slot(&mut self) -> &mut Option<UserId> {
        &mut self.id
    }
}
