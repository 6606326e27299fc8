//! Identity assignment between in-memory entities and storage keys.
//!
//! An entity starts life without a durable key. The only way it acquires one
//! is [`assign_identity`], which the persistence gateway calls after storage
//! reports the key generated for a successful insert. There is no in-process
//! counter: storage is the single source of identity.

use super::{DurableKey, IdentityError};

/// An entity that may carry a durable storage key.
pub trait Identifiable {
    /// Durable key type for this entity.
    type Id: DurableKey;

    /// Returns the durable key, or `None` while the entity is unsaved.
    fn identity(&self) -> Option<Self::Id>;

    /// Returns `true` when the entity has never been persisted.
    fn is_new(&self) -> bool {
        self.identity().is_none()
    }
}

/// Write access to an entity's identity slot, kept inside the crate.
pub(crate) trait IdentitySlot: Identifiable {
    fn identity_slot(&mut self) -> &mut Option<Self::Id>;
}

/// Records a storage-generated key on a new entity.
///
/// # Errors
///
/// Returns [`IdentityError::InvalidKey`] when `key` is not positive and
/// [`IdentityError::AlreadyAssigned`] when the entity is already identified.
/// The entity is left untouched on error.
pub(crate) fn assign_identity<E: IdentitySlot>(
    entity: &mut E,
    key: i64,
) -> Result<E::Id, IdentityError> {
    let id = E::Id::from_key(key).map_err(|_| IdentityError::InvalidKey(key))?;
    let slot = entity.identity_slot();
    if let Some(existing) = *slot {
        return Err(IdentityError::AlreadyAssigned {
            existing: existing.key(),
            attempted: key,
        });
    }
    *slot = Some(id);
    Ok(id)
}
