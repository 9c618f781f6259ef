//! Steering target referenced by arena messages.

use super::math::Vec3;

/// Entity identifier as carried on the wire.
pub type EntityId = u32;

/// What a steered entity is heading for.
///
/// `Entity` is a weak reference: it names an entity without keeping it alive,
/// and resolving it fails once the entity is gone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavigationTarget {
    /// No target
    #[default]
    None,
    /// Follow a live entity
    Entity(EntityId),
    /// Fixed point in world space
    Point(Vec3),
}

impl NavigationTarget {
    /// Current target position.
    ///
    /// `position_of` looks up live entities. A vanished entity resolves to
    /// `None`, same as no target.
    pub fn resolve<F>(&self, position_of: F) -> Option<Vec3>
    where
        F: FnOnce(EntityId) -> Option<Vec3>,
    {
        match *self {
            Self::None => None,
            Self::Entity(id) => position_of(id),
            Self::Point(point) => Some(point),
        }
    }

    /// Check whether a target is set
    #[must_use]
    pub const fn is_set(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Drop the target if it refers to `id`
    pub fn forget_entity(&mut self, id: EntityId) {
        if *self == Self::Entity(id) {
            *self = Self::None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn resolves_each_case() {
        let world: HashMap<EntityId, Vec3> = [(5, Vec3::new(1.0, 0.0, 0.0))].into();
        let lookup = |id: EntityId| world.get(&id).copied();

        assert_eq!(NavigationTarget::None.resolve(lookup), None);
        assert_eq!(
            NavigationTarget::Entity(5).resolve(lookup),
            Some(Vec3::new(1.0, 0.0, 0.0))
        );
        assert_eq!(NavigationTarget::Entity(6).resolve(lookup), None);
        assert_eq!(
            NavigationTarget::Point(Vec3::ZERO).resolve(lookup),
            Some(Vec3::ZERO)
        );
    }

    #[test]
    fn forget_only_matching_entity() {
        let mut target = NavigationTarget::Entity(3);
        target.forget_entity(4);
        assert!(target.is_set());
        target.forget_entity(3);
        assert_eq!(target, NavigationTarget::None);
    }
}
