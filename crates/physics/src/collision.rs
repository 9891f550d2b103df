//! Collision groups and filtering.

use locomotion::SurfaceMask;
use rapier3d::prelude::*;

/// Collision groups for different body types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static walkable environment (terrain, ramps, floors)
    Environment = 1 << 0,
    /// Static blocking geometry (walls, pillars)
    Wall = 1 << 1,
    /// Player character
    Player = 1 << 2,
    /// AI hover drones
    Drone = 1 << 3,
    /// Loose physics props
    Debris = 1 << 4,
}

impl CollisionGroup {
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Collision groups for walkable static geometry.
    pub fn environment() -> InteractionGroups {
        InteractionGroups::new(Group::from_bits_retain(Self::Environment.bits()), Group::ALL)
    }

    /// Collision groups for walls.
    pub fn wall() -> InteractionGroups {
        InteractionGroups::new(Group::from_bits_retain(Self::Wall.bits()), Group::ALL)
    }

    /// Collision groups for the player.
    pub fn player() -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_retain(Self::Player.bits()),
            Group::from_bits_retain(
                Self::Environment.bits()
                    | Self::Wall.bits()
                    | Self::Drone.bits()
                    | Self::Debris.bits(),
            ),
        )
    }

    /// Collision groups for drones.
    pub fn drone() -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_retain(Self::Drone.bits()),
            Group::from_bits_retain(
                Self::Environment.bits()
                    | Self::Wall.bits()
                    | Self::Player.bits()
                    | Self::Drone.bits(),
            ),
        )
    }

    /// Collision groups for debris.
    pub fn debris() -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_retain(Self::Debris.bits()),
            Group::from_bits_retain(
                Self::Environment.bits() | Self::Wall.bits() | Self::Debris.bits(),
            ),
        )
    }
}

/// Surfaces a character's probes should see: the static world.
pub fn walkable_surfaces() -> SurfaceMask {
    SurfaceMask(CollisionGroup::Environment.bits() | CollisionGroup::Wall.bits())
}

/// Query filter matching colliders whose membership intersects `mask`.
pub fn surface_filter(mask: SurfaceMask) -> QueryFilter<'static> {
    QueryFilter::default().groups(InteractionGroups::new(
        Group::ALL,
        Group::from_bits_retain(mask.0),
    ))
}
