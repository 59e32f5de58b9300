//! Common value types and class setups used across benchmarks.
//!
//! The types are plain structs sized like typical game data so that dense iteration numbers
//! are representative.

use std::sync::Arc;

use strata_engine::ecs::{ClassId, Result, class};

// =============================================================================
// Asset types
// =============================================================================

/// Mesh asset (16 bytes).
#[derive(Clone, Copy, Debug, Default)]
pub struct Mesh {
    pub vertices: u32,
    pub indices: u32,
    pub material: u32,
    pub flags: u32,
}

/// Texture asset (12 bytes).
#[derive(Clone, Copy, Debug, Default)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub format: u32,
}

// =============================================================================
// Entity and component types
// =============================================================================

/// Entity payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct Actor {
    pub team: u32,
}

/// 3D position component (12 bytes).
#[derive(Clone, Copy, Debug, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 3D velocity component (12 bytes).
#[derive(Clone, Copy, Debug, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

// =============================================================================
// Class setup
// =============================================================================

/// Class ids of the benchmark hierarchy.
///
/// ```text
/// Object
///   ├── Asset ── Mesh, Texture
///   ├── Entity ── Actor
///   └── Component ── Position, Velocity
/// ```
pub struct Classes {
    pub registry: Arc<class::Registry>,
    pub object: ClassId,
    pub asset: ClassId,
    pub mesh: ClassId,
    pub texture: ClassId,
    pub entity: ClassId,
    pub actor: ClassId,
    pub component: ClassId,
    pub position: ClassId,
    pub velocity: ClassId,
}

/// Register the benchmark hierarchy in a fresh registry.
pub fn register_classes() -> Result<Classes> {
    let registry = Arc::new(class::Registry::new());
    let object = registry.register_abstract("Object", None)?;
    let asset = registry.register_abstract("Asset", Some(object))?;
    let mesh = registry.register::<Mesh>("Mesh", Some(asset))?;
    let texture = registry.register::<Texture>("Texture", Some(asset))?;
    let entity = registry.register_abstract("Entity", Some(object))?;
    let actor = registry.register::<Actor>("Actor", Some(entity))?;
    let component = registry.register_abstract("Component", Some(object))?;
    let position = registry.register::<Position>("Position", Some(component))?;
    let velocity = registry.register::<Velocity>("Velocity", Some(component))?;
    Ok(Classes {
        registry,
        object,
        asset,
        mesh,
        texture,
        entity,
        actor,
        component,
        position,
        velocity,
    })
}
