//! Walkthrough of the object databases.
//!
//! This example shows:
//! - Registering a class hierarchy once and sharing it
//! - Creating objects lazily per class
//! - Weak references surviving table compaction
//! - Entities with components, and cascading entity removal
//! - Assets sharing one id space

use std::sync::Arc;

use strata_engine::ecs::{
    AssetDatabase, EntityComponentDatabase, ObjectDatabase, Result, class,
};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Default)]
struct Mesh {
    vertices: u32,
}

#[derive(Debug, Default)]
struct Texture {
    width: u32,
    height: u32,
}

#[derive(Debug, Default)]
struct Actor;

#[derive(Debug, Default)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Default)]
struct Health {
    current: i32,
}

fn main() -> Result<()> {
    // ========================================================================
    // Classes
    // ========================================================================

    let classes = Arc::new(class::Registry::new());
    let object = classes.register_abstract("Object", None)?;
    let asset = classes.register_abstract("Asset", Some(object))?;
    let mesh = classes.register::<Mesh>("Mesh", Some(asset))?;
    let texture = classes.register::<Texture>("Texture", Some(asset))?;
    let entity = classes.register_abstract("Entity", Some(object))?;
    let actor = classes.register::<Actor>("Actor", Some(entity))?;
    let component = classes.register_abstract("Component", Some(object))?;
    let position = classes.register::<Position>("Position", Some(component))?;
    classes.register_with::<Health>(
        "Health",
        Some(component),
        |_| Health { current: 100 },
        |health| println!("  finalizing health ({} left)", health.current),
    )?;

    println!("=== Classes ===");
    for descriptor in classes.iter() {
        println!(
            "  {} {:<10} abstract: {}",
            descriptor.id(),
            descriptor.name(),
            descriptor.is_abstract()
        );
    }

    // ========================================================================
    // Objects
    // ========================================================================

    let mut objects = ObjectDatabase::new(Arc::clone(&classes));
    let cube = objects.create(mesh)?;
    let quad = objects.create(mesh)?;
    objects.get_mut_of::<Mesh>(cube)?.vertices = 8;
    objects.get_mut_of::<Mesh>(quad)?.vertices = 4;
    let bricks = objects.create_of::<Texture>()?;
    let texture_value = objects.get_mut_of::<Texture>(bricks)?;
    texture_value.width = 512;
    texture_value.height = 256;

    let quad_ref = objects.weak_ref::<Mesh>(quad)?;
    objects.remove(mesh, cube)?;
    println!("\n=== Objects ===");
    println!(
        "  quad after compaction: {} vertices",
        objects.resolve(&quad_ref)?.vertices
    );
    objects.for_each_of_hierarchy(asset, |class, id, value| {
        println!("  {class} {id}: {}", value.type_name());
    })?;

    // ========================================================================
    // Entities and components
    // ========================================================================

    let mut world = EntityComponentDatabase::new(Arc::clone(&classes), entity, component)?;
    let player = world.create_entity(actor, "player")?;
    let enemy = world.create_entity(actor, "enemy")?;
    world.create_component(position, player)?;
    world.create_component(position, enemy)?;
    world.create_component_of::<Health>(enemy)?;
    world.component_mut_of::<Position>(enemy)?.x = 3.0;

    let enemy_position = world.component_ref::<Position>(enemy)?;

    println!("\n=== Entities ===");
    println!("  removing {}", world.entity_name(player)?);
    world.remove_entity(player)?;
    let moved = world.resolve_component(&enemy_position)?;
    println!("  enemy position still at ({:.1}, {:.1})", moved.x, moved.y);
    world.for_each_component(component, |id, value| {
        println!("  {id}: {}", value.type_name());
    })?;
    world.remove_entity(enemy)?;

    // ========================================================================
    // Assets
    // ========================================================================

    let mut assets = AssetDatabase::from_objects(objects, asset)?;
    let stone = assets.create(texture, "stone")?;
    println!("\n=== Assets ===");
    println!(
        "  {} is {} with id {}",
        assets.name_of(stone)?,
        assets.class_of(stone)?,
        stone
    );
    println!("  {} assets in total", assets.len());

    Ok(())
}
