//! Example: Basic world usage
//!
//! Builds a few entities from tags and components, queries them by tag,
//! and shows how late components interact with archetype buckets.

use serde_json::json;
use tag_ecs::prelude::*;

fn main() -> Result<()> {
    let mut world = World::new();

    println!("Creating entities...");

    let ship = world.add_entity([
        CompSpec::from(
            Component::new("position")
                .with_value("x", 0.0)
                .with_value("y", 0.0),
        ),
        CompSpec::from(
            Component::new("velocity")
                .with_value("dx", 1.0)
                .with_value("dy", 0.5),
        ),
        CompSpec::from(Component::new("mover").with_method("step", |entity, _| {
            let x: f64 = entity.get_as("x")?;
            let y: f64 = entity.get_as("y")?;
            let dx: f64 = entity.get_as("dx")?;
            let dy: f64 = entity.get_as("dy")?;
            entity.set("x", x + dx)?;
            entity.set("y", y + dy)?;
            Ok(json!([x + dx, y + dy]))
        })),
    ])?;
    println!("Added {ship:?}");

    let rock = world.add_entity([Component::from_value(
        json!({"id": "position", "x": 10.0, "y": 20.0}),
    )?])?;
    println!("Added {rock:?}");

    let beacon = world.add_entity(["marker"])?;
    println!("Added {beacon:?}");

    println!("\nStepping movers...");
    for entity in world.query_entities(["position", "velocity"])? {
        let at = entity.call("step", &[])?;
        println!("Entity {} moved to {at}", entity.id());
    }

    println!("\nPositioned: {}", world.query_entities(["position"])?.len());
    println!("Markers: {}", world.query_entities(["marker"])?.len());
    println!("Everything: {}", world.query_entities(Vec::<&str>::new())?.len());

    // Late components are visible on the entity but not indexed by the world
    rock.add_comp("marker")?;
    println!(
        "\nrock.is(\"marker\") = {}, found by marker query = {}",
        rock.is("marker"),
        world.query_entities(["marker"])?.contains(&rock)
    );

    WorldInspector::print_summary(&world);

    world.remove_entity(&beacon)?;
    world.clear()?;
    println!("\nCleared; {} entities left", world.entity_count());
    Ok(())
}
