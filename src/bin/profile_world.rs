#![allow(dead_code, unused_imports)]

use std::time::Instant;

use tag_ecs::{CompSpec, Component, World};

#[cfg(feature = "profiling")]
#[tracing::instrument(skip(world))]
fn profile_adds(world: &mut World, count: usize) {
    let _span = tracing::info_span!("add_loop", count = count).entered();
    for i in 0..count {
        if i % 1_000 == 0 {
            tracing::info!("Adding entity {}/{}", i, count);
        }
        let variant = format!("variant{}", i % 8);
        let position = Component::new("position")
            .with_value("x", i as f64)
            .with_value("y", 0.0);
        if let Err(err) = world.add_entity([CompSpec::from(position), CompSpec::from(variant)]) {
            tracing::error!(%err, "add failed");
        }
    }
}

#[cfg(feature = "profiling")]
fn main() {
    let _guard = match tag_ecs::profiling::init_file_tracing(".", "trace.json") {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    let mut world = World::new();

    println!("Profiling adds...");
    let start = Instant::now();
    profile_adds(&mut world, 10_000);
    println!("Add 10k entities complete in: {:?}", start.elapsed());

    let start = Instant::now();
    let found = world.query_entities(["position"]).map(|v| v.len());
    println!("Query found {found:?} in: {:?}", start.elapsed());
}

#[cfg(not(feature = "profiling"))]
fn main() {
    println!("profile_world binary requires --features profiling");
}
