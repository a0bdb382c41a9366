//! Example: Scene adapter
//!
//! Keeps a toy scene graph in sync with the world: every entity carrying a
//! `node` component gets a scene node when added, and loses it when it is
//! disposed. Destroying a node from the scene side goes through
//! `World::remove_entity`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tag_ecs::prelude::*;
use tag_ecs::{FilteredSubscriber, StatisticsSubscriber};

#[derive(Default, Debug)]
struct SceneGraph {
    nodes: BTreeMap<u64, String>,
}

struct SceneAdapter {
    subscriptions: Vec<SubscriptionId>,
}

impl SceneAdapter {
    fn attach(world: &World, scene: &Arc<Mutex<SceneGraph>>) -> Self {
        let on_add = {
            let scene = Arc::clone(scene);
            world.subscribe(
                EventKind::Add,
                FilteredSubscriber::for_tag("node", move |event| {
                    let entity = event.entity();
                    let name: String = entity.get_as("node_name")?;
                    println!("  scene: create node '{name}' for entity {}", entity.id());
                    lock(&scene)?.nodes.insert(entity.id(), name);
                    Ok(())
                }),
            )
        };

        let on_remove = {
            let scene = Arc::clone(scene);
            world.events().on(EventKind::Remove, move |event| {
                if let Some(name) = lock(&scene)?.nodes.remove(&event.entity().id()) {
                    println!("  scene: dispose node '{name}'");
                }
                Ok(())
            })
        };

        Self {
            subscriptions: vec![on_add, on_remove],
        }
    }

    fn detach(self, world: &World) {
        for id in self.subscriptions {
            world.unsubscribe(id);
        }
    }
}

fn lock(scene: &Mutex<SceneGraph>) -> Result<std::sync::MutexGuard<'_, SceneGraph>> {
    scene
        .lock()
        .map_err(|_| EcsError::callback("scene graph lock poisoned"))
}

fn node(name: &str) -> CompSpec {
    Component::new("node").with_value("node_name", name).into()
}

fn main() -> Result<()> {
    let mut world = World::with_config(WorldConfig::from_json_str(r#"{"bucket_capacity": 4}"#)?)?;
    let scene = Arc::new(Mutex::new(SceneGraph::default()));
    let stats = Arc::new(StatisticsSubscriber::new());
    world.events().subscribe_all_shared(stats.clone());

    let adapter = SceneAdapter::attach(&world, &scene);

    println!("Populating world...");
    world.add_entity([node("player1"), "player".into()])?;
    let enemy1 = world.add_entity([node("enemy1"), "enemy".into()])?;
    world.add_entity([node("enemy2"), "enemy".into()])?;

    println!("\nEnemy node destroyed in the scene...");
    world.remove_entity(&enemy1)?;
    println!("Enemies left: {}", world.query_entities(["enemy"])?.len());

    println!("\nTearing down the level...");
    world.clear()?;
    adapter.detach(&world);

    println!(
        "\nadded={} removed={} scene nodes left={}",
        stats.added(),
        stats.removed(),
        lock(&scene)?.nodes.len()
    );
    Ok(())
}
