//! An adapter keeping foreign "nodes" in sync with entities through the
//! world's event bus.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tag_ecs::prelude::*;
use tag_ecs::FilteredSubscriber;

#[derive(Default)]
struct Scene {
    nodes: HashMap<u64, String>,
}

fn attach_adapter(world: &World, scene: &Arc<Mutex<Scene>>) -> (SubscriptionId, SubscriptionId) {
    let s = Arc::clone(scene);
    let on_add = world.subscribe(
        EventKind::Add,
        FilteredSubscriber::for_tag("node", move |event| {
            let entity = event.entity();
            let name: String = entity.get_as("node_name")?;
            s.lock().unwrap().nodes.insert(entity.id(), name);
            Ok(())
        }),
    );

    let s = Arc::clone(scene);
    let on_remove = world.events().on(EventKind::Remove, move |event| {
        s.lock().unwrap().nodes.remove(&event.entity().id());
        Ok(())
    });
    (on_add, on_remove)
}

fn node(name: &str) -> Component {
    Component::new("node").with_value("node_name", name)
}

#[test]
fn test_adapter_tracks_add_and_remove() {
    let mut world = World::new();
    let scene = Arc::new(Mutex::new(Scene::default()));
    attach_adapter(&world, &scene);

    let player = world.add_entity([CompSpec::from(node("player1")), "player".into()]).unwrap();
    let enemy1 = world.add_entity([CompSpec::from(node("enemy1")), "enemy".into()]).unwrap();
    let enemy2 = world.add_entity([CompSpec::from(node("enemy2")), "enemy".into()]).unwrap();
    world.add_entity(["logic_only"]).unwrap();

    assert_eq!(scene.lock().unwrap().nodes.len(), 3);
    assert_eq!(world.query_entities(["player"]).unwrap(), vec![player]);

    // Foreign node destroyed: the adapter's owner removes the entity
    world.remove_entity(&enemy1).unwrap();
    assert_eq!(world.query_entities(["enemy"]).unwrap(), vec![enemy2.clone()]);
    assert!(!scene.lock().unwrap().nodes.contains_key(&enemy1.id()));

    for enemy in world.query_entities(["enemy"]).unwrap() {
        world.remove_entity(&enemy).unwrap();
    }
    assert!(world.query_entities(["enemy"]).unwrap().is_empty());
    assert_eq!(scene.lock().unwrap().nodes.len(), 1);
}

#[test]
fn test_detached_adapter_stops_receiving() {
    let mut world = World::new();
    let scene = Arc::new(Mutex::new(Scene::default()));
    let (on_add, on_remove) = attach_adapter(&world, &scene);

    world.add_entity([node("a")]).unwrap();
    assert!(world.unsubscribe(on_add));
    assert!(world.unsubscribe(on_remove));
    world.add_entity([node("b")]).unwrap();

    assert_eq!(scene.lock().unwrap().nodes.len(), 1);
    assert_eq!(world.events().total_subscribers(), 0);
}

#[test]
fn test_remove_subscriber_can_read_entity_properties() {
    let mut world = World::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let s = Arc::clone(&seen);
    world.events().on(EventKind::Remove, move |event| {
        let name: String = event.entity().get_as("node_name")?;
        s.lock().unwrap().push(name);
        Ok(())
    });

    let e = world.add_entity([node("lamp")]).unwrap();
    world.remove_entity(&e).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["lamp".to_string()]);
}
