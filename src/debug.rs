use crate::archetype::Archetype;
use crate::entity::Entity;
use crate::registry::Tag;
use crate::world::World;

/// World inspector for debugging
pub struct WorldInspector;

impl WorldInspector {
    /// Get total entity count
    pub fn entity_count(world: &World) -> usize {
        world.entity_count()
    }

    /// Get bucket summary, in bucket order
    pub fn bucket_summary(world: &World) -> Vec<BucketInfo> {
        world
            .buckets()
            .iter()
            .enumerate()
            .map(|(index, bucket)| BucketInfo {
                index,
                archetype: bucket.archetype(),
                tags: world.registry().tags_of(bucket.archetype()),
                entity_count: bucket.len(),
            })
            .collect()
    }

    /// Print world summary to console
    pub fn print_summary(world: &World) {
        println!("=== World Summary ===");
        println!("Entities: {}", Self::entity_count(world));
        println!("Buckets: {}", world.bucket_count());
        println!("Tags registered: {}", world.registry().len());

        println!("\n=== Buckets ===");
        for info in Self::bucket_summary(world) {
            println!(
                "Bucket {} [{}]: {} entities",
                info.index,
                info.tags.join(", "),
                info.entity_count
            );
        }
    }

    /// Print entity details
    pub fn print_entity(world: &World, entity: &Entity) {
        println!("=== Entity {} ===", entity.id());
        println!("Archetype: {}", entity.archetype());
        println!("Birth tags: {}", world.registry().tags_of(entity.archetype()).join(", "));
        println!("Components: {}", entity.tags().join(", "));
        println!("Properties: {}", entity.property_names().join(", "));
        println!("Stored: {}", world.contains(entity));
    }
}

/// Bucket information for debugging
#[derive(Clone, Debug)]
pub struct BucketInfo {
    pub index: usize,
    pub archetype: Archetype,
    pub tags: Vec<Tag>,
    pub entity_count: usize,
}
