//! Range visits: wildcard and tagged

use crate::ecs::{Component, ComponentTag, EntityId, Scene, SceneConfig, TagFilter};
use crate::spatial::Aabb;

/// Tagged payload used to identify which instance a visit receives
struct Marker {
    label: u32,
    hits: u32,
}

impl Marker {
    fn tag() -> ComponentTag {
        ComponentTag::named("test-marker")
    }
}

impl Component for Marker {
    fn tag(&self) -> ComponentTag {
        Self::tag()
    }
}

fn unit_box(x: f64) -> Aabb {
    Aabb::new(x, 0.0, 0.0, x + 1.0, 1.0)
}

/// Row of unit boxes at x = 0, 2, 4, ... with markers on the even indices
fn row(count: usize) -> (Scene, Vec<EntityId>) {
    let mut scene = Scene::new(SceneConfig::default());
    let mut ids = Vec::new();
    for i in 0..count {
        let id = scene.spawn_with_aabb(unit_box(2.0 * i as f64));
        if i % 2 == 0 {
            scene.entity_mut(id).unwrap().add_component(Marker {
                label: i as u32,
                hits: 0,
            });
        }
        ids.push(id);
    }
    (scene, ids)
}

#[test]
fn test_wildcard_visits_each_overlapping_entity_once() {
    let (mut scene, ids) = row(5);
    let observer = scene.spawn_with_aabb(Aabb::new(100.0, 100.0, 0.0, 101.0, 101.0));

    let mut seen = Vec::new();
    let region = Aabb::new(0.5, 0.0, 0.0, 6.5, 1.0);
    scene
        .entity_mut(observer)
        .unwrap()
        .visit_in_range(TagFilter::Any, &region, |entity, component| {
            assert!(component.is_none());
            seen.push(entity.id());
        });

    assert_eq!(seen, ids[0..4].to_vec());
}

#[test]
fn test_caller_is_visited_when_in_range() {
    let (mut scene, ids) = row(2);

    let mut seen = Vec::new();
    scene
        .entity_mut(ids[0])
        .unwrap()
        .visit_in_range(TagFilter::Any, &unit_box(0.0), |entity, _| seen.push(entity.id()));

    assert_eq!(seen, vec![ids[0]]);
}

#[test]
fn test_tagged_visit_passes_the_entity_own_component() {
    let (mut scene, ids) = row(5);
    let observer = scene.spawn_with_aabb(Aabb::new(100.0, 100.0, 0.0, 101.0, 101.0));

    let mut seen = Vec::new();
    let everything = Aabb::new(-10.0, -10.0, 0.0, 20.0, 10.0);
    scene
        .entity_mut(observer)
        .unwrap()
        .visit_in_range(Marker::tag(), &everything, |entity, component| {
            let marker = component
                .and_then(|component| component.as_any_mut().downcast_mut::<Marker>())
                .unwrap();
            marker.hits += 1;
            seen.push((entity.id(), marker.label));
        });

    assert_eq!(seen, vec![(ids[0], 0), (ids[2], 2), (ids[4], 4)]);
    for &id in &[ids[0], ids[2], ids[4]] {
        let marker = scene.entity(id).unwrap().component_as::<Marker>(Marker::tag()).unwrap();
        assert_eq!(marker.hits, 1);
    }
}

#[test]
fn test_visited_component_is_detached_during_visit() {
    let (mut scene, ids) = row(1);
    let observer = scene.spawn(50.0, 50.0, 0.0);

    let mut found_while_visiting = None;
    scene
        .entity_mut(observer)
        .unwrap()
        .visit_in_range(Marker::tag(), &unit_box(0.0), |entity, _| {
            found_while_visiting = Some(entity.has_component(Marker::tag()));
        });

    assert_eq!(found_while_visiting, Some(false));
    assert!(scene.entity(ids[0]).unwrap().has_component(Marker::tag()));
}

#[test]
fn test_entities_removed_during_visit_are_skipped() {
    let (mut scene, ids) = row(4);
    let observer = scene.spawn(50.0, 50.0, 0.0);

    let mut seen = Vec::new();
    let region = Aabb::new(0.0, 0.0, 0.0, 7.0, 1.0);
    scene
        .entity_mut(observer)
        .unwrap()
        .visit_in_range(TagFilter::Any, &region, |entity, _| {
            seen.push(entity.id());
            entity.remove();
            // Removing a later entity from inside the visit hides it too
            if let Some(mut last) = entity.entity_mut(ids[3]) {
                last.remove();
            }
        });

    assert_eq!(seen, vec![ids[0], ids[1], ids[2]]);
    assert!(scene.query_range(&region).is_empty());
}

#[test]
fn test_empty_region_visits_nothing() {
    let (mut scene, _) = row(3);
    let observer = scene.spawn(50.0, 50.0, 0.0);

    let mut visited = 0;
    scene.entity_mut(observer).unwrap().visit_in_range(
        TagFilter::Any,
        &Aabb::new(-20.0, -20.0, 0.0, -10.0, -10.0),
        |_, _| visited += 1,
    );
    assert_eq!(visited, 0);
}
