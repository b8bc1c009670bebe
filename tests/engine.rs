use std::time::Duration;

use cgmath::Point3;
use terrain_engine::{BlockEdit, BlockType, EngineConfig, EngineState, Observer, World};

const DT: Duration = Duration::from_millis(50);

fn config(workers: usize) -> EngineConfig {
    let mut config = EngineConfig {
        area_size: 8,
        worker_threads: workers,
        ..EngineConfig::default()
    };
    config.terrain.sea_level = 2;
    config.terrain.sky_level = 8;
    config.spawn.view_range = 1;
    config.spawn.initial_spawn_extent = 0;
    config.spawn.max_creations_per_tick = 8;
    config.structures.tree_chance = 0.05;
    config
}

fn run_until_settled(engine: &mut EngineState, observers: &[Observer]) {
    for _ in 0..40 {
        let stats = engine.tick(DT, observers);
        engine.frame();
        if stats.areas_spawned == 0 && stats.spawns_pending == 0 {
            break;
        }
    }
}

fn snapshot(world: &World) -> Vec<(Point3<i32>, Vec<BlockType>)> {
    let mut areas: Vec<_> = world
        .areas()
        .map(|(_, area)| (area.position, area.blocks().to_vec()))
        .collect();
    areas.sort_by_key(|(position, _)| (position.x, position.y, position.z));
    areas
}

#[test]
fn observers_pull_in_their_neighborhood() {
    let mut engine = EngineState::new(config(0)).unwrap();
    let observers = [
        Observer::new(1, Point3::new(4.0, 4.0, 4.0)),
        Observer::new(2, Point3::new(-20.0, 4.0, 4.0)),
    ];
    run_until_settled(&mut engine, &observers);

    for observer in &observers {
        let center = engine.world().area_position_of(observer.block_position());
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    assert!(engine.world().contains(center + cgmath::Vector3::new(dx, dy, dz)));
                }
            }
        }
    }
    // two 3×3×3 cubes, three areas apart along X, do not overlap
    assert_eq!(engine.world().len(), 54);
}

#[test]
fn spawn_budget_is_respected_every_tick() {
    let mut engine = EngineState::new(config(0)).unwrap();
    let observers = [Observer::new(1, Point3::new(0.0, 0.0, 0.0))];
    let mut total = 0;
    for _ in 0..10 {
        let stats = engine.tick(DT, &observers);
        assert!(stats.areas_spawned <= 8);
        total += stats.areas_spawned;
    }
    assert_eq!(total, 27);
    assert_eq!(engine.world().newly_spawned().len(), 0);
}

#[test]
fn worker_count_does_not_change_the_world() {
    let observers = [Observer::new(1, Point3::new(3.0, 6.0, -2.0))];
    let mut inline = EngineState::new(config(0)).unwrap();
    let mut threaded = EngineState::new(config(3)).unwrap();
    run_until_settled(&mut inline, &observers);
    run_until_settled(&mut threaded, &observers);
    // let structures forwarded during the last spawn tick land
    for _ in 0..4 {
        inline.tick(DT, &observers);
        threaded.tick(DT, &observers);
    }
    assert_eq!(snapshot(inline.world()), snapshot(threaded.world()));
}

#[test]
fn every_area_gets_a_mesh_and_edits_trigger_remeshing() {
    let mut engine = EngineState::new(config(2)).unwrap();
    let observers = [Observer::new(1, Point3::new(4.0, 4.0, 4.0))];
    run_until_settled(&mut engine, &observers);
    engine.frame();
    assert_eq!(engine.meshes().len(), engine.world().len());
    engine.meshes_mut().drain_updates();

    let spawn = engine.spawn_location(4, 4).unwrap();
    let target = Point3::new(4, spawn.y as i32, 4);
    engine.apply_edit(BlockEdit::new(target, BlockType::STONE)).unwrap();
    let meshed = engine.frame();
    assert!(meshed >= 1);
    let owner = engine.world().area_position_of(target);
    assert!(engine.meshes_mut().drain_updates().contains(&owner));
}

#[test]
fn circuits_run_inside_engine_ticks() {
    let mut engine = EngineState::new(config(0)).unwrap();
    let observers = [Observer::new(1, Point3::new(4.0, 4.0, 4.0))];
    run_until_settled(&mut engine, &observers);

    let y = engine.spawn_location(4, 4).unwrap().y as i32;
    engine
        .apply_edit(BlockEdit::new(Point3::new(3, y, 4), BlockType::ON_SWITCH))
        .unwrap();
    engine
        .apply_edit(BlockEdit::new(Point3::new(4, y, 4), BlockType::OFF_LAMP))
        .unwrap();

    let mut ticks = 0;
    while engine.world().block_at(Point3::new(4, y, 4)) != Some(BlockType::ON_LAMP) {
        engine.tick(DT, &observers);
        ticks += 1;
        assert!(ticks <= 20, "lamp never lit");
    }
}
