//! Headless симуляция IRONSIGHT
//!
//! Игрок стоит в центре, враги сходятся и стреляют. Печатает roster и health
//! раз в секунду. Опционально: путь к RON конфигу первым аргументом.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::Collider;
use std::time::Duration;

use ironsight_simulation::*;

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);

    let config = match std::env::args().nth(1) {
        Some(path) => match SimulationConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log_error(&format!("Config {}: {}, using defaults", path, err));
                SimulationConfig::default()
            }
        },
        None => SimulationConfig::default(),
    };
    let tick = Duration::from_secs_f64(1.0 / config.tick_hz);

    log_info(&format!("🚀 Starting IRONSIGHT headless simulation (seed: {})", seed));

    app.insert_resource(config)
        .insert_resource(TimeUpdateStrategy::ManualDuration(tick))
        .add_plugins((SimulationPlugin, HeadlessNavigationPlugin, HeadlessAnimationPlugin));

    let world = app.world_mut();
    let player = world
        .spawn((
            Player,
            Health::new(100),
            Transform::default(),
            Collider::capsule_y(0.5, 0.4),
        ))
        .id();
    let rifle = world
        .spawn((Weapon::rifle(), WeaponOwner(player), Animator::default()))
        .id();
    let pistol = world
        .spawn((Weapon::pistol().holstered(), WeaponOwner(player), Animator::default()))
        .id();
    world.entity_mut(player).insert(Loadout::new(vec![rifle, pistol]));

    for (i, angle) in [0.0_f32, 120.0, 240.0].iter().enumerate() {
        let distance = 12.0 + i as f32 * 4.0;
        let position = Quat::from_rotation_y(angle.to_radians()) * Vec3::new(0.0, 0.0, distance);
        world.send_event(SpawnEnemy::at(position).chasing(player).alert(true));
    }
    world.send_event(RecorderControl::Start);

    // 30 секунд симуляции
    for tick in 0..1800 {
        app.update();

        if tick % 60 == 0 {
            let enemies = app.world().resource::<EnemyRoster>().count();
            let health = app.world().get::<Health>(player).map_or(0, |h| h.current);
            let elapsed = app.world().resource::<TimeRecorder>().elapsed();
            log_info(&format!(
                "Tick {}: {:.1}s, {} enemies, player health {}",
                tick, elapsed, enemies, health
            ));
        }

        if app.world().get::<Dead>(player).is_some() {
            log_warning("Player is dead, stopping");
            break;
        }
    }

    log_info("Simulation complete!");
}
