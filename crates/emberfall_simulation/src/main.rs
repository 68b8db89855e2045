//! Headless симуляция Emberfall
//!
//! `emberfall_simulation [level.json] [ticks]` — загружает уровень (или demo)
//! и прогоняет скриптованный input: ходьба вправо, прыжок, атака.

use emberfall_simulation::{
    create_simulation_app, find_player, log_error, log_info, Health, InputKey, LevelConfig, LevelManager, PlayerInput,
};

const DEFAULT_TICKS: u32 = 1200;

fn main() {
    let mut args = std::env::args().skip(1);
    let level = match args.next() {
        Some(path) => match LevelConfig::from_file(&path) {
            Ok(level) => level,
            Err(error) => {
                emberfall_simulation::init_logger();
                log_error(&format!("❌ {}", error));
                std::process::exit(1);
            }
        },
        None => LevelConfig::demo(),
    };
    let ticks = args.next().and_then(|raw| raw.parse().ok()).unwrap_or(DEFAULT_TICKS);

    let seed = 42;
    println!("Starting Emberfall headless simulation (level: '{}', seed: {})", level.name, seed);

    let mut app = create_simulation_app(seed, level);
    app.update(); // Startup: spawn уровня

    let Some(player) = find_player(app.world_mut()) else {
        log_error("❌ Level has no player");
        std::process::exit(1);
    };

    for tick in 0..ticks {
        if let Some(mut input) = app.world_mut().get_mut::<PlayerInput>(player) {
            match tick {
                10 => input.press(InputKey::Right),
                120 | 300 => input.tap(InputKey::Jump),
                200 | 400 => input.tap(InputKey::Attack),
                600 => input.release(InputKey::Right),
                _ => {}
            }
        }

        app.update();

        if tick % 100 == 0 {
            let world = app.world();
            let entity_count = world.entities().len();
            let coins = world.get_resource::<LevelManager>().map_or(0, |manager| manager.coins);
            let hp = world.get::<Health>(player).map_or(0, |health| health.current);
            log_info(&format!("Tick {}: {} entities, coins {}, hp {}", tick, entity_count, coins, hp));
        }
    }

    println!("Simulation complete!");
}
