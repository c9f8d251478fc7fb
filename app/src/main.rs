//! Headless demo: a particle fountain driven by a 90 Hz display link for a few seconds, with a
//! simulated thermal event part way through. Pass a TOML config path to override the defaults.

use std::{cell::Cell, error::Error, rc::Rc, thread, time::Duration};

use cadence_engine::{
    core::{self, Config, DisplayLink, Simulation, ThermalState},
    ecs::{Component, Phase, System},
};
use log::LevelFilter;

const MAX_PARTICLES: usize = 500;
const RUN_SECONDS: f64 = 3.0;

#[derive(Component, Debug, Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Component, Debug, Clone, Copy)]
struct Velocity {
    dx: f32,
    dy: f32,
}

/// Seconds left before the particle is destroyed.
#[derive(Component, Debug, Clone, Copy)]
struct Lifetime(f64);

fn movement() -> System {
    System::new("movement", 0, |ctx, matched| {
        let dt = ctx.delta() as f32;
        for entity in matched {
            let Some(velocity) = ctx.get_mut::<Velocity>(entity) else {
                continue;
            };
            velocity.dy -= 9.8 * dt;
            let Velocity { dx, dy } = *velocity;
            if let Some(position) = ctx.get_mut::<Position>(entity) {
                position.x += dx * dt;
                position.y += dy * dt;
            }
        }
    })
    .requires::<(Position, Velocity)>()
}

fn aging() -> System {
    System::new("aging", 10, |ctx, matched| {
        let dt = ctx.delta();
        for entity in matched {
            let Some(lifetime) = ctx.get_mut::<Lifetime>(entity) else {
                continue;
            };
            lifetime.0 -= dt;
            if lifetime.0 <= 0.0 {
                ctx.destroy(entity);
            }
        }
    })
    .requires::<Lifetime>()
}

fn spawner() -> System {
    let mut emitted: u32 = 0;
    System::new("spawner", 0, move |ctx, _| {
        let live = ctx.world().component_count::<Lifetime>();
        for _ in live..(live + 4).min(MAX_PARTICLES) {
            emitted = emitted.wrapping_add(1);
            let spread = (emitted % 21) as f32 - 10.0;
            let particle = ctx.spawn(["particle"]);
            ctx.insert(particle, Position { x: 0.0, y: 0.0 });
            ctx.insert(
                particle,
                Velocity {
                    dx: spread * 0.3,
                    dy: 12.0,
                },
            );
            ctx.insert(particle, Lifetime(1.0 + f64::from(emitted % 7) * 0.25));
        }
    })
}

fn census(peak: Rc<Cell<usize>>) -> System {
    System::new("census", 100, move |_, matched| {
        peak.set(peak.get().max(matched.len()));
    })
    .tagged(["particle"])
}

fn main() -> Result<(), Box<dyn Error>> {
    let logs = core::log::init(LevelFilter::Info)?;
    let printer = thread::spawn(move || {
        for message in logs {
            println!("[{}] {}", message.level, message.message);
        }
    });

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let mut sim = Simulation::new(config.clone());
    let peak = Rc::new(Cell::new(0));
    sim.add_system(Phase::Update, spawner());
    sim.add_system(Phase::Update, census(peak.clone()));
    sim.add_system(Phase::FixedUpdate, movement());
    sim.add_system(Phase::FixedUpdate, aging());

    let thermal = sim.thermal_sender();
    let platform = thread::spawn(move || {
        for (delay, state) in [
            (1000, ThermalState::Fair),
            (500, ThermalState::Serious),
            (500, ThermalState::Nominal),
        ] {
            thread::sleep(Duration::from_millis(delay));
            if thermal.send(state).is_err() {
                break;
            }
        }
    });

    let link = DisplayLink::new(config.target_refresh_hz);
    let frames = (config.target_refresh_hz * RUN_SECONDS) as u64;
    sim.start();
    let ran = sim.run(&link, Some(frames));

    println!("Ran {ran} frames, peak {} particles", peak.get());
    println!("{}", sim.metrics());

    let _ = platform.join();
    // The printer never sees a disconnect since the global logger lives until exit. Give it a
    // moment to drain, then let the process end.
    thread::sleep(Duration::from_millis(50));
    drop(printer);
    Ok(())
}
