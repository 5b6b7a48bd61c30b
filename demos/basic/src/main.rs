//! basic — smallest example for the retailsim pedestrian simulator.
//!
//! Simulates a single shopper walking through a one-lane store, checking
//! out, and leaving. Prints the per-tick track stream as JSON lines, the
//! same wire format a live deployment would hand to a downstream consumer.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use retailsim_agents::PersonaTable;
use retailsim_core::Vector2;
use retailsim_sim::{Roi, SceneObject, SimulatorConfig, Simulator};

const SEED: u64 = 42;
const TICK_SECS: f32 = 0.1;
const MAX_TICKS: u32 = 3_000;

/// A single fast-buying shopper with a short browse, so the demo reaches
/// checkout and exit within a few simulated minutes instead of the default
/// persona table's multi-minute dwell times.
fn quick_shopper_persona() -> PersonaTable {
    let mut table = PersonaTable::default();
    table.fast_buyer.probability = 1.0;
    table.fast_buyer.stops = (1, 2);
    table.fast_buyer.stay_minutes = (0.3, 0.6);
    table.fast_buyer.checkout_probability = 1.0;
    table.browser.probability = 0.0;
    table.family.probability = 0.0;
    table.staff.probability = 0.0;
    table
}

fn store_scene() -> (Vec<SceneObject>, Vec<Roi>) {
    let objects = vec![SceneObject {
        name: "register-1".into(),
        kind: "checkout".into(),
        position: Vector2::new(10.0, 7.0),
        scale: Vector2::new(0.8, 0.8),
        rotation_y: 0.0,
    }];
    let rois = vec![
        Roi {
            name: "Checkout 1 - Queue".into(),
            vertices: vec![
                Vector2::new(9.0, 8.0),
                Vector2::new(11.0, 8.0),
                Vector2::new(11.0, 10.0),
                Vector2::new(9.0, 10.0),
            ],
        },
        Roi {
            name: "Checkout 1 - Service".into(),
            vertices: vec![
                Vector2::new(9.0, 6.0),
                Vector2::new(11.0, 6.0),
                Vector2::new(11.0, 8.0),
                Vector2::new(9.0, 8.0),
            ],
        },
    ];
    (objects, rois)
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "basic=info,retailsim_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== basic — retailsim pedestrian simulator ===");
    println!("Seed: {SEED}  |  Max ticks: {MAX_TICKS} ({:.0} s)", MAX_TICKS as f32 * TICK_SECS);
    println!();

    let (objects, rois) = store_scene();
    let config = SimulatorConfig {
        seed: Some(SEED),
        personas: quick_shopper_persona(),
        ..SimulatorConfig::default()
    };
    let mut sim = Simulator::init_from_scene(config, &objects, &rois)
        .expect("scene has at least one walkable cell");

    sim.spawn_agent().expect("below max_occupancy");

    let mut json_lines = 0usize;
    for _ in 0..MAX_TICKS {
        sim.update(TICK_SECS);
        for msg in sim.track_messages("demo-device", "demo-venue") {
            println!("{}", serde_json::to_string(&msg).expect("TrackMessage always serializes"));
            json_lines += 1;
        }
        if sim.get_diagnostics().total_exited >= 1 {
            break;
        }
    }

    let diag = sim.get_diagnostics();
    eprintln!();
    eprintln!("Simulation complete at t={:.1}s", sim.clock().elapsed_secs);
    eprintln!("  track messages printed : {json_lines}");
    eprintln!("  total_spawned          : {}", diag.total_spawned);
    eprintln!("  total_exited           : {}", diag.total_exited);
    eprintln!("  live_shoppers          : {}", diag.live_shoppers);
}
