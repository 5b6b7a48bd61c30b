//! busy — a store with three checkout lanes under sustained shopper
//! traffic. Exercises lane hysteresis, manual lane-state commands, and the
//! per-cell dwell heatmap, printing a track-stream sample every few seconds
//! instead of every tick.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use retailsim_core::Vector2;
use retailsim_sim::{DesiredState, LaneRef, Roi, SceneObject, SimulatorConfig, Simulator};

const SEED: u64 = 7;
const TICK_SECS: f32 = 0.1;
const MAX_TICKS: u32 = 18_000; // 30 minutes simulated
const SPAWN_EVERY_TICKS: u32 = 20; // a new shopper roughly every 2s
const TRACK_SAMPLE_EVERY_TICKS: u32 = 50; // one JSON snapshot every 5s
const CLOSE_LANE_AT_TICK: u32 = 6_000; // manually close lane 2 at t=10min

fn store_scene() -> (Vec<SceneObject>, Vec<Roi>) {
    let lane_xs = [6.0, 14.0, 22.0];
    let mut objects = Vec::new();
    let mut rois = Vec::new();
    for (i, &x) in lane_xs.iter().enumerate() {
        let n = i + 1;
        objects.push(SceneObject {
            name: format!("register-{n}"),
            kind: "checkout".into(),
            position: Vector2::new(x, 7.0),
            scale: Vector2::new(0.8, 0.8),
            rotation_y: 0.0,
        });
        rois.push(Roi {
            name: format!("Checkout {n} - Queue"),
            vertices: vec![
                Vector2::new(x - 1.0, 8.0),
                Vector2::new(x + 1.0, 8.0),
                Vector2::new(x + 1.0, 10.0),
                Vector2::new(x - 1.0, 10.0),
            ],
        });
        rois.push(Roi {
            name: format!("Checkout {n} - Service"),
            vertices: vec![
                Vector2::new(x - 1.0, 6.0),
                Vector2::new(x + 1.0, 6.0),
                Vector2::new(x + 1.0, 8.0),
                Vector2::new(x - 1.0, 8.0),
            ],
        });
    }
    (objects, rois)
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "busy=info,retailsim_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== busy — retailsim pedestrian simulator ===");
    println!(
        "Seed: {SEED}  |  Ticks: {MAX_TICKS} ({:.0} min)  |  Lanes: 3",
        MAX_TICKS as f32 * TICK_SECS / 60.0
    );
    println!();

    let (objects, rois) = store_scene();
    let config = SimulatorConfig {
        world_w: 28.0,
        world_d: 20.0,
        max_occupancy: 25,
        seed: Some(SEED),
        ..SimulatorConfig::default()
    };
    let mut sim = Simulator::init_from_scene(config, &objects, &rois)
        .expect("scene has at least one walkable cell");
    sim.set_heatmap_enabled(true);

    println!("Cashiers spawned: {}", sim.cashiers().len());
    println!();

    let mut json_lines = 0usize;
    let mut lane_closed = false;
    for tick in 0..MAX_TICKS {
        if tick % SPAWN_EVERY_TICKS == 0 {
            sim.spawn_agent();
        }

        sim.update(TICK_SECS);

        if !lane_closed && tick >= CLOSE_LANE_AT_TICK {
            match sim.set_lane_state(LaneRef::DisplayIndex(2), DesiredState::Closed) {
                Ok(idempotent) => {
                    println!(
                        "-- t={:.0}s: manually closed lane 2 (idempotent={idempotent})",
                        sim.clock().elapsed_secs
                    );
                }
                Err(e) => eprintln!("lane close failed: {e}"),
            }
            lane_closed = true;
        }

        if tick % TRACK_SAMPLE_EVERY_TICKS == 0 {
            for msg in sim.track_messages("demo-device", "demo-venue") {
                println!("{}", serde_json::to_string(&msg).expect("TrackMessage always serializes"));
                json_lines += 1;
            }
        }
    }

    let diag = sim.get_diagnostics();
    let hot_cells = sim.heatmap().map(|h| h.iter().filter(|&&v| v > 0.0).count()).unwrap_or(0);

    eprintln!();
    eprintln!("Simulation complete at t={:.1}s", sim.clock().elapsed_secs);
    eprintln!("  track messages printed : {json_lines}");
    eprintln!("  total_spawned          : {}", diag.total_spawned);
    eprintln!("  total_exited           : {}", diag.total_exited);
    eprintln!("  live_shoppers          : {}", diag.live_shoppers);
    eprintln!("  live_cashiers          : {}", diag.live_cashiers);
    eprintln!("  gate violations (60s)  : {}", diag.recent_gate_violations.len());
    eprintln!("  heatmap cells visited  : {hot_cells}");
    for lane in &diag.lane_states {
        eprintln!(
            "  lane #{} (uuid={}): desired={:?} status={:?}",
            lane.display_index, lane.uuid, lane.desired_state, lane.status
        );
    }
}
