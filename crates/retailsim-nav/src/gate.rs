//! `GateManager` — directional crossing constraints (`spec.md` §4.3).

use retailsim_core::{ShopperState, Vector2};

/// A directional line segment that forbids crossings except in an allowed
/// direction by agents in an allowed state.
#[derive(Clone, Debug)]
pub struct Gate {
    pub a: Vector2,
    pub b: Vector2,
    /// Direction a crossing must align with (positive dot product) to pass.
    pub allowed_dir: Vector2,
    pub allowed_states: Vec<ShopperState>,
    /// Where a denied agent should be routed instead.
    pub bypass_point: Vector2,
}

/// Owns the set of gates (principally the cashier line) and answers
/// crossing queries for shopper movement steps.
#[derive(Clone, Debug, Default)]
pub struct GateManager {
    gates: Vec<Gate>,
}

impl GateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_gate(&mut self, gate: Gate) {
        self.gates.push(gate);
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Default gate: a horizontal line at `cashier_line_z` spanning
    /// `[checkout_min_x, checkout_max_x]`, allowing crossings only toward the
    /// entrance (0, -1) by shoppers in `CHECKOUT` or `EXITING`
    /// (`spec.md` §4.3). "CHECKOUT" in the prose spec corresponds to the
    /// `WalkingToQueue`/`InQueue`/`Service` states here, since those are the
    /// states in which a shopper legitimately needs to be on the checkout
    /// side of the line.
    pub fn default_cashier_gate(
        checkout_min_x: f32,
        checkout_max_x: f32,
        cashier_line_z: f32,
        bypass_corridor_x: f32,
    ) -> Gate {
        Gate {
            a: Vector2::new(checkout_min_x, cashier_line_z),
            b: Vector2::new(checkout_max_x, cashier_line_z),
            allowed_dir: Vector2::new(0.0, -1.0),
            allowed_states: vec![
                ShopperState::WalkingToQueue,
                ShopperState::InQueue,
                ShopperState::Service,
                ShopperState::Exiting,
            ],
            bypass_point: Vector2::new(bypass_corridor_x, cashier_line_z + 10.0),
        }
    }

    /// Check a shopper's proposed move `p -> q`. Returns `Ok(())` if no gate
    /// forbids the crossing, or `Err(bypass_point)` of the first gate that
    /// denies it.
    pub fn check_crossing(&self, p: Vector2, q: Vector2, state: ShopperState) -> Result<(), Vector2> {
        for gate in &self.gates {
            if !segments_intersect(p, q, gate.a, gate.b) {
                continue;
            }
            let movement = q - p;
            let aligned = movement.dot(gate.allowed_dir) > 0.0;
            let state_ok = gate.allowed_states.contains(&state);
            if !(aligned && state_ok) {
                return Err(gate.bypass_point);
            }
        }
        Ok(())
    }
}

/// Standard segment-segment intersection test via orientation predicates.
fn segments_intersect(p1: Vector2, p2: Vector2, p3: Vector2, p4: Vector2) -> bool {
    fn orient(a: Vector2, b: Vector2, c: Vector2) -> f32 {
        (b.x - a.x) * (c.z - a.z) - (b.z - a.z) * (c.x - a.x)
    }

    let d1 = orient(p3, p4, p1);
    let d2 = orient(p3, p4, p2);
    let d3 = orient(p1, p2, p3);
    let d4 = orient(p1, p2, p4);

    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}
