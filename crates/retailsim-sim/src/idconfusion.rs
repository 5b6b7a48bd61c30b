//! `IDConfusion` — per (shopper, cashier) proximity confusion events
//! (`spec.md` §4.9).

use std::collections::HashMap;

use retailsim_core::{AgentId, SimRng, Vector2};

use crate::config::IdConfusionConfig;

/// An unordered pair key: `(min(a,b), max(a,b))`.
type PairKey = (AgentId, AgentId);

fn pair_key(a: AgentId, b: AgentId) -> PairKey {
    if a.0 <= b.0 { (a, b) } else { (b, a) }
}

#[derive(Clone, Copy, Debug)]
enum Confusion {
    /// Emitted ids of the pair are swapped while active.
    Swap,
    /// The named agent's track is dropped while active.
    Occlusion(AgentId),
}

#[derive(Clone, Debug)]
struct ActiveEvent {
    kind: Confusion,
    remaining: f32,
}

/// Tracks active swap/occlusion events keyed by the unordered agent pair.
/// `Simulator::update` ticks this after shoppers/cashiers move; `apply`
/// transforms the emitted id (and drops occluded messages) during
/// `track_messages`.
#[derive(Clone, Debug, Default)]
pub struct IDConfusion {
    events: HashMap<PairKey, ActiveEvent>,
}

impl IDConfusion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll for new confusion events among nearby pairs, and age out expired
    /// ones. `pairs` is every (shopper_pos, shopper_id, cashier_pos,
    /// cashier_id) combination live this tick.
    pub fn tick(
        &mut self,
        dt: f32,
        config: &IdConfusionConfig,
        shoppers: &[(AgentId, Vector2)],
        cashiers: &[(AgentId, Vector2)],
        rng: &mut SimRng,
    ) {
        if !config.enabled {
            self.events.clear();
            return;
        }

        self.events.retain(|_, ev| {
            ev.remaining -= dt;
            ev.remaining > 0.0
        });

        for &(shopper_id, shopper_pos) in shoppers {
            for &(cashier_id, cashier_pos) in cashiers {
                let key = pair_key(shopper_id, cashier_id);
                if self.events.contains_key(&key) {
                    continue;
                }
                if shopper_pos.distance(cashier_pos) >= config.proximity {
                    continue;
                }
                if !rng.gen_bool(config.probability_per_sec * dt as f64) {
                    continue;
                }
                let kind = if rng.gen_bool(0.5) {
                    Confusion::Swap
                } else if rng.gen_bool(0.5) {
                    Confusion::Occlusion(shopper_id)
                } else {
                    Confusion::Occlusion(cashier_id)
                };
                let remaining = match kind {
                    Confusion::Swap => {
                        rng.gen_range(config.swap_duration.0..config.swap_duration.1)
                    }
                    Confusion::Occlusion(_) => {
                        rng.gen_range(config.occlusion_duration.0..config.occlusion_duration.1)
                    }
                };
                self.events.insert(key, ActiveEvent { kind, remaining });
            }
        }
    }

    /// Applied per emitted message: returns `Some(effective_id)` the message
    /// should report in place of `owner`'s own id, or `None` if the message
    /// should be dropped this tick (occluded).
    pub fn effective_id(&self, owner: AgentId, other: AgentId) -> Option<AgentId> {
        let key = pair_key(owner, other);
        match self.events.get(&key) {
            Some(ActiveEvent { kind: Confusion::Swap, .. }) => Some(other),
            Some(ActiveEvent { kind: Confusion::Occlusion(occluded), .. }) if *occluded == owner => None,
            _ => Some(owner),
        }
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distant_pair_never_confuses() {
        let mut ic = IDConfusion::new();
        let (mut rng, _) = SimRng::new(Some(1));
        let config = IdConfusionConfig { probability_per_sec: 1.0, ..IdConfusionConfig::default() };
        for _ in 0..50 {
            ic.tick(
                0.1,
                &config,
                &[(AgentId(1), Vector2::new(0.0, 0.0))],
                &[(AgentId(2), Vector2::new(10.0, 10.0))],
                &mut rng,
            );
        }
        assert_eq!(ic.active_count(), 0);
    }

    #[test]
    fn close_pair_with_certainty_eventually_confuses() {
        let mut ic = IDConfusion::new();
        let (mut rng, _) = SimRng::new(Some(2));
        // per-tick probability = probability_per_sec * dt, clamped to 1.0 —
        // a large rate makes the very first tick certain to confuse.
        let config = IdConfusionConfig { probability_per_sec: 100.0, ..IdConfusionConfig::default() };
        for _ in 0..5 {
            ic.tick(
                0.1,
                &config,
                &[(AgentId(1), Vector2::new(0.0, 0.0))],
                &[(AgentId(2), Vector2::new(0.1, 0.1))],
                &mut rng,
            );
        }
        assert_eq!(ic.active_count(), 1);
    }

    #[test]
    fn disabled_config_clears_and_skips_new_events() {
        let mut ic = IDConfusion::new();
        let (mut rng, _) = SimRng::new(Some(3));
        let always = IdConfusionConfig { probability_per_sec: 100.0, ..IdConfusionConfig::default() };
        ic.tick(
            0.1,
            &always,
            &[(AgentId(1), Vector2::new(0.0, 0.0))],
            &[(AgentId(2), Vector2::new(0.0, 0.0))],
            &mut rng,
        );
        assert_eq!(ic.active_count(), 1);

        let disabled = IdConfusionConfig { enabled: false, ..IdConfusionConfig::default() };
        ic.tick(0.1, &disabled, &[], &[], &mut rng);
        assert_eq!(ic.active_count(), 0);
    }
}
