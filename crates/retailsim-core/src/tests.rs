//! Unit tests for retailsim-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, LaneId};

    #[test]
    fn ordering() {
        assert!(AgentId(0) < AgentId(1));
        assert!(LaneId(2) > LaneId(1));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(LaneId::INVALID.0, u32::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::Vector2;

    #[test]
    fn zero_distance() {
        let p = Vector2::new(10.0, 5.0);
        assert!(p.distance(p) < 1e-6);
    }

    #[test]
    fn pythagoras() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn normalized_is_unit_length() {
        let v = Vector2::new(3.0, 4.0).normalized();
        assert!((v.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn normalized_zero_vector_stays_zero() {
        assert_eq!(Vector2::ZERO.normalized(), Vector2::ZERO);
    }

    #[test]
    fn perp_is_orthogonal() {
        let v = Vector2::new(2.0, 5.0);
        assert!(v.dot(v.perp()).abs() < 1e-5);
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng, SimRng};

    #[test]
    fn same_seed_same_sequence() {
        let mut a = AgentRng::new(42, AgentId(3));
        let mut b = AgentRng::new(42, AgentId(3));
        for _ in 0..20 {
            assert_eq!(a.gen_range(0..1000), b.gen_range(0..1000));
        }
    }

    #[test]
    fn different_agents_diverge() {
        let mut a = AgentRng::new(42, AgentId(1));
        let mut b = AgentRng::new(42, AgentId(2));
        let seq_a: Vec<u32> = (0..10).map(|_| a.gen_range(0..u32::MAX)).collect();
        let seq_b: Vec<u32> = (0..10).map(|_| b.gen_range(0..u32::MAX)).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let (mut r1, seed1) = SimRng::new(Some(7));
        let (mut r2, seed2) = SimRng::new(Some(7));
        assert_eq!(seed1, seed2);
        for _ in 0..20 {
            assert_eq!(r1.gen_range(0..1000), r2.gen_range(0..1000));
        }
    }
}

#[cfg(test)]
mod time {
    use crate::SimClock;

    #[test]
    fn advances_tick_and_elapsed() {
        let mut clock = SimClock::new();
        for _ in 0..10 {
            clock.advance(0.1);
        }
        assert_eq!(clock.current_tick.0, 10);
        assert!((clock.elapsed_secs - 1.0).abs() < 1e-6);
        assert_eq!(clock.timestamp_ms(), 1000);
    }
}
