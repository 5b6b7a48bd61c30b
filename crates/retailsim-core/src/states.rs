//! Shopper FSM state enum (`spec.md` §4.6).
//!
//! Lives in `retailsim-core` (rather than `retailsim-agents`, where the FSM
//! itself is implemented) because `retailsim-nav`'s `GateManager` must also
//! reference it — a gate's `allowed_states` set names exactly the states a
//! crossing agent may be in. This mirrors `dt-core::TransportMode`: a small
//! enum shared by multiple crates that would otherwise need a dependency
//! cycle to agree on it.

/// Shopper lifecycle state. `spec.md` §4.6:
/// `SPAWN -> ENTERING -> BROWSING -> {WALKING_TO_QUEUE -> IN_QUEUE -> SERVICE
/// -> EXITING} | EXITING -> DONE`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShopperState {
    Spawn,
    Entering,
    Browsing,
    WalkingToQueue,
    InQueue,
    Service,
    Exiting,
    Done,
}

impl ShopperState {
    pub fn as_str(self) -> &'static str {
        match self {
            ShopperState::Spawn => "SPAWN",
            ShopperState::Entering => "ENTERING",
            ShopperState::Browsing => "BROWSING",
            ShopperState::WalkingToQueue => "WALKING_TO_QUEUE",
            ShopperState::InQueue => "IN_QUEUE",
            ShopperState::Service => "SERVICE",
            ShopperState::Exiting => "EXITING",
            ShopperState::Done => "DONE",
        }
    }
}

impl std::fmt::Display for ShopperState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cashier shift FSM state (`spec.md` §4.7).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CashierState {
    OffShift,
    Arrive,
    Working,
    Break,
    Return,
    Leave,
    Done,
}

impl CashierState {
    pub fn as_str(self) -> &'static str {
        match self {
            CashierState::OffShift => "OFFSHIFT",
            CashierState::Arrive => "ARRIVE",
            CashierState::Working => "WORKING",
            CashierState::Break => "BREAK",
            CashierState::Return => "RETURN",
            CashierState::Leave => "LEAVE",
            CashierState::Done => "DONE",
        }
    }
}

impl std::fmt::Display for CashierState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
