//! `retailsim-agents` — persona config, the `Shopper` and `Cashier` finite
//! state machines, and stuck/oscillation recovery.
//!
//! # Crate layout
//!
//! | Module        | Contents                                               |
//! |----------------|--------------------------------------------------------|
//! | [`persona`]    | `Persona`, `PersonaConfig`, `PersonaTable`               |
//! | [`config`]     | `ShopperConfig`, `CashierConfig`, `AntiGlitchConfig`     |
//! | [`antiglitch`] | `AntiGlitch`, `RecoveryAction` — stuck/oscillation repair|
//! | [`path`]       | Multi-leg A* planning helpers                           |
//! | [`shopper`]    | `Shopper`, `ShopperContext`                              |
//! | [`cashier`]    | `Cashier`, `ManualCommand`                               |
//! | [`error`]      | `AgentError`, `AgentResult`                              |

pub mod antiglitch;
pub mod cashier;
pub mod config;
pub mod error;
pub mod path;
pub mod persona;
pub mod shopper;

#[cfg(test)]
mod tests;

pub use antiglitch::{AntiGlitch, RecoveryAction};
pub use cashier::{Cashier, ManualCommand};
pub use config::{AntiGlitchConfig, CashierConfig, ShopperConfig};
pub use error::{AgentError, AgentResult};
pub use persona::{Persona, PersonaConfig, PersonaTable};
pub use shopper::{Shopper, ShopperContext};
