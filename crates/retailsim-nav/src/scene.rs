//! Scene ingestion types: the one-time static layout supplied by the scene
//! provider (`spec.md` §1, §6).

use retailsim_core::Vector2;

/// An object placed in the venue. Recognized `kind` strings (case
/// insensitive) classify how `NavGrid::build` treats the object; anything
/// unrecognized is solid with a minimum-footprint expansion (`spec.md` §4.1,
/// §6).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneObject {
    pub name: String,
    pub kind: String,
    pub position: Vector2,
    /// Footprint extents along (x, z) before rotation.
    pub scale: Vector2,
    /// Rotation about the vertical axis, radians.
    pub rotation_y: f32,
}

impl SceneObject {
    /// Classification per `spec.md` §4.1/§6.
    pub fn classify(&self) -> ObjectClass {
        match self.kind.to_ascii_lowercase().as_str() {
            "entrance" | "door" | "floor" | "ground" | "light" | "camera" | "sensor" | "zone"
            | "area" | "region" | "roi" => ObjectClass::Passable,
            "checkout" | "cashier" | "counter" => ObjectClass::SolidCompact,
            _ => ObjectClass::SolidExpand,
        }
    }
}

/// How an object contributes to the occupancy grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectClass {
    /// Never marks cells blocked.
    Passable,
    /// Blocks cells at its natural footprint — no minimum-size expansion, so
    /// shoppers can stand beside checkout counters (`spec.md` §4.1).
    SolidCompact,
    /// Blocks cells, with footprint expanded to at least 1.5 m per axis.
    SolidExpand,
}

/// A region-of-interest polygon. Checkout lanes are defined by
/// `"<Prefix> - Queue"` / `"<Prefix> - Service"` name pairs (`spec.md` §6).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roi {
    pub name: String,
    pub vertices: Vec<Vector2>,
}

impl Roi {
    pub fn centroid(&self) -> Vector2 {
        if self.vertices.is_empty() {
            return Vector2::ZERO;
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector2::ZERO, |acc, v| acc + *v);
        sum.scale(1.0 / self.vertices.len() as f32)
    }
}
