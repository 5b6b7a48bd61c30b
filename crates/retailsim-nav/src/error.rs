use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("grid has zero cells for world {w}x{d} at resolution {res}")]
    EmptyGrid { w: f32, d: f32, res: f32 },
}

pub type NavResult<T> = Result<T, NavError>;
