use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    #[error("interaction region must have a positive size, got {width}x{height}")]
    NonPositiveSize { width: f32, height: f32 },
    #[error("interaction region values must be finite")]
    NonFinite,
    #[error("malformed interaction region '{0}': expected x,y,width,height")]
    Malformed(String),
}
