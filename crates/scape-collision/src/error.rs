use std::io;

/// Errors raised by the direction grid and the region store.
#[derive(thiserror::Error, Debug)]
pub enum CollisionError {
    /// An axis value fell outside the grid's declared extents.
    #[error("index out of range: ({x}, {y}, {z}, {w})")]
    OutOfRange { x: i32, y: i32, z: i32, w: i32 },
    /// A serialized buffer did not match the fixed region layout.
    #[error("malformed region data: {0}")]
    Format(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
