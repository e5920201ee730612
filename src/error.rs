use std::path::PathBuf;

/// Errors surfaced by image I/O, feature export parsing and control surfaces.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("couldn't load image {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("couldn't save image {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A feature export that doesn't follow the text format. `line` is 1-based.
    #[error("malformed feature export at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("control surface failure: {0}")]
    Control(String),
}

pub type Result<T> = std::result::Result<T, Error>;
