use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board area must be positive, got {width}x{height}")]
    InvalidArea { width: i32, height: i32 },
    #[error("widget '{0}' already exists")]
    DuplicateWidget(String),
    #[error("widget '{name}' must have a positive size, got {width}x{height}")]
    EmptyWidget {
        name: String,
        width: i32,
        height: i32,
    },
    #[error("widget '{name}' does not fit inside the board")]
    WidgetTooLarge { name: String },
}
