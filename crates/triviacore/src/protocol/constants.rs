//! Protocol constants

/// Size of the big-endian type code that starts every frame
pub const TYPE_SIZE: usize = 2;

/// Fixed body length; both ends must be built with the same value
pub const BODY_SIZE: usize = 512;

/// Total size of one frame on the wire
pub const FRAME_SIZE: usize = TYPE_SIZE + BODY_SIZE;

/// Default server port
pub const DEFAULT_PORT: u16 = 5600;

/// Option letters a player may answer with
pub const ANSWER_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];
