//! Bracket engine: construction, scoring, text format, draw order and persistence.

mod build;
mod codec;
mod draw;
mod persistence;
mod scoring;

pub use build::{bracket_size, build_bracket, reorganize};
pub use codec::{deserialize, serialize, validate};
pub use draw::DrawOrder;
pub use persistence::{load_bracket, save_bracket};
pub use scoring::{clear_score, is_bye, record_score};
