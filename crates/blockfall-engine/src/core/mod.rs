pub use self::{board::*, piece::*};

pub(crate) mod board;
pub mod collision;
pub(crate) mod piece;
