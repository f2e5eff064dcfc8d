pub mod normalize;
pub mod language;
pub mod pattern;
pub mod boundary;
pub mod score;
pub mod matcher;

pub use normalize::*;
pub use language::*;
pub use pattern::*;
pub use boundary::*;
pub use score::*;
pub use matcher::*;
