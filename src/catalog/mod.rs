pub mod types;
pub mod traits;
pub mod memory;
pub mod mutation;

pub use types::*;
pub use traits::*;
pub use memory::*;
pub use mutation::*;
