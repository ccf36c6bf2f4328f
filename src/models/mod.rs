pub mod product;
pub mod catalog;
pub mod cart;
pub mod pending;
pub mod summary;
pub mod state;

// Re-exports
pub use product::*;
pub use catalog::*;
pub use cart::*;
pub use pending::*;
pub use summary::*;
pub use state::*;
