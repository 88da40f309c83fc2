mod env;
pub use env::Env;

mod order;
pub use order::{Ordered, sorted_by_order, sorted_refs_by_order};
