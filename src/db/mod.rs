pub mod challenges;
pub mod pool;
pub mod users;
pub mod weights;

pub use pool::create_pool;
