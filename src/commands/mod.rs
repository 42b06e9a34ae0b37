pub mod prune_history;
pub mod seed_demo;
pub mod serve;

pub use prune_history::handle_prune_history;
pub use seed_demo::handle_seed_demo;
pub use serve::handle_serve;
