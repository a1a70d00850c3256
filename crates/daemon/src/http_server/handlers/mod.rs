mod not_found;

pub use not_found::{method_not_allowed_handler, not_found_handler};
