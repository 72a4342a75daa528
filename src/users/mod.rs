//! Account directory backing the admin API

pub mod store;

pub use store::{UserStore, ADMIN_USERNAME};
