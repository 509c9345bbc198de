pub mod create_user;
pub mod initdb;
pub mod serve;

pub use create_user::{create_account, AccountKind};
pub use initdb::init_database;
pub use serve::serve;
