pub mod generate;
pub mod initdb;
pub mod serve;

pub use generate::generate_expected;
pub use initdb::init_database;
pub use serve::serve;
