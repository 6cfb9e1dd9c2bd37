pub mod accounts;
pub mod expected;
pub mod health;
pub mod templates;
pub mod users;
