pub mod admin;
pub mod authorization;
pub mod health;
pub mod organizations;
pub mod reports;
