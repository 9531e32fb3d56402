pub mod audit;
pub mod clients;
pub mod devices;
pub mod flags;
pub mod health;
pub mod notifications;
pub mod organizations;
pub mod staff;
