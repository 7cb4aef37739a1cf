pub mod api;
pub mod auth;
pub mod checkout;
pub mod config;
pub mod db;
pub mod engine;
pub mod entities;
pub mod error;
pub mod external;
pub mod notify;
pub mod reference;
pub mod seal;
pub mod server;
