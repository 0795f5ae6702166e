// src/handlers/mod.rs

pub mod assets;
pub mod auth;
pub mod banners;
pub mod cart;
pub mod categories;
pub mod dashboard;
pub mod information;
pub mod orders;
pub mod payments;
pub mod posts;
pub mod products;
pub mod users;
