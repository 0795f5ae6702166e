// src/models/mod.rs

pub mod asset;
pub mod banner;
pub mod cart;
pub mod category;
pub mod information;
pub mod order;
pub mod payment;
pub mod post;
pub mod product;
pub mod user;
