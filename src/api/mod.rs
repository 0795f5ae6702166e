// src/api/mod.rs

pub mod media;
