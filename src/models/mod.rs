// src/models/mod.rs

pub mod certificate;
