#![allow(dead_code)]

pub mod generate;

pub use generate::{attenuation_db, random_signal, rms, sine};
