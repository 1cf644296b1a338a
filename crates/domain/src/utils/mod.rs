//! Serialization helpers shared by the typed request and response models.

pub mod wire;

pub use wire::{to_form_pairs, FormPairs};
