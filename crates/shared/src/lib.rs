//! Value types shared between the tracking engine and its UI-side consumers.

pub mod domain;
pub mod error;
pub mod protocol;
