//! Media file inspection module

pub mod inspector;

pub use inspector::MediaProbe;
