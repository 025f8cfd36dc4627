// Application layer - component wiring

pub mod container;

pub use container::{AppContainer, DefaultAppContainer};
