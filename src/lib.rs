pub mod destroyable;
pub mod events;
pub mod game;
pub mod model;
pub mod store;
pub mod ui;
