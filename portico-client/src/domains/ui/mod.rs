pub mod routing;

pub use routing::{GuardDecision, MenuItem, Navigator, Route, guard, menu_items, resolve};
