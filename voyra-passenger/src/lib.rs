pub mod grouping;
pub mod model;
pub mod palette;
pub mod repository;

pub use grouping::assign_group_colors;
pub use model::{DepartureScope, Passenger};
pub use palette::GroupPalette;
