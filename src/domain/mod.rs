pub mod orientation;
pub mod profile;
pub mod room;
pub mod units;

pub use orientation::*;
pub use profile::*;
pub use room::*;
pub use units::*;
