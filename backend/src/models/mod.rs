pub mod booking;
pub mod macros;
pub mod venue;
pub mod weather;

pub use booking::*;
pub use venue::*;
pub use weather::*;
