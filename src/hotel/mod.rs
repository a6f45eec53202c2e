pub mod directory;
pub mod model;
pub mod routes;


pub use directory::{HotelDirectory, HotelError};
