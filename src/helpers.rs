pub mod errors;
pub mod figure;
pub mod params;
