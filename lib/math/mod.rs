pub mod constants;
pub mod curve;
pub mod fixed_point;
pub mod ignition;
pub mod solver;
