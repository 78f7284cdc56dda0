pub mod basic;
pub mod bloom;
pub mod light;
