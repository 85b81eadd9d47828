pub mod limits;
pub mod manager;
pub mod var;
