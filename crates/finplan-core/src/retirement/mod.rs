pub mod contributions;
pub mod limits;
pub mod ppk;
pub mod simulation;
