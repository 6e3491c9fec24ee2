pub mod analyze;
pub mod explain;
pub mod fragments;
pub mod outline;
