pub mod csv;
pub mod replay;
