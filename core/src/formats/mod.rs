pub mod dat;
pub mod header;
