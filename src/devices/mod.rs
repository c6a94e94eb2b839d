//! Sensor drivers built on [`RegisterInterface`](crate::RegisterInterface).

pub mod icm20948;
pub mod vcnl4040;

pub use icm20948::{Icm20948, Motion, Vector3};
pub use vcnl4040::Vcnl4040;
