//! Data models for CradleWatch

mod alert;
mod contact;
mod reading;

pub use alert::*;
pub use contact::*;
pub use reading::*;
