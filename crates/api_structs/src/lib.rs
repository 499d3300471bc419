mod status;
mod unit;

pub mod dtos {
    pub use crate::unit::dtos::*;
}

pub use crate::status::api::*;
pub use crate::unit::api::*;
