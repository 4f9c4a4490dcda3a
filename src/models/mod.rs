pub mod appointment;
pub mod enums;
pub mod user;

pub use appointment::*;
pub use enums::*;
pub use user::*;
