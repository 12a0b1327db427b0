pub mod appointment;
pub mod emergency;
pub mod enums;
pub mod medication;
pub mod report;
pub mod user;

pub use appointment::*;
pub use emergency::*;
pub use enums::*;
pub use medication::*;
pub use report::*;
pub use user::*;
