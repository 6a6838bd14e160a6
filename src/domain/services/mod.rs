mod formatting;
mod retry;
mod uploads;

pub use formatting::*;
pub use retry::*;
pub use uploads::*;
