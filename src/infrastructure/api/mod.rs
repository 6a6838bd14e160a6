mod client;
mod response_policy;
mod transport;

pub use client::*;
pub use response_policy::*;
pub use transport::*;
