//! Data models

mod brand;
mod company;
mod fact;
mod proposal;
mod rule;
mod server;
mod tenant;

pub use brand::*;
pub use company::*;
pub use fact::*;
pub use proposal::*;
pub use rule::*;
pub use server::*;
pub use tenant::*;
