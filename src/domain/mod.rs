pub mod address;
pub mod errors;
pub mod network;
pub mod token;
pub mod token_list;

pub use network::*;
pub use token::*;
pub use token_list::*;
