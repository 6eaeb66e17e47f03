pub mod gate;
pub mod password;
pub mod token;

pub use gate::{authenticated, Unauthorized};
pub use token::TokenCodec;
