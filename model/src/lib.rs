pub mod balance;
pub mod luhn;
pub mod order;
pub mod user;
pub mod withdraw;

pub use balance::Balance;
pub use order::{Order, OrderStatus};
pub use user::Credentials;
pub use withdraw::{Withdraw, WithdrawRequest};
