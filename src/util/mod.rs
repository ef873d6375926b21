//! Various useful things.

pub mod base64;
pub mod hex;
pub mod int;
pub mod pem;
