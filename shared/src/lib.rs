pub mod constants;
pub mod discount_claim;
pub mod error;
pub mod prize_catalog;
pub mod shared_lucky_wheel;
pub mod spin_animator;
pub mod validation;
pub mod wheel_selector;

pub use error::WheelError;
