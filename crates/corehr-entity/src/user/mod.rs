//! User entity and role enumeration.

pub mod model;
pub mod role;

pub use model::{NewUser, User, UserUpdate};
pub use role::UserRole;
