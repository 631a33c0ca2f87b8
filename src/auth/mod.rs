//! Authentication module for fileshare.
//!
//! This module provides password hashing, user registration and
//! database-backed login sessions.

mod password;
mod registration;
mod session;

pub use password::{hash_password, verify_password, PasswordError};
pub use registration::{register, SignupForm};
pub use session::{
    authenticate, cleanup_expired_sessions, login, logout, DEFAULT_SESSION_DURATION_SECS,
    SESSION_COOKIE,
};
