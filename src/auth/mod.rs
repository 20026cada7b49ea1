//! Credential handling
//!
//! One-way password hashing and verification. There are no sessions:
//! signing out is an acknowledgement only.

mod password;

pub use password::{
    hash_password, hash_password_blocking, verify_dummy_password_blocking, verify_password,
    verify_password_blocking,
};
