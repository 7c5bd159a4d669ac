// src/lib.rs
pub mod errors;
pub mod frontend;
pub mod identity;
pub mod sema;
