//! Route handlers, one module per collection.

pub mod appointments;
pub mod observations;
pub mod patients;
pub mod reference;
pub mod system;
