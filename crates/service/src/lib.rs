//! Service layer providing the food catalog workflows on top of models.
//! - Separates business logic from data access and from the hosted image service.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod food;
pub mod image;
#[cfg(test)]
pub mod test_support;
