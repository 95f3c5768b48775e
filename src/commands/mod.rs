pub mod build;
pub mod cleanup;
pub mod doctor;
pub mod emergency;
pub mod validate;
