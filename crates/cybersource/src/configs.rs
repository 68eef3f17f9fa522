pub mod defaults;
pub mod settings;
pub mod validations;
