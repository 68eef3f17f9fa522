pub mod decision;
pub mod payments;
pub mod validation;
