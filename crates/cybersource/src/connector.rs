pub mod cybersource;

pub use self::cybersource::Cybersource;
