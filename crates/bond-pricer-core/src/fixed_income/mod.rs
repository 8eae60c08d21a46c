pub mod dates;
pub mod pricing;
pub mod schedule;
pub mod tax;
pub mod terms;
