pub mod bond;
pub mod report;
