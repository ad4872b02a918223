//! Estimate a business's tax burden today and under the IBS/CBS consumption
//! tax reform, and classify the difference.

pub mod core;
pub mod tax;
