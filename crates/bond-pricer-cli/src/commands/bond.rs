use clap::Args;
use serde_json::Value;

use bond_pricer_core::fixed_income::pricing;
use bond_pricer_core::fixed_income::schedule;

use crate::input;

/// Arguments for coupon schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = input::read_request(args.input.as_deref(), "schedule")?;
    let result = schedule::generate_schedule(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for trade pricing
#[derive(Args)]
pub struct PriceArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = input::read_request(args.input.as_deref(), "price")?;
    let result = pricing::price_trade(&request)?;
    Ok(serde_json::to_value(result)?)
}
