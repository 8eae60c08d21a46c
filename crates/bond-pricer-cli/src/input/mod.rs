pub mod file;
pub mod stdin;

use bond_pricer_core::fixed_income::terms::PricingRequest;

/// Read a pricing request from `--input <file.json>` or piped stdin.
pub fn read_request(
    path: Option<&str>,
    command: &str,
) -> Result<PricingRequest, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        file::read_json(path)
    } else if let Some(data) = stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err(format!("--input <file.json> or stdin required for {command}").into())
    }
}
