use clap::Args;
use serde_json::Value;

use finplan_core::retirement::simulation::{self, SimulationRequest};

use crate::input;

/// Arguments for the retirement projection.
///
/// The request is list-shaped (one entry per account), so it arrives as
/// JSON rather than flags; see the `SimulationRequest` wire format.
#[derive(Args)]
pub struct RetirementArgs {
    /// Path to a JSON file with the full simulation request
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_retirement(args: RetirementArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SimulationRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_piped()? {
        serde_json::from_value(data)?
    } else {
        return Err("provide --input <file.json> or pipe a simulation request on stdin".into());
    };

    let output = simulation::run_simulation(&request)?;
    Ok(serde_json::to_value(&output)?)
}
