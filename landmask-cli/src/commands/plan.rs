//! Plan command - print export jobs as JSON without submitting.

use std::path::PathBuf;

use landmask::catalog::Year;
use landmask::display::{present, RecordingDisplay};
use landmask::driver::{BoundInputs, ExportDriver};
use landmask::export::ExportParams;
use landmask::platform::RecordingSubmitter;
use serde_json::{json, Value};

use super::common::{bind_inputs, platform, resolve_inputs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the plan command.
pub fn run(polygons_file: Option<PathBuf>, years: Option<Vec<Year>>) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("plan");
    let config = runner.config();

    let spec = resolve_inputs(config, polygons_file.as_ref(), years);
    let platform = platform(config)?;
    let inputs = runner.block_on(bind_inputs(&platform, &spec, polygons_file.is_some()))?;

    let document = plan_document(&inputs, config.export_params());
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

/// Map layers, view center and export jobs as one JSON document.
fn plan_document(inputs: &BoundInputs, params: ExportParams) -> Value {
    let mut display = RecordingDisplay::new();
    present(&mut display, &inputs.aois, &inputs.mask);

    let layers: Vec<Value> = display
        .layers
        .iter()
        .map(|layer| {
            json!({
                "name": layer.name,
                "source": layer.source.to_string(),
                "style": layer.style.to_string(),
            })
        })
        .collect();
    let bounds = display
        .center
        .map(|r| json!([r.min().x, r.min().y, r.max().x, r.max().y]));

    let driver = ExportDriver::new(RecordingSubmitter::new(), params);
    let jobs = driver.plan(inputs);

    json!({
        "layers": layers,
        "bounds": bounds,
        "jobs": jobs,
    })
}
