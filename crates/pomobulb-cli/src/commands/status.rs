use serde_json::{json, Value};
use std::path::Path;

use pomobulb_core::payload::{decode_hsv, dp};
use pomobulb_core::{BulbChannel, SmartBulbNotifier};

use super::{load_config, CommandResult};

/// Query one bulb and print its data points.
pub fn run(config_path: Option<&Path>, bulb_name: &str) -> CommandResult {
    let status = query(config_path, bulb_name)?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn query(config_path: Option<&Path>, bulb_name: &str) -> pomobulb_core::error::Result<Value> {
    let config = load_config(config_path)?;
    let bulb = config.smart_bulb(Some(bulb_name))?;
    let mut notifier = SmartBulbNotifier::new(bulb)?;

    let mut status = notifier.status()?;
    annotate_colour(&mut status);
    Ok(status)
}

/// Add the decoded colour data point next to the raw reply.
fn annotate_colour(status: &mut Value) {
    let Some((hue, saturation, value)) = status
        .get("dps")
        .and_then(|dps| dps.get(dp::COLOUR))
        .and_then(Value::as_str)
        .and_then(decode_hsv)
    else {
        return;
    };
    if let Some(obj) = status.as_object_mut() {
        obj.insert(
            "colour".into(),
            json!({ "hue": hue, "saturation": saturation, "value": value }),
        );
    }
}
