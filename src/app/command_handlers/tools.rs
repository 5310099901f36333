use crate::app::command_support::{event_log, load_settings};
use crate::tools::{PlateReaderClient, VehicleRegistryClient};
use std::fs;
use std::path::Path;

pub fn cmd_vehicle(config: Option<&Path>, args: &[String]) -> Result<String, String> {
    if args.len() != 1 {
        return Err("usage: vehicle <registration_id>".to_string());
    }
    let settings = load_settings(config)?;
    let registry = VehicleRegistryClient::from_settings(&settings, event_log(&settings))
        .map_err(|e| e.to_string())?;
    let owner_id = registry.owner_id(&args[0]).map_err(|e| e.to_string())?;
    Ok(format!("registration_id={}\nowner_id={owner_id}", args[0].trim()))
}

/// `@path` reads the base64 payload from a file.
pub fn cmd_plate(config: Option<&Path>, args: &[String]) -> Result<String, String> {
    if args.len() != 1 {
        return Err("usage: plate <image_base64 | @path>".to_string());
    }
    let image_base64 = match args[0].strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("failed to read image payload {path}: {e}"))?,
        None => args[0].clone(),
    };
    let settings = load_settings(config)?;
    let reader = PlateReaderClient::from_settings(&settings, event_log(&settings))
        .map_err(|e| e.to_string())?;
    let registration_id = reader
        .registration_from_image(&image_base64)
        .map_err(|e| e.to_string())?;
    Ok(format!("registration_id={registration_id}"))
}
