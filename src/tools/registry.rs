use super::{decode_response, join_url, ToolError};
use crate::config::{Settings, ENV_REGISTRY_URL};
use crate::egress::egress_safe_agent;
use crate::shared::EventLog;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TOOL: &str = "vehicle registry";

/// Vehicle enquiry response. Only `registration_number` drives the lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    #[serde(default)]
    pub registration_number: String,
    #[serde(default)]
    pub tax_status: String,
    #[serde(default)]
    pub mot_status: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub year_of_manufacture: i32,
    #[serde(default)]
    pub engine_capacity: i32,
    #[serde(default, rename = "co2Emissions")]
    pub co2_emissions: i32,
    #[serde(default)]
    pub fuel_type: String,
    #[serde(default)]
    pub marked_for_export: bool,
    #[serde(default)]
    pub colour: String,
    #[serde(default)]
    pub type_approval: String,
    #[serde(default)]
    pub euro_status: i32,
    #[serde(default, rename = "dateOfLastV5CIssued")]
    pub date_of_last_v5c_issued: String,
    #[serde(default)]
    pub mot_expiry_date: String,
    #[serde(default)]
    pub wheelplan: String,
    #[serde(default)]
    pub month_of_first_registration: String,
}

/// Placeholder ownership mapping until a real owner source exists.
pub fn owner_id_for_registration(registration: &str) -> Option<String> {
    let registration = registration.trim();
    (registration.len() > 3).then(|| format!("OWNER-{}", registration.to_uppercase()))
}

/// Registry lookups go through the literal-address-only agent: the registry
/// base URL must be an IP literal.
#[derive(Debug, Clone)]
pub struct VehicleRegistryClient {
    base_url: String,
    agent: ureq::Agent,
    log: EventLog,
}

impl VehicleRegistryClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        connect_timeout: Duration,
        log: EventLog,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            agent: egress_safe_agent(timeout, connect_timeout, log.clone()),
            log,
        }
    }

    pub fn from_settings(settings: &Settings, log: EventLog) -> Result<Self, ToolError> {
        let registry = &settings.registry;
        let base_url = registry
            .configured_base_url()
            .ok_or(ToolError::NotConfigured {
                tool: TOOL,
                setting: ENV_REGISTRY_URL,
            })?;
        Ok(Self::new(
            base_url,
            registry.timeout(),
            registry.connect_timeout(),
            log,
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn lookup_vehicle(&self, registration: &str) -> Result<VehicleRecord, ToolError> {
        let registration = registration.trim();
        if registration.is_empty() {
            return Err(ToolError::EmptyInput { tool: TOOL });
        }
        let url = join_url(
            &self.base_url,
            &format!(
                "vehicle-enquiry/v1/vehicles/{}",
                urlencoding::encode(registration)
            ),
        );
        let outcome = self.agent.get(&url).set("Accept", "application/json").call();
        decode_response(TOOL, "GET", &url, outcome, &self.log)
    }

    pub fn owner_id(&self, registration: &str) -> Result<String, ToolError> {
        let record = self.lookup_vehicle(registration)?;
        owner_id_for_registration(&record.registration_number).ok_or(
            ToolError::UnmappedRegistration {
                registration: record.registration_number,
            },
        )
    }
}
