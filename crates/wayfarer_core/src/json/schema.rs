use schemars::schema_for;

use crate::{json::types, solver::solver_params::AssignmentParams};

pub fn generate_scenario_schema() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(types::JsonScenario))
}

pub fn generate_output_schema() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(types::JsonAssignmentOutput))
}

pub fn generate_params_schema() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(AssignmentParams))
}
