//! JSON Schema for configuration documents.
//!
//! The schema describes the *resolved* shape: `extends` is accepted so raw
//! documents can be checked by editors, but the legacy `goma`/`reclient`
//! keys are not, since sanitization removes them before validation.

use serde_json::{json, Value};

use crate::core::document::{RemoteBuild, ValidationPolicy, BUILDTOOLS_ENV_KEY, SCHEMA_REF};

/// Returns the JSON schema for configuration documents.
pub fn config_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "$id": SCHEMA_REF,
        "title": "berth build configuration",
        "type": "object",
        "additionalProperties": false,
        "required": ["root", "gen", "env", "remoteBuild"],
        "properties": {
            "$schema": {
                "type": "string",
                "description": "Schema reference for editors."
            },
            "root": {
                "type": "string",
                "minLength": 1,
                "description": "Root of the managed source tree."
            },
            "remoteBuild": {
                "type": "string",
                "enum": RemoteBuild::VARIANTS,
                "description": "Remote-execution backend, or \"none\" to build locally."
            },
            "gen": {
                "type": "object",
                "additionalProperties": false,
                "required": ["args", "out"],
                "properties": {
                    "args": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Generator arguments."
                    },
                    "out": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Output directory name under <root>/src/out."
                    }
                }
            },
            "env": {
                "type": "object",
                "required": [BUILDTOOLS_ENV_KEY],
                "additionalProperties": { "type": "string" },
                "properties": {
                    "CHROMIUM_BUILDTOOLS_PATH": { "type": "string", "minLength": 1 }
                }
            },
            "remotes": {
                "type": "object",
                "description": "Named VCS remotes. At most one may carry a fork.",
                "additionalProperties": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["origin"],
                    "properties": {
                        "origin": { "type": "string", "minLength": 1 },
                        "fork": { "type": "string", "minLength": 1 }
                    }
                }
            },
            "extends": {
                "type": "string",
                "minLength": 1,
                "description": "Name of the configuration this one inherits from."
            },
            "configValidationLevel": {
                "type": "string",
                "enum": ValidationPolicy::VARIANTS
            },
            "defaultTarget": { "type": "string", "minLength": 1 },
            "rbeHelperPath": { "type": "string", "minLength": 1 },
            "rbeServiceAddress": { "type": "string", "minLength": 1 },
            "rbeInstance": { "type": "string", "minLength": 1 }
        }
    })
}
