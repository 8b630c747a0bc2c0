//! Known tool kinds
//!
//! Maps each tool name the bridge knows how to bind to its argument schema.
//! Adding a tool kind is a `register` call; discovery consults the catalogue
//! and drops anything it cannot find.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::tools::ToolInputSchema;

/// JSON type of a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
}

impl ParamType {
    fn json_name(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
        }
    }
}

/// One named parameter of a tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub required: bool,
    pub description: &'static str,
}

impl ParamSpec {
    pub const fn required(name: &'static str, param_type: ParamType, description: &'static str) -> Self {
        Self {
            name,
            param_type,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, param_type: ParamType, description: &'static str) -> Self {
        Self {
            name,
            param_type,
            required: false,
            description,
        }
    }
}

/// Declared argument shape for a tool kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentSchema {
    params: Vec<ParamSpec>,
}

impl ArgumentSchema {
    /// Schema for a tool that takes no arguments
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(params: Vec<ParamSpec>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Check required parameters and the types of declared ones.
    ///
    /// Undeclared fields are not an error; they are forwarded as is.
    /// A `null` optional parameter counts as absent.
    pub fn validate(&self, arguments: &Value) -> Result<(), String> {
        let empty = Map::new();
        let object = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => return Err(format!("arguments must be a JSON object, got {}", other)),
        };

        for param in &self.params {
            match object.get(param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(format!("missing required argument '{}'", param.name));
                }
                None | Some(Value::Null) => {}
                Some(value) if !param.param_type.accepts(value) => {
                    return Err(format!(
                        "argument '{}' must be of type {}",
                        param.name,
                        param.param_type.json_name()
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// JSON schema shown to the orchestrator
    pub fn input_schema(&self) -> ToolInputSchema {
        let mut properties = Map::new();
        for param in &self.params {
            properties.insert(
                param.name.to_string(),
                json!({"type": param.param_type.json_name(), "description": param.description}),
            );
        }
        let required: Vec<String> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.to_string())
            .collect();

        ToolInputSchema {
            schema_type: "object".to_string(),
            properties: Some(Value::Object(properties)),
            required: if required.is_empty() { None } else { Some(required) },
        }
    }
}

/// Registry of tool kinds the bridge can bind
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    kinds: HashMap<String, ArgumentSchema>,
}

impl ToolCatalog {
    /// Create an empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// The HR tool service's tool set
    pub fn hr() -> Self {
        use ParamType::{Integer, String as Text};

        let employee_id = |description| ParamSpec::required("employee_id", Text, description);

        let mut catalog = Self::new();
        catalog.register(
            "get_employee",
            ArgumentSchema::new(vec![employee_id("The employee ID (e.g., emp-001)")]),
        );
        catalog.register(
            "update_employee",
            ArgumentSchema::new(vec![
                employee_id("The employee ID"),
                ParamSpec::optional("title", Text, "New job title"),
                ParamSpec::optional("location", Text, "New location"),
            ]),
        );
        catalog.register("list_departments", ArgumentSchema::empty());
        catalog.register(
            "get_salary",
            ArgumentSchema::new(vec![employee_id("The employee ID")]),
        );
        catalog.register(
            "update_salary",
            ArgumentSchema::new(vec![
                employee_id("The employee ID"),
                ParamSpec::optional("base", Integer, "New base salary"),
                ParamSpec::optional("bonus", Integer, "New bonus amount"),
            ]),
        );
        catalog.register("get_org_chart", ArgumentSchema::empty());
        catalog.register("list_employees", ArgumentSchema::empty());
        catalog.register("list_employees_with_salaries", ArgumentSchema::empty());
        catalog.register("list_employees_by_department", ArgumentSchema::empty());
        catalog
    }

    /// Register (or replace) a tool kind
    pub fn register(&mut self, name: impl Into<String>, schema: ArgumentSchema) {
        self.kinds.insert(name.into(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&ArgumentSchema> {
        self.kinds.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Known names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hr_catalog_contents() {
        let catalog = ToolCatalog::hr();
        assert_eq!(catalog.len(), 9);
        assert!(catalog.contains("list_employees_by_department"));
        assert!(!catalog.contains("unknown_tool_x"));
        assert!(catalog.get("get_org_chart").unwrap().params().is_empty());
        assert_eq!(
            catalog.names(),
            vec![
                "get_employee",
                "get_org_chart",
                "get_salary",
                "list_departments",
                "list_employees",
                "list_employees_by_department",
                "list_employees_with_salaries",
                "update_employee",
                "update_salary",
            ]
        );
    }

    #[test]
    fn test_validate_required_and_types() {
        let catalog = ToolCatalog::hr();
        let update_salary = catalog.get("update_salary").unwrap();

        assert!(update_salary.validate(&json!({"employee_id": "emp-001"})).is_ok());
        assert!(update_salary
            .validate(&json!({"employee_id": "emp-001", "base": 150000, "bonus": null}))
            .is_ok());

        let err = update_salary.validate(&json!({"base": 1})).unwrap_err();
        assert_eq!(err, "missing required argument 'employee_id'");

        let err = update_salary
            .validate(&json!({"employee_id": "emp-001", "base": "lots"}))
            .unwrap_err();
        assert_eq!(err, "argument 'base' must be of type integer");

        assert!(update_salary.validate(&json!(["emp-001"])).is_err());
    }

    #[test]
    fn test_validate_passes_unknown_fields() {
        let schema = ToolCatalog::hr().get("get_employee").unwrap().clone();
        assert!(schema
            .validate(&json!({"employee_id": "emp-002", "include_manager": true}))
            .is_ok());
        assert!(ArgumentSchema::empty().validate(&Value::Null).is_ok());
    }

    #[test]
    fn test_input_schema_shape() {
        let schema = ToolCatalog::hr().get("update_employee").unwrap().input_schema();
        assert_eq!(schema.schema_type, "object");
        assert_eq!(schema.required, Some(vec!["employee_id".to_string()]));
        let props = schema.properties.unwrap();
        assert_eq!(props["title"]["type"], "string");
        assert_eq!(props["employee_id"]["description"], "The employee ID");

        let none = ArgumentSchema::empty().input_schema();
        assert!(none.required.is_none());
        assert_eq!(none.properties, Some(json!({})));
    }
}
