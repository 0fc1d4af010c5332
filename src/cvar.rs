//! Runtime configuration variables

use hashbrown::HashMap;

/// A named runtime variable
#[derive(Debug, Clone)]
pub struct Cvar {
    pub name: String,
    pub value: String,
    /// Published into serverinfo when registered
    pub serverinfo: bool,
}

/// Variable table keyed by name
#[derive(Debug, Default)]
pub struct CvarTable {
    vars: HashMap<String, Cvar>,
}

impl CvarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variable. An existing registration keeps its current value.
    pub fn register(&mut self, name: &str, default: &str, serverinfo: bool) -> &Cvar {
        self.vars.entry(name.to_string()).or_insert_with(|| Cvar {
            name: name.to_string(),
            value: default.to_string(),
            serverinfo,
        })
    }

    pub fn find(&self, name: &str) -> Option<&Cvar> {
        self.vars.get(name)
    }

    /// Set an existing variable, returning false when it is unknown
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        match self.vars.get_mut(name) {
            Some(var) => {
                var.value = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn value(&self, name: &str) -> &str {
        self.vars.get(name).map(|v| v.value.as_str()).unwrap_or("")
    }

    /// Variables flagged for serverinfo, sorted by name
    pub fn serverinfo_vars(&self) -> Vec<&Cvar> {
        let mut vars: Vec<&Cvar> = self.vars.values().filter(|v| v.serverinfo).collect();
        vars.sort_by(|a, b| a.name.cmp(&b.name));
        vars
    }
}
