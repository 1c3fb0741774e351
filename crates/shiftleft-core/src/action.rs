use serde::{Deserialize, Serialize};

use crate::stage::Stage;

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// One fixed external command line. `program` is looked up on the search
/// path by name; the orchestrator substitutes the resolved path at run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            return self.program.clone();
        }
        format!("{} {}", self.program, self.args.join(" "))
    }
}

// ---------------------------------------------------------------------------
// InstallRecipe / Tool
// ---------------------------------------------------------------------------

/// Best-effort install command for a missing tool, e.g. `pip3 install pytest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecipe {
    pub program: String,
    pub args: Vec<String>,
}

impl InstallRecipe {
    pub fn pip(package: &str) -> Self {
        Self {
            program: "pip3".to_string(),
            args: vec!["install".to_string(), package.to_string()],
        }
    }

    pub fn command_line(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<InstallRecipe>,
}

impl Tool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            install: None,
        }
    }

    pub fn installable(name: impl Into<String>, recipe: InstallRecipe) -> Self {
        Self {
            name: name.into(),
            install: Some(recipe),
        }
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The unit of work behind a concrete stage.
///
/// `tools` lists every binary the steps need, in order of first use. All of
/// them are checked before the first step runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub stage: Stage,
    pub summary: String,
    pub tools: Vec<Tool>,
    pub steps: Vec<Invocation>,
}

impl Action {
    pub fn tool(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }
}
