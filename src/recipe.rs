//! Recipe documents: the declarative list of column actions for a release.
//!
//! A recipe is JSON of the form
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "actions": {
//!     "drop": ["notes", "free_text_.*"],
//!     "rename": [{"sensor_(\\d+)": "s\\1"}],
//!     "obfuscate": ["site"],
//!     "skip-scaling": ["year"],
//!     "drop-constant-columns": true,
//!     "disable-scaling": false
//!   }
//! }
//! ```
//!
//! The document is validated against [`RECIPE_SCHEMA`] before it is mapped onto
//! typed structures, and every pattern is compiled up front so that a bad
//! expression fails the run before any data is touched.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Error;
use crate::matcher::{compile_full, ColumnMatcher};
use crate::types::Result;

/// JSON schema every recipe must satisfy
pub static RECIPE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let pattern_list = json!({ "type": "array", "items": { "type": "string" } });
    json!({
        "type": "object",
        "required": ["version", "actions"],
        "properties": {
            "version": { "type": "string" },
            "actions": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "drop": pattern_list,
                    "rename": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "minProperties": 1,
                            "maxProperties": 1,
                            "additionalProperties": { "type": "string" }
                        }
                    },
                    "obfuscate": pattern_list,
                    "skip-scaling": pattern_list,
                    "no-scaling": pattern_list,
                    "drop-constant-columns": { "type": "boolean" },
                    "disable-scaling": { "type": "boolean" }
                }
            }
        }
    })
});

#[derive(Debug, Deserialize)]
struct RecipeDocument {
    version: String,
    actions: ActionsDocument,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ActionsDocument {
    #[serde(default)]
    drop: Vec<String>,
    #[serde(default)]
    rename: Vec<BTreeMap<String, String>>,
    #[serde(default)]
    obfuscate: Vec<String>,
    #[serde(default)]
    skip_scaling: Vec<String>,
    #[serde(default)]
    no_scaling: Vec<String>,
    #[serde(default)]
    drop_constant_columns: bool,
    #[serde(default)]
    disable_scaling: bool,
}

/// One `pattern -> replacement` rename rule
#[derive(Debug, Clone)]
pub struct RenameRule {
    pattern: String,
    replacement: String,
    full: Regex,
    search: Regex,
}

impl RenameRule {
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        let full = compile_full(pattern)?;
        let search = Regex::new(pattern)
            .map_err(|e| Error::Config(format!("invalid pattern '{pattern}': {e}")))?;
        Ok(Self {
            pattern: pattern.to_string(),
            replacement: translate_backrefs(replacement),
            full,
            search,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the rule applies to the column `name`
    pub fn matches(&self, name: &str) -> bool {
        self.full.is_match(name)
    }

    /// Substitute every match of the pattern in `name` with the replacement
    pub fn apply(&self, name: &str) -> String {
        self.search
            .replace_all(name, self.replacement.as_str())
            .into_owned()
    }
}

/// Rewrite `\1` and `\g<name>` backreferences into `${1}` / `${name}`.
///
/// Native `$1` / `${name}` references pass through untouched and `\\` is a
/// literal backslash.
fn translate_backrefs(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(d) if d.is_ascii_digit() => {
                let mut group = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    group.push(d);
                    chars.next();
                }
                out.push_str(&format!("${{{group}}}"));
            }
            Some('g') => {
                chars.next();
                if chars.peek() == Some(&'<') {
                    chars.next();
                    let name: String = chars.by_ref().take_while(|&n| n != '>').collect();
                    out.push_str(&format!("${{{name}}}"));
                } else {
                    out.push_str("\\g");
                }
            }
            Some('\\') => {
                chars.next();
                out.push('\\');
            }
            _ => out.push('\\'),
        }
    }

    out
}

/// The typed action set of a recipe
#[derive(Debug, Clone, Default)]
pub struct Actions {
    pub drop: ColumnMatcher,
    pub rename: Vec<RenameRule>,
    pub obfuscate: ColumnMatcher,
    pub skip_scaling: ColumnMatcher,
    pub drop_constant_columns: bool,
    pub disable_scaling: bool,
}

/// A validated recipe
#[derive(Debug, Clone)]
pub struct Recipe {
    pub version: String,
    pub actions: Actions,
}

impl Recipe {
    /// Load and validate a recipe file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read recipe {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a recipe from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)
            .map_err(|e| Error::Config(format!("recipe is not valid JSON: {e}")))?;
        validate(&document)?;

        let parsed: RecipeDocument = serde_json::from_value(document)
            .map_err(|e| Error::Config(format!("recipe does not match schema: {e}")))?;
        Self::from_document(parsed)
    }

    fn from_document(document: RecipeDocument) -> Result<Self> {
        let actions = document.actions;

        let rename = actions
            .rename
            .iter()
            .map(|entry| match entry.iter().next() {
                Some((pattern, replacement)) if entry.len() == 1 => {
                    RenameRule::new(pattern, replacement)
                }
                _ => Err(Error::Config(
                    "rename entries must map exactly one pattern to one replacement".to_string(),
                )),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut skip_scaling = actions.skip_scaling;
        skip_scaling.extend(actions.no_scaling);

        Ok(Self {
            version: document.version,
            actions: Actions {
                drop: ColumnMatcher::new(&actions.drop)?,
                rename,
                obfuscate: ColumnMatcher::new(&actions.obfuscate)?,
                skip_scaling: ColumnMatcher::new(&skip_scaling)?,
                drop_constant_columns: actions.drop_constant_columns,
                disable_scaling: actions.disable_scaling,
            },
        })
    }
}

fn validate(document: &Value) -> Result<()> {
    let schema = JSONSchema::options()
        .compile(&RECIPE_SCHEMA)
        .map_err(|e| Error::Runtime(format!("recipe schema failed to compile: {e}")))?;

    let result = schema.validate(document);
    if let Err(errors) = result {
        let messages: Vec<String> = errors
            .map(|e| {
                let at = e.instance_path.to_string();
                if at.is_empty() {
                    e.to_string()
                } else {
                    format!("{e} (at {at})")
                }
            })
            .collect();
        return Err(Error::Config(format!(
            "recipe does not match schema: {}",
            messages.join("; ")
        )));
    }
    Ok(())
}

/// Output file name used when none is given: `{stem}_release_{version}{ext}`.
///
/// `input_ext` includes its leading dot, or is empty.
pub fn derive_output_name(input_stem: &str, input_ext: &str, version: &str) -> String {
    format!("{input_stem}_release_{version}{input_ext}")
}
