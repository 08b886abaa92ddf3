//! Workflow document composition.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::core::state::Answers;
use crate::core::types::{FieldMap, FieldValue, META_MODULE, Phase};

const CHILDREN_KEY: &str = "children";

/// The document persisted at the end of a session.
///
/// The shape of `config` follows `module`: a `meta` document holds
/// `children`, any other module holds its own fields, including one that
/// happens to be called `children`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDocument")]
pub struct WorkflowDocument {
    pub phase: Phase,
    pub folder: String,
    /// A configured module's name, or `meta` for a composed document.
    pub module: String,
    pub config: DocumentConfig,
}

/// Either one module's fields or the children of a `meta` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentConfig {
    Meta { children: Vec<FieldMap> },
    Module(FieldMap),
}

#[derive(Deserialize)]
struct RawDocument {
    phase: Phase,
    folder: String,
    module: String,
    config: BTreeMap<String, RawEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Field(FieldValue),
    Children(Vec<FieldMap>),
}

impl TryFrom<RawDocument> for WorkflowDocument {
    type Error = String;

    fn try_from(raw: RawDocument) -> Result<Self, Self::Error> {
        let config = if raw.module == META_MODULE {
            meta_config(raw.config)?
        } else {
            module_config(&raw.module, raw.config)?
        };
        Ok(Self {
            phase: raw.phase,
            folder: raw.folder,
            module: raw.module,
            config,
        })
    }
}

fn meta_config(entries: BTreeMap<String, RawEntry>) -> Result<DocumentConfig, String> {
    let mut children = None;
    for (key, entry) in entries {
        if key != CHILDREN_KEY {
            return Err(format!("unexpected key '{key}' in '{META_MODULE}' config"));
        }
        children = Some(match entry {
            RawEntry::Children(children) => children,
            RawEntry::Field(FieldValue::List(items)) if items.is_empty() => Vec::new(),
            RawEntry::Field(value) => {
                return Err(format!(
                    "'{META_MODULE}' children must be a list of field maps (got {value})"
                ));
            }
        });
    }
    let children =
        children.ok_or_else(|| format!("'{META_MODULE}' config must contain {CHILDREN_KEY}"))?;
    Ok(DocumentConfig::Meta { children })
}

fn module_config(
    module: &str,
    entries: BTreeMap<String, RawEntry>,
) -> Result<DocumentConfig, String> {
    let mut fields = FieldMap::new();
    for (key, entry) in entries {
        match entry {
            RawEntry::Field(value) => {
                fields.insert(key, value);
            }
            RawEntry::Children(_) => {
                return Err(format!("field '{key}' of module '{module}' holds nested maps"));
            }
        }
    }
    Ok(DocumentConfig::Module(fields))
}

/// Derive the output document from accumulated answers.
///
/// One configured module is emitted as-is. Several are bundled under `meta`
/// with their field maps as `children` in the order they were configured.
pub fn compose(answers: &Answers) -> Result<WorkflowDocument, String> {
    let phase = answers
        .phase
        .ok_or_else(|| "cannot compose a workflow without a phase".to_string())?;
    let folder = answers
        .folder
        .clone()
        .ok_or_else(|| "cannot compose a workflow without a folder".to_string())?;

    let (module, config) = match answers.configs.len() {
        0 => return Err("cannot compose a workflow with no configured modules".to_string()),
        1 => {
            let (name, fields) = answers
                .configs
                .iter()
                .next()
                .ok_or_else(|| "configured module vanished".to_string())?;
            (name.to_string(), DocumentConfig::Module(fields.clone()))
        }
        count => {
            if phase != Phase::Analyse {
                return Err(format!(
                    "{phase} workflows cannot compose {count} modules into '{META_MODULE}'"
                ));
            }
            let children = answers
                .configs
                .iter()
                .map(|(_, fields)| fields.clone())
                .collect();
            (META_MODULE.to_string(), DocumentConfig::Meta { children })
        }
    };

    Ok(WorkflowDocument {
        phase,
        folder,
        module,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answers(phase: Phase, modules: &[(&str, FieldMap)]) -> Answers {
        let mut answers = Answers {
            phase: Some(phase),
            folder: Some("out".to_string()),
            ..Answers::default()
        };
        for (name, fields) in modules {
            answers.configs.insert(*name, fields.clone());
        }
        answers
    }

    fn fields(key: &str, value: FieldValue) -> FieldMap {
        FieldMap::from([(key.to_string(), value)])
    }

    #[test]
    fn single_module_is_emitted_directly() {
        let path = fields("path", FieldValue::text("/tmp"));
        let doc = compose(&answers(Phase::Select, &[("local", path.clone())])).expect("compose");
        assert_eq!(
            doc,
            WorkflowDocument {
                phase: Phase::Select,
                folder: "out".to_string(),
                module: "local".to_string(),
                config: DocumentConfig::Module(path),
            }
        );
    }

    #[test]
    fn several_modules_compose_into_meta_children_in_order() {
        let a = fields("x", FieldValue::Int(1));
        let b = fields("y", FieldValue::Int(2));
        let doc = compose(&answers(Phase::Analyse, &[("b_mod", b.clone()), ("a_mod", a.clone())]))
            .expect("compose");
        assert_eq!(doc.module, META_MODULE);
        assert_eq!(doc.config, DocumentConfig::Meta { children: vec![b, a] });
    }

    #[test]
    fn zero_modules_is_rejected() {
        let err = compose(&answers(Phase::Analyse, &[])).expect_err("no modules");
        assert!(err.contains("no configured modules"));
    }

    #[test]
    fn select_never_composes_meta() {
        let err = compose(&answers(
            Phase::Select,
            &[("a", FieldMap::new()), ("b", FieldMap::new())],
        ))
        .expect_err("select meta");
        assert!(err.contains("cannot compose"));
    }

    #[test]
    fn module_named_config_field_children_stays_a_module_config() {
        let doc: WorkflowDocument = serde_json::from_value(json!({
            "phase": "analyse",
            "folder": "out",
            "module": "frames",
            "config": { "children": ["a"], "elements_in": ["sel"] },
        }))
        .expect("deserialize");
        assert_eq!(
            doc.config,
            DocumentConfig::Module(FieldMap::from([
                ("children".to_string(), FieldValue::List(vec!["a".to_string()])),
                (
                    "elements_in".to_string(),
                    FieldValue::List(vec!["sel".to_string()])
                ),
            ]))
        );
    }

    #[test]
    fn meta_config_shape_is_chosen_by_module_name() {
        let meta = |config: serde_json::Value| {
            serde_json::from_value::<WorkflowDocument>(json!({
                "phase": "analyse",
                "folder": "out",
                "module": "meta",
                "config": config,
            }))
        };

        let doc = meta(json!({ "children": [{ "x": 1 }] })).expect("meta");
        assert_eq!(
            doc.config,
            DocumentConfig::Meta {
                children: vec![fields("x", FieldValue::Int(1))]
            }
        );
        let empty = meta(json!({ "children": [] })).expect("empty children");
        assert_eq!(empty.config, DocumentConfig::Meta { children: Vec::new() });

        let err = meta(json!({ "x": 1 })).expect_err("no children");
        assert!(err.to_string().contains("unexpected key 'x'"), "{err}");
        let err = meta(json!({})).expect_err("empty config");
        assert!(err.to_string().contains("must contain children"), "{err}");
    }

    #[test]
    fn nested_maps_in_a_module_config_are_rejected() {
        let err = serde_json::from_value::<WorkflowDocument>(json!({
            "phase": "select",
            "folder": "out",
            "module": "local",
            "config": { "children": [{ "x": 1 }] },
        }))
        .expect_err("nested maps");
        assert!(err.to_string().contains("holds nested maps"), "{err}");
    }

    #[test]
    fn missing_folder_is_rejected() {
        let mut incomplete = answers(Phase::Select, &[("a", FieldMap::new())]);
        incomplete.folder = None;
        assert!(compose(&incomplete).is_err());
    }
}
