//! Flat import/export tables for a module.
//!
//! "Exploding" a module lists every binding it imports and every name it
//! exposes, regardless of which syntactic form produced it. Callers that only
//! need to ask "does this module export `X`" or "what does it import from
//! where" query these tables instead of walking the tree.

use crate::ast::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportEntry {
    pub source: String,
    /// Name in the source module: `"default"` for default imports, `None`
    /// for namespace and side-effect imports
    pub imported: Option<String>,
    /// Local binding, `None` for side-effect imports
    pub local: Option<String>,
    pub kind: BindingKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportEntry {
    /// Name visible to importers, `None` for `export * from`
    pub external: Option<String>,
    /// Local binding or re-exported name
    pub local: Option<String>,
    /// Present for re-exports
    pub source: Option<String>,
    pub kind: BindingKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExplodedModule {
    pub imports: Vec<ImportEntry>,
    pub exports: Vec<ExportEntry>,
}

impl ExplodedModule {
    /// True when some export is visible under `name`
    pub fn exports_name(&self, name: &str) -> bool {
        self.exports
            .iter()
            .any(|entry| entry.external.as_deref() == Some(name))
    }

    /// Distinct import sources in first-seen order
    pub fn import_sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for entry in &self.imports {
            if !sources.contains(&entry.source.as_str()) {
                sources.push(&entry.source);
            }
        }
        sources
    }
}

/// Build the import/export tables of a module
pub fn explode(module: &Module) -> ExplodedModule {
    let mut exploded = ExplodedModule::default();

    for statement in &module.body {
        match statement {
            Statement::Import(import) => explode_import(import, &mut exploded.imports),
            Statement::ExportNamed(export) => explode_export_named(export, &mut exploded.exports),
            Statement::ExportDefault(export) => {
                let local = match &export.value {
                    Expression::Identifier { name } => Some(name.clone()),
                    _ => None,
                };
                exploded.exports.push(ExportEntry {
                    external: Some("default".to_string()),
                    local,
                    source: None,
                    kind: BindingKind::Value,
                });
            }
            Statement::ExportAll(export) => exploded.exports.push(ExportEntry {
                external: export.exported.clone(),
                local: None,
                source: Some(export.source.clone()),
                kind: export.kind,
            }),
            _ => {}
        }
    }

    exploded
}

fn explode_import(import: &ImportDeclaration, imports: &mut Vec<ImportEntry>) {
    if import.specifiers.is_empty() {
        imports.push(ImportEntry {
            source: import.source.clone(),
            imported: None,
            local: None,
            kind: import.kind,
        });
        return;
    }

    for specifier in &import.specifiers {
        let (imported, kind) = match specifier {
            ImportSpecifier::Default { .. } => (Some("default".to_string()), import.kind),
            ImportSpecifier::Namespace { .. } => (None, import.kind),
            ImportSpecifier::Named { imported, kind, .. } => {
                (Some(imported.clone()), kind.unwrap_or(import.kind))
            }
        };
        imports.push(ImportEntry {
            source: import.source.clone(),
            imported,
            local: Some(specifier.local().to_string()),
            kind,
        });
    }
}

fn explode_export_named(export: &ExportNamedDeclaration, exports: &mut Vec<ExportEntry>) {
    if let Some(declaration) = &export.declaration {
        for (name, kind) in declaration.bindings() {
            exports.push(ExportEntry {
                external: Some(name.to_string()),
                local: Some(name.to_string()),
                source: None,
                kind,
            });
        }
        return;
    }

    for specifier in &export.specifiers {
        exports.push(ExportEntry {
            external: Some(specifier.exported.clone()),
            local: Some(specifier.local.clone()),
            source: export.source.clone(),
            kind: export.kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_explode_exports() {
        let module = parse(
            r#"
export type State = { count: number };
export const initialState: State = { count: 0 };
export function reducer(state: State = initialState) { return state; }
export { helper as util, other } from './helpers';
export * from './everything';
export default reducer;
const local = 1;
"#,
        )
        .expect("Failed to parse");

        let exploded = explode(&module);
        let external: Vec<_> = exploded
            .exports
            .iter()
            .map(|e| e.external.as_deref())
            .collect();

        assert_eq!(
            external,
            vec![
                Some("State"),
                Some("initialState"),
                Some("reducer"),
                Some("util"),
                Some("other"),
                None,
                Some("default"),
            ]
        );
        assert_eq!(exploded.exports[0].kind, BindingKind::Type);
        assert_eq!(exploded.exports[3].source.as_deref(), Some("./helpers"));
        assert!(exploded.exports_name("State"));
        assert!(!exploded.exports_name("local"));
    }

    #[test]
    fn test_explode_imports() {
        let module = parse(
            r#"
import type { State as AppState } from './App/reducer';
import { initialState as appState, type Action } from './App/reducer';
import React from 'react';
import * as utils from './utils';
import './setup';
"#,
        )
        .expect("Failed to parse");

        let exploded = explode(&module);
        assert_eq!(exploded.imports.len(), 6);

        assert_eq!(exploded.imports[0].kind, BindingKind::Type);
        assert_eq!(exploded.imports[0].local.as_deref(), Some("AppState"));
        assert_eq!(exploded.imports[1].kind, BindingKind::Value);
        assert_eq!(exploded.imports[2].kind, BindingKind::Type);
        assert_eq!(exploded.imports[3].imported.as_deref(), Some("default"));
        assert_eq!(exploded.imports[4].imported, None);
        assert_eq!(exploded.imports[5].local, None);

        assert_eq!(
            exploded.import_sources(),
            vec!["./App/reducer", "react", "./utils", "./setup"]
        );
    }

    #[test]
    fn test_explode_empty_module() {
        let exploded = explode(&Module::new());
        assert!(exploded.exports.is_empty());
        assert!(!exploded.exports_name("State"));
    }
}
