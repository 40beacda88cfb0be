//! Builders for the statements of an aggregate module.
//!
//! ```text
//! import type { State as AppState } from './App/reducer';
//!
//! import { initialState as appState } from './App/reducer';
//!
//! export type State = {
//!   app: AppState,
//! };
//!
//! export const initialState: State = {
//!   app: appState,
//! };
//!
//! export default initialState;
//! ```

use crate::contract::Contract;
use crate::naming::{field_key, state_name, value_alias};
use crate::options::Mode;
use stateweave_parser::ast::*;
use std::collections::BTreeSet;
use std::path::Path;

/// `import type { State as <Name> } from '<specifier>';`
pub fn type_import(specifier: &str) -> Statement {
    Statement::Import(ImportDeclaration::named(
        BindingKind::Type,
        Contract::State.export_name(),
        state_name(Path::new(specifier)),
        specifier,
    ))
}

/// `import { initialState as <name> } from '<specifier>';`
pub fn value_import(specifier: &str) -> Statement {
    Statement::Import(ImportDeclaration::named(
        BindingKind::Value,
        Contract::InitialState.export_name(),
        value_alias(&state_name(Path::new(specifier))),
        specifier,
    ))
}

/// `export type State = { <key>: <Name>, ... };`
pub fn state_type_alias<'a>(names: impl IntoIterator<Item = &'a String>) -> Statement {
    let properties = names
        .into_iter()
        .map(|name| ObjectTypeProperty {
            key: field_key(name),
            optional: false,
            value: TypeAnnotation::generic(name.as_str()),
        })
        .collect();

    Statement::ExportNamed(ExportNamedDeclaration::declaration(Declaration::TypeAlias(
        TypeAlias {
            name: Contract::State.export_name().to_string(),
            type_params: None,
            value: TypeAnnotation::Object(ObjectType {
                exact: false,
                properties,
            }),
        },
    )))
}

/// `export const initialState: State = { <key>: <alias>, ... };`
pub fn initial_state_declaration<'a>(names: impl IntoIterator<Item = &'a String>) -> Statement {
    let properties = names
        .into_iter()
        .map(|name| ObjectProperty {
            key: field_key(name),
            value: Expression::ident(value_alias(name)),
            shorthand: false,
        })
        .collect();

    Statement::ExportNamed(ExportNamedDeclaration::declaration(Declaration::Variable(
        VariableDeclaration {
            kind: VariableKind::Const,
            declarators: vec![VariableDeclarator {
                id: BindingPattern::Identifier {
                    name: Contract::InitialState.export_name().to_string(),
                },
                type_annotation: Some(TypeAnnotation::generic(Contract::State.export_name())),
                init: Some(Expression::Object { properties }),
            }],
        },
    )))
}

/// `export default initialState;`
pub fn default_export() -> Statement {
    Statement::ExportDefault(ExportDefaultDeclaration {
        value: Expression::ident(Contract::InitialState.export_name()),
    })
}

/// Complete body of an aggregate module.
///
/// Imports follow the sorted `specifiers`, fields the sorted `names`. Names
/// that map to the same field key share one field, held by the first name.
/// Groups are separated by [`Statement::Noop`].
pub fn synthesize(specifiers: &BTreeSet<String>, names: &BTreeSet<String>, mode: Mode) -> Vec<Statement> {
    let mut keys = BTreeSet::new();
    let fields: Vec<&String> = names.iter().filter(|name| keys.insert(field_key(name))).collect();

    let mut groups: Vec<Vec<Statement>> = Vec::new();

    groups.push(specifiers.iter().map(|s| type_import(s)).collect());
    if mode.emits_initializer() {
        groups.push(specifiers.iter().map(|s| value_import(s)).collect());
    }

    groups.push(vec![state_type_alias(fields.iter().copied())]);
    if mode.emits_initializer() {
        groups.push(vec![initial_state_declaration(fields.iter().copied())]);
    }
    if mode.emits_default_export() {
        groups.push(vec![default_export()]);
    }

    let mut body = Vec::new();
    for (i, group) in groups.into_iter().enumerate() {
        if i > 0 {
            body.push(Statement::Noop);
        }
        body.extend(group);
    }
    body
}
