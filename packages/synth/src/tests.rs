//! End-to-end rewrites against an in-memory project.

use crate::*;
use stateweave_common::MockFileSystem;
use stateweave_parser::{parse, serialize};
use std::path::Path;

const TARGET: &str = "/proj/src/state.js";

const REDUCER: &str = r#"// @flow
import type { Action } from '../actions';

export type State = { count: number };
export const initialState: State = { count: 0 };

export default (state: State = initialState, action: Action): State => {
  return state;
}
"#;

const TYPE_ONLY_REDUCER: &str = "export type State = { count: number };\n";

const APP_AGGREGATE: &str = "\
// @flow
import type { State as AppState } from './App/reducer';

import { initialState as appState } from './App/reducer';

export type State = {
  app: AppState,
};

export const initialState: State = {
  app: appState,
};

export default initialState;
";

fn project(children: &[(&str, &str)]) -> FsModuleLoader<MockFileSystem> {
    let mut fs = MockFileSystem::new();
    for (path, source) in children {
        fs.add_file(*path, *source);
    }
    FsModuleLoader::with_fs(fs)
}

fn apply(
    source: &str,
    child: &str,
    mode: Mode,
    loader: &impl ModuleLoader,
) -> (String, Outcome) {
    let mut module = parse(source).expect("Failed to parse target");
    let options = TransformOptions::new(child).with_mode(mode);
    let outcome =
        transform(&mut module, Path::new(TARGET), &options, loader).expect("Transform failed");
    (serialize(&module), outcome)
}

#[test]
fn test_first_child_into_empty_target() {
    let loader = project(&[("/proj/src/App/reducer.js", REDUCER)]);

    let (output, outcome) = apply("", "/proj/src/App/reducer.js", Mode::default(), &loader);

    assert_eq!(outcome, Outcome::Rewritten);
    assert_eq!(output, APP_AGGREGATE);
}

#[test]
fn test_existing_pragma_is_not_duplicated() {
    let loader = project(&[("/proj/src/App/reducer.js", REDUCER)]);

    let (output, _) = apply("// @flow\n", "/proj/src/App/reducer.js", Mode::default(), &loader);

    assert_eq!(output, APP_AGGREGATE);
    assert_eq!(output.matches("@flow").count(), 1);
}

#[test]
fn test_reapplying_is_idempotent() {
    let loader = project(&[
        ("/proj/src/App/reducer.js", REDUCER),
        ("/proj/src/Todo/reducer.js", REDUCER),
    ]);

    for mode in [Mode::TypeOnly, Mode::TypeAndInitializer, Mode::TypeInitializerAndDefault] {
        let (once, _) = apply("", "/proj/src/App/reducer.js", mode, &loader);
        let (twice, _) = apply(&once, "/proj/src/Todo/reducer.js", mode, &loader);
        let (again, outcome) = apply(&twice, "/proj/src/Todo/reducer.js", mode, &loader);

        assert_eq!(outcome, Outcome::Rewritten);
        assert_eq!(again, twice, "mode {} is not idempotent", mode);
    }
}

#[test]
fn test_aggregation_is_monotonic() {
    let loader = project(&[
        ("/proj/src/App/reducer.js", REDUCER),
        ("/proj/src/Todo/reducer.js", REDUCER),
    ]);

    let (with_app, _) = apply("", "/proj/src/App/reducer.js", Mode::default(), &loader);
    let (output, _) = apply(&with_app, "/proj/src/Todo/reducer.js", Mode::default(), &loader);

    let expected = "\
// @flow
import type { State as AppState } from './App/reducer';
import type { State as TodoState } from './Todo/reducer';

import { initialState as appState } from './App/reducer';
import { initialState as todoState } from './Todo/reducer';

export type State = {
  app: AppState,
  todo: TodoState,
};

export const initialState: State = {
  app: appState,
  todo: todoState,
};

export default initialState;
";
    assert_eq!(output, expected);
}

#[test]
fn test_order_of_children_does_not_matter() {
    let loader = project(&[
        ("/proj/src/App/reducer.js", REDUCER),
        ("/proj/src/Todo/reducer.js", REDUCER),
        ("/proj/src/user-profile/reducer.js", REDUCER),
    ]);
    let children = [
        "/proj/src/user-profile/reducer.js",
        "/proj/src/App/reducer.js",
        "/proj/src/Todo/reducer.js",
    ];

    let run = |order: &[usize]| {
        order.iter().fold(String::new(), |source, &i| {
            apply(&source, children[i], Mode::default(), &loader).0
        })
    };

    let forward = run(&[0, 1, 2]);
    assert_eq!(forward, run(&[2, 1, 0]));
    assert_eq!(forward, run(&[1, 0, 2]));
    assert!(forward.contains("userprofile: UserProfileState,"));
    assert!(forward.contains("import { initialState as userProfileState } from './user-profile/reducer';"));
}

#[test]
fn test_missing_child_is_retracted() {
    let loader = project(&[
        ("/proj/src/App/reducer.js", REDUCER),
        ("/proj/src/Todo/reducer.js", REDUCER),
    ]);
    let (with_app, _) = apply("", "/proj/src/App/reducer.js", Mode::default(), &loader);
    let (both, _) = apply(&with_app, "/proj/src/Todo/reducer.js", Mode::default(), &loader);

    let after_delete = project(&[("/proj/src/App/reducer.js", REDUCER)]);
    let (output, outcome) = apply(&both, "/proj/src/Todo/reducer.js", Mode::default(), &after_delete);

    assert_eq!(outcome, Outcome::Retracted { removed: 2 });
    assert!(!outcome.rewritten());
    assert!(!output.contains("from './Todo/reducer'"));
    assert!(output.contains("from './App/reducer'"));
    // The aggregate itself is only rebuilt by the next successful rewrite
    assert!(output.contains("todo: TodoState,"));

    let (rebuilt, _) = apply(&output, "/proj/src/App/reducer.js", Mode::default(), &after_delete);
    assert_eq!(rebuilt, APP_AGGREGATE);
}

#[test]
fn test_retracting_unknown_child_changes_nothing() {
    let loader = project(&[]);
    let (output, outcome) = apply(APP_AGGREGATE, "/proj/src/Gone/reducer.js", Mode::default(), &loader);

    assert_eq!(outcome, Outcome::Retracted { removed: 0 });
    assert!(!outcome.modified());
    assert_eq!(output, APP_AGGREGATE);
}

#[test]
fn test_contract_rejection_leaves_target_untouched() {
    let loader = project(&[("/proj/src/Todo/reducer.js", TYPE_ONLY_REDUCER)]);

    let (output, outcome) = apply(APP_AGGREGATE, "/proj/src/Todo/reducer.js", Mode::default(), &loader);
    assert_eq!(outcome, Outcome::ContractUnsatisfied);
    assert_eq!(output, APP_AGGREGATE);

    let (output, outcome) = apply("", "/proj/src/Todo/reducer.js", Mode::TypeOnly, &loader);
    assert_eq!(outcome, Outcome::Rewritten);
    assert!(output.contains("todo: TodoState,"));
}

#[test]
fn test_child_without_any_contract() {
    let loader = project(&[("/proj/src/App/reducer.js", "export default function reducer() {}\n")]);
    let (output, outcome) = apply("const x = 1;\n", "/proj/src/App/reducer.js", Mode::TypeOnly, &loader);

    assert_eq!(outcome, Outcome::ContractUnsatisfied);
    assert_eq!(output, "const x = 1;\n");
}

#[test]
fn test_no_child_is_not_applicable() {
    let loader = project(&[]);
    let mut module = parse(APP_AGGREGATE).unwrap();
    let before = module.clone();

    let outcome = transform(
        &mut module,
        Path::new(TARGET),
        &TransformOptions::default(),
        &loader,
    )
    .unwrap();

    assert_eq!(outcome, Outcome::NotApplicable);
    assert_eq!(module, before);
}

#[test]
fn test_unparseable_child_is_an_error() {
    let loader = project(&[("/proj/src/App/reducer.js", "export type State = {\n")]);
    let mut module = parse(APP_AGGREGATE).unwrap();
    let before = module.clone();

    let err = transform(
        &mut module,
        Path::new(TARGET),
        &TransformOptions::new("/proj/src/App/reducer.js"),
        &loader,
    )
    .unwrap_err();

    assert_eq!(err.path(), Path::new("/proj/src/App/reducer.js"));
    assert!(matches!(err, SynthError::Load { source: LoadError::Parse { .. }, .. }));
    assert_eq!(module, before);
}

#[test]
fn test_unrelated_imports_are_not_aggregated() {
    let loader = project(&[("/proj/src/App/reducer.js", REDUCER)]);
    let target = "// @flow\nimport { combineReducers } from 'redux';\nimport type { Action } from './actions';\n";

    let (output, _) = apply(target, "/proj/src/App/reducer.js", Mode::TypeOnly, &loader);

    assert!(!output.contains("redux"));
    assert!(!output.contains("ActionState"));
    assert!(output.contains("app: AppState,"));
}

#[test]
fn test_header_comments_survive() {
    let loader = project(&[("/proj/src/App/reducer.js", REDUCER)]);
    let target = "/* Copyright Stateweave */\n// @flow strict\n";

    let (output, _) = apply(target, "/proj/src/App/reducer.js", Mode::TypeOnly, &loader);

    assert!(output.starts_with("// @flow strict\n/* Copyright Stateweave */\nimport type"));
}

#[test]
fn test_retraction_keeps_block_comments() {
    let loader = project(&[("/proj/src/App/reducer.js", REDUCER)]);
    let target = "\
/* @flow */
import type { State as AppState } from './App/reducer';
import type { State as GoneState } from './Gone/reducer';

/**
 * Store helpers
 */
export function helper() {}
/* end */
";

    let (output, outcome) = apply(target, "/proj/src/Gone/reducer.js", Mode::default(), &loader);

    assert_eq!(outcome, Outcome::Retracted { removed: 1 });
    assert_eq!(
        output,
        target.replace("import type { State as GoneState } from './Gone/reducer';\n", "")
    );
}

#[test]
fn test_block_pragma_is_kept_once() {
    let loader = project(&[("/proj/src/Todo/reducer.js", REDUCER)]);
    let target = "/* @flow */\nimport type { State as AppState } from './App/reducer';\n";

    let (output, outcome) = apply(target, "/proj/src/Todo/reducer.js", Mode::TypeOnly, &loader);

    assert_eq!(outcome, Outcome::Rewritten);
    assert!(output.starts_with("/* @flow */\nimport type { State as AppState }"));
    assert_eq!(output.matches("@flow").count(), 1);
    assert!(output.contains("todo: TodoState,"));
}

#[test]
fn test_directories_with_the_same_field_key_share_a_field() {
    let loader = project(&[
        ("/proj/src/todo-list/reducer.js", REDUCER),
        ("/proj/src/todolist/reducer.js", REDUCER),
    ]);

    let (first, _) = apply("", "/proj/src/todo-list/reducer.js", Mode::default(), &loader);
    let (output, _) = apply(&first, "/proj/src/todolist/reducer.js", Mode::default(), &loader);

    assert!(output.contains("from './todo-list/reducer';"));
    assert!(output.contains("from './todolist/reducer';"));
    assert_eq!(output.matches("todolist:").count(), 2);
    assert!(output.contains("todolist: TodoListState,"));
    assert!(output.contains("todolist: todoListState,"));

    let (again, _) = apply(&output, "/proj/src/todolist/reducer.js", Mode::default(), &loader);
    assert_eq!(again, output);
}

#[test]
fn test_colliding_directory_names_share_a_field() {
    let loader = project(&[
        ("/proj/src/a/App/reducer.js", REDUCER),
        ("/proj/src/b/App/reducer.js", REDUCER),
    ]);

    let (first, _) = apply("", "/proj/src/a/App/reducer.js", Mode::TypeOnly, &loader);
    let (output, _) = apply(&first, "/proj/src/b/App/reducer.js", Mode::TypeOnly, &loader);

    assert!(output.contains("import type { State as AppState } from './a/App/reducer';"));
    assert!(output.contains("import type { State as AppState } from './b/App/reducer';"));
    assert_eq!(output.matches("app: AppState,").count(), 1);
}

#[test]
fn test_child_in_parent_directory() {
    let loader = project(&[("/proj/shared/Session/reducer.js", REDUCER)]);

    let (output, _) = apply("", "/proj/shared/Session/reducer.js", Mode::TypeOnly, &loader);

    assert!(output.contains("import type { State as SessionState } from '../shared/Session/reducer';"));
}

#[test]
fn test_incremental_import_keeps_body() {
    let loader = project(&[("/proj/src/Todo/reducer.js", TYPE_ONLY_REDUCER)]);
    let target = "\
import { combineReducers } from 'redux';
import type { State as AppState } from './App/reducer';

export type State = { app: AppState };
";

    let (output, outcome) = apply(target, "/proj/src/Todo/reducer.js", Mode::IncrementalImport, &loader);

    assert_eq!(outcome, Outcome::Rewritten);
    let expected = "\
// @flow
import { combineReducers } from 'redux';
import type { State as AppState } from './App/reducer';
import type { State as TodoState } from './Todo/reducer';

export type State = {
  app: AppState,
};
";
    assert_eq!(output, expected);

    let (again, outcome) = apply(&output, "/proj/src/Todo/reducer.js", Mode::IncrementalImport, &loader);
    assert_eq!(outcome, Outcome::AlreadyImported);
    assert_eq!(again, output);
}

#[test]
fn test_incremental_import_into_module_without_imports() {
    let loader = project(&[("/proj/src/Todo/reducer.js", REDUCER)]);

    let (output, _) = apply("const store = {};\n", "/proj/src/Todo/reducer.js", Mode::IncrementalImport, &loader);

    assert_eq!(
        output,
        "// @flow\nimport type { State as TodoState } from './Todo/reducer';\nconst store = {};\n"
    );
}

#[test]
fn test_cached_loader_serves_repeated_rewrites() {
    let mut fs = MockFileSystem::new();
    fs.add_file("/proj/src/App/reducer.js", REDUCER);
    let loader = CachedLoader::with_fs(fs);

    let (first, _) = apply("", "/proj/src/App/reducer.js", Mode::default(), &loader);
    let (second, _) = apply(&first, "/proj/src/App/reducer.js", Mode::default(), &loader);

    assert_eq!(first, second);
    assert_eq!(loader.len(), 1);
}
