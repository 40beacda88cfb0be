use proptest::prelude::*;
use stateweave_common::MockFileSystem;
use stateweave_parser::{parse, serialize};
use stateweave_synth::{field_key, state_name, transform, FsModuleLoader, Mode, TransformOptions};
use std::collections::BTreeSet;
use std::path::Path;

const TARGET: &str = "/proj/src/state.js";
const REDUCER: &str = "export type State = {};\nexport const initialState: State = {};\n";

fn child_path(dir: &str) -> String {
    format!("/proj/src/{}/reducer.js", dir)
}

fn loader_for(dirs: &[String]) -> FsModuleLoader<MockFileSystem> {
    let mut fs = MockFileSystem::new();
    for dir in dirs {
        fs.add_file(child_path(dir), REDUCER);
    }
    FsModuleLoader::with_fs(fs)
}

fn aggregate(source: &str, dirs: &[String], mode: Mode, loader: &FsModuleLoader<MockFileSystem>) -> String {
    dirs.iter().fold(source.to_string(), |source, dir| {
        let mut module = parse(&source).unwrap();
        let options = TransformOptions::new(child_path(dir)).with_mode(mode);
        transform(&mut module, Path::new(TARGET), &options, loader).unwrap();
        serialize(&module)
    })
}

fn arb_dirs() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9]{0,6}", 1..6)
        .prop_map(|dirs: BTreeSet<String>| dirs.into_iter().collect())
}

fn arb_mode() -> impl Strategy<Value = Mode> {
    prop_oneof![
        Just(Mode::TypeOnly),
        Just(Mode::TypeAndInitializer),
        Just(Mode::TypeInitializerAndDefault),
    ]
}

proptest! {
    #[test]
    fn reapplying_any_child_is_idempotent(dirs in arb_dirs(), mode in arb_mode(), pick in any::<prop::sample::Index>()) {
        let loader = loader_for(&dirs);
        let once = aggregate("", &dirs, mode, &loader);
        let again = aggregate(&once, &[pick.get(&dirs).clone()], mode, &loader);
        prop_assert_eq!(once, again);
    }

    #[test]
    fn output_does_not_depend_on_order(
        (dirs, shuffled) in arb_dirs().prop_flat_map(|dirs| (Just(dirs.clone()), Just(dirs).prop_shuffle())),
        mode in arb_mode(),
    ) {
        let loader = loader_for(&dirs);
        prop_assert_eq!(
            aggregate("", &dirs, mode, &loader),
            aggregate("", &shuffled, mode, &loader)
        );
    }

    #[test]
    fn every_child_gets_one_field(dirs in arb_dirs()) {
        let loader = loader_for(&dirs);
        let output = aggregate("", &dirs, Mode::TypeOnly, &loader);
        for dir in &dirs {
            let name = state_name(Path::new(&child_path(dir)));
            let field = format!("  {}: {},\n", field_key(&name), name);
            prop_assert_eq!(output.matches(&field).count(), 1);
        }
    }

    #[test]
    fn slice_names_are_identifiers(dir in "[a-z][a-z0-9_-]{0,10}") {
        let name = state_name(Path::new(&child_path(&dir)));
        prop_assert!(name.ends_with("State"));
        prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
        prop_assert!(name.chars().next().is_some_and(|c| c.is_ascii_uppercase()));
    }
}
