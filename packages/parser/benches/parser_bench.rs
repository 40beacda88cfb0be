use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stateweave_parser::{parse, serialize};

const AGGREGATE: &str = r#"// @flow
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
"#;

const REDUCER: &str = r#"// @flow
import type { Action } from '../actions';

export type State = {
  items: Array<string>,
  loading: boolean,
};

export const initialState: State = {
  items: [],
  loading: false,
};

export default function reducer(state: State = initialState, action: Action): State {
  switch (action.type) {
    case 'ADD':
      return { ...state, items: [...state.items, action.payload] };
    default:
      return state;
  }
}
"#;

fn parse_aggregate(c: &mut Criterion) {
    c.bench_function("parse_aggregate", |b| b.iter(|| parse(black_box(AGGREGATE))));
}

fn parse_reducer(c: &mut Criterion) {
    c.bench_function("parse_reducer", |b| b.iter(|| parse(black_box(REDUCER))));
}

fn roundtrip_aggregate(c: &mut Criterion) {
    let module = parse(AGGREGATE).expect("Failed to parse");
    c.bench_function("serialize_aggregate", |b| {
        b.iter(|| serialize(black_box(&module)))
    });
}

criterion_group!(benches, parse_aggregate, parse_reducer, roundtrip_aggregate);
criterion_main!(benches);
