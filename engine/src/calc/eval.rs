//! FILENAME: engine/src/calc/eval.rs
//! PURPOSE: Drives the Rhai engine over a materialized workbook.
//! CONTEXT: Cell state is shared into the engine's registered functions
//! through a DashMap, formulas run in dependency order (DFS with cycle
//! detection), and each successful result is written back into the shared
//! map so downstream formulas observe it. Failures never abort the pass.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use rhai::{Dynamic, Engine, ImmutableString};

use crate::cell::CellValue;
use crate::coord::{coord_to_a1, parse_a1};

use super::preprocess::{preprocess_formula, RefTarget};
use super::CalcWorkbook;

/// (sheet name, A1 address) -> current value, shared with engine builtins.
type SharedValues = Arc<DashMap<(String, String), CellValue>>;

type CellKey = (String, String);

struct Job {
    script: String,
    refs: Vec<RefTarget>,
}

pub(super) fn evaluate_workbook(workbook: &mut CalcWorkbook) {
    // Seed the shared map with every current value; formula cells contribute
    // their cached value until (and unless) they are re-evaluated.
    let values: SharedValues = Arc::new(DashMap::new());
    for sheet in &workbook.sheets {
        for (addr, cell) in &sheet.cells {
            values.insert((sheet.name.clone(), addr.clone()), cell.value.clone());
        }
    }

    // Preprocess every formula cell into an evaluation job.
    let mut jobs: HashMap<CellKey, Job> = HashMap::new();
    for sheet in &workbook.sheets {
        for (addr, cell) in &sheet.cells {
            if let Some(formula) = cell.formula.as_deref() {
                let body = formula.strip_prefix('=').unwrap_or(formula);
                let prepared = preprocess_formula(body, &sheet.name);
                jobs.insert(
                    (sheet.name.clone(), addr.clone()),
                    Job {
                        script: prepared.script,
                        refs: prepared.refs,
                    },
                );
            }
        }
    }
    if jobs.is_empty() {
        return;
    }

    let (order, cyclic) = evaluation_order(&jobs);
    for (sheet, addr) in &cyclic {
        log::warn!(
            "formula at {}!{} is part of a reference cycle; keeping cached value",
            sheet,
            addr
        );
    }

    let engine = build_engine(values.clone());
    let mut evaluated: HashMap<CellKey, CellValue> = HashMap::new();
    for key in order {
        if cyclic.contains(&key) {
            continue;
        }
        let Some(job) = jobs.get(&key) else { continue };
        match engine.eval::<Dynamic>(&job.script) {
            Ok(result) => {
                let value = dynamic_to_value(result);
                values.insert(key.clone(), value.clone());
                evaluated.insert(key, value);
            }
            Err(err) => {
                log::warn!(
                    "formula at {}!{} failed to evaluate: {}; keeping cached value",
                    key.0,
                    key.1,
                    err
                );
            }
        }
    }

    // Write results back into the materialized cells: value and refreshed
    // display text, in place.
    for sheet in &mut workbook.sheets {
        let name = sheet.name.clone();
        for (addr, cell) in sheet.cells.iter_mut() {
            if let Some(value) = evaluated.remove(&(name.clone(), addr.clone())) {
                cell.text = Some(value.display());
                cell.value = value;
            }
        }
    }
}

/// Topological evaluation order over formula cells, plus the set of cells
/// caught in reference cycles (which must not be evaluated).
fn evaluation_order(jobs: &HashMap<CellKey, Job>) -> (Vec<CellKey>, HashSet<CellKey>) {
    // Index formula cells by sheet for range expansion.
    let mut by_sheet: HashMap<String, Vec<(String, (u32, u32))>> = HashMap::new();
    for (sheet, addr) in jobs.keys() {
        if let Some(coord) = parse_a1(addr) {
            by_sheet
                .entry(sheet.clone())
                .or_default()
                .push((addr.clone(), coord));
        }
    }

    // Only edges onto other formula cells matter; plain values are already
    // seeded in the shared map.
    let mut deps: HashMap<CellKey, Vec<CellKey>> = HashMap::new();
    for (key, job) in jobs {
        let mut cell_deps = Vec::new();
        for target in &job.refs {
            match target {
                RefTarget::Cell { sheet, row, col } => {
                    let dep = (sheet.clone(), coord_to_a1((*row, *col)));
                    if jobs.contains_key(&dep) {
                        cell_deps.push(dep);
                    }
                }
                RefTarget::Range {
                    sheet,
                    start_row,
                    start_col,
                    end_row,
                    end_col,
                } => {
                    if let Some(cells) = by_sheet.get(sheet) {
                        for (addr, (row, col)) in cells {
                            if row >= start_row
                                && row <= end_row
                                && col >= start_col
                                && col <= end_col
                            {
                                cell_deps.push((sheet.clone(), addr.clone()));
                            }
                        }
                    }
                }
            }
        }
        deps.insert(key.clone(), cell_deps);
    }

    let mut roots: Vec<&CellKey> = jobs.keys().collect();
    roots.sort();

    let mut marks: HashMap<CellKey, Mark> = HashMap::new();
    let mut stack: Vec<CellKey> = Vec::new();
    let mut order: Vec<CellKey> = Vec::new();
    let mut cyclic: HashSet<CellKey> = HashSet::new();
    for root in roots {
        visit(root, &deps, &mut marks, &mut stack, &mut order, &mut cyclic);
    }
    (order, cyclic)
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

fn visit(
    key: &CellKey,
    deps: &HashMap<CellKey, Vec<CellKey>>,
    marks: &mut HashMap<CellKey, Mark>,
    stack: &mut Vec<CellKey>,
    order: &mut Vec<CellKey>,
    cyclic: &mut HashSet<CellKey>,
) {
    match marks.get(key) {
        Some(Mark::Done) => return,
        Some(Mark::Visiting) => {
            // Everything from the first occurrence on the stack onward is
            // part of the cycle.
            if let Some(pos) = stack.iter().position(|k| k == key) {
                for k in &stack[pos..] {
                    cyclic.insert(k.clone());
                }
            }
            return;
        }
        None => {}
    }
    marks.insert(key.clone(), Mark::Visiting);
    stack.push(key.clone());
    if let Some(edges) = deps.get(key) {
        for dep in edges {
            visit(dep, deps, marks, stack, order, cyclic);
        }
    }
    stack.pop();
    marks.insert(key.clone(), Mark::Done);
    order.push(key.clone());
}

/// Create a Rhai engine with the cell accessor and aggregate builtins
/// registered over the shared value map.
fn build_engine(values: SharedValues) -> Engine {
    let mut engine = Engine::new();

    let cell_values = values.clone();
    engine.register_fn(
        "CELL",
        move |sheet: ImmutableString, col: i64, row: i64| -> Dynamic {
            if row < 0 || col < 0 {
                return Dynamic::from(0.0_f64);
            }
            let addr = coord_to_a1((row as u32, col as u32));
            match cell_values.get(&(sheet.to_string(), addr)) {
                Some(value) => value_to_dynamic(value.value()),
                None => Dynamic::from(0.0_f64),
            }
        },
    );

    let sum_values = values.clone();
    engine.register_fn(
        "SUM_RANGE",
        move |sheet: ImmutableString, c1: i64, r1: i64, c2: i64, r2: i64| -> f64 {
            range_numbers(&sum_values, sheet.as_str(), c1, r1, c2, r2)
                .iter()
                .sum()
        },
    );

    let avg_values = values.clone();
    engine.register_fn(
        "AVERAGE_RANGE",
        move |sheet: ImmutableString, c1: i64, r1: i64, c2: i64, r2: i64| -> f64 {
            let nums = range_numbers(&avg_values, sheet.as_str(), c1, r1, c2, r2);
            if nums.is_empty() {
                0.0
            } else {
                nums.iter().sum::<f64>() / nums.len() as f64
            }
        },
    );

    let min_values = values.clone();
    engine.register_fn(
        "MIN_RANGE",
        move |sheet: ImmutableString, c1: i64, r1: i64, c2: i64, r2: i64| -> f64 {
            let nums = range_numbers(&min_values, sheet.as_str(), c1, r1, c2, r2);
            if nums.is_empty() {
                0.0
            } else {
                nums.iter().fold(f64::INFINITY, |a, b| a.min(*b))
            }
        },
    );

    let max_values = values.clone();
    engine.register_fn(
        "MAX_RANGE",
        move |sheet: ImmutableString, c1: i64, r1: i64, c2: i64, r2: i64| -> f64 {
            let nums = range_numbers(&max_values, sheet.as_str(), c1, r1, c2, r2);
            if nums.is_empty() {
                0.0
            } else {
                nums.iter().fold(f64::NEG_INFINITY, |a, b| a.max(*b))
            }
        },
    );

    let count_values = values;
    engine.register_fn(
        "COUNT_RANGE",
        move |sheet: ImmutableString, c1: i64, r1: i64, c2: i64, r2: i64| -> f64 {
            range_numbers(&count_values, sheet.as_str(), c1, r1, c2, r2).len() as f64
        },
    );

    engine
}

/// Numeric values inside a rectangular range; empty and text cells are
/// skipped, matching the aggregate semantics of the source format.
fn range_numbers(
    values: &SharedValues,
    sheet: &str,
    c1: i64,
    r1: i64,
    c2: i64,
    r2: i64,
) -> Vec<f64> {
    let min_row = r1.min(r2).max(0) as u32;
    let max_row = r1.max(r2).max(0) as u32;
    let min_col = c1.min(c2).max(0) as u32;
    let max_col = c1.max(c2).max(0) as u32;
    let mut nums = Vec::new();
    for row in min_row..=max_row {
        for col in min_col..=max_col {
            let addr = coord_to_a1((row, col));
            if let Some(value) = values.get(&(sheet.to_string(), addr)) {
                if let CellValue::Number(n) = value.value() {
                    nums.push(*n);
                }
            }
        }
    }
    nums
}

/// Empty cells participate in arithmetic as 0, as spreadsheet engines do.
fn value_to_dynamic(value: &CellValue) -> Dynamic {
    match value {
        CellValue::Empty => Dynamic::from(0.0_f64),
        CellValue::Number(n) => Dynamic::from(*n),
        CellValue::Text(s) => Dynamic::from(s.clone()),
        CellValue::Boolean(b) => Dynamic::from(*b),
    }
}

fn dynamic_to_value(value: Dynamic) -> CellValue {
    if value.is_unit() {
        return CellValue::Empty;
    }
    if let Ok(b) = value.as_bool() {
        return CellValue::Boolean(b);
    }
    if let Ok(n) = value.as_int() {
        return CellValue::Number(n as f64);
    }
    if let Ok(n) = value.as_float() {
        return CellValue::Number(n);
    }
    if value.is_string() {
        return match value.into_immutable_string() {
            Ok(s) => CellValue::Text(s.into()),
            Err(_) => CellValue::Empty,
        };
    }
    CellValue::Text(value.to_string())
}
