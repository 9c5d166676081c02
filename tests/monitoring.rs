//! End-to-end monitoring of parsed formulas over short event streams.

#![cfg(feature = "parser")]

use std::collections::HashMap;
use std::error::Error;

use approx::assert_relative_eq;
use pastel::{
    parse_formula, DenseBooleanNetwork, DenseRobustnessNetwork, DiscreteBooleanNetwork, DiscreteDataNetwork,
    Interval, IntervalMap, IntervalSet, Options, Value,
};

type TestResult = Result<(), Box<dyn Error>>;

fn gear_events() -> Vec<HashMap<&'static str, f64>> {
    [(0.0, 2.0, 3500.0), (1.0, 3.0, 4200.0), (2.0, 3.0, 4100.0), (3.0, 4.0, 3000.0), (4.0, 3.0, 4500.0)]
        .into_iter()
        .map(|(time, gear, rpm)| HashMap::from([("time", time), ("gear", gear), ("rpm", rpm)]))
        .collect()
}

#[test_log::test]
fn discrete_gear_shift() -> TestResult {
    // entering third gear at high rpm must not follow fourth gear in the two events before
    let phi = parse_formula("({gear: 3, rpm >= 4000} && !Y {gear: 3}) -> !once[1:2] {gear: 4}")?;
    let mut network = DiscreteBooleanNetwork::new(&phi, Options::default())?;
    let mut verdicts = Vec::new();

    for event in gear_events() {
        verdicts.push(network.update(&event)?);
    }

    assert_eq!(verdicts, vec![true, true, true, true, false]);

    Ok(())
}

#[test_log::test]
fn dense_verdicts_and_robustness() -> TestResult {
    let phi = parse_formula("historically[0:2] {rpm < 4300}")?;
    let mut boolean = DenseBooleanNetwork::new(&phi, Options::default())?;
    let mut robustness = DenseRobustnessNetwork::new(&phi, Options::default())?;
    let mut holds = IntervalSet::new();
    let mut margin = IntervalMap::<f64, f64>::new();

    for event in gear_events() {
        holds = holds.union(&boolean.update(&event)?);

        for (interval, value) in robustness.update(&event)?.iter() {
            margin.insert(interval, *value);
        }
    }

    assert_eq!(holds, IntervalSet::from_interval(Interval::left_open(0.0, 4.0)));
    assert_relative_eq!(*margin.value_at(0.5).ok_or("uncovered")?, 800.0);
    assert_relative_eq!(*margin.value_at(1.5).ok_or("uncovered")?, 100.0);

    Ok(())
}

#[test_log::test]
fn dense_time_must_not_decrease() -> TestResult {
    let phi = parse_formula("{gear: 3}")?;
    let mut network = DenseBooleanNetwork::new(&phi, Options::default())?;

    network.update(&HashMap::from([("time", 3.0), ("gear", 3.0)]))?;

    let result = network.update(&HashMap::from([("time", 1.0), ("gear", 3.0)]));
    assert!(result.is_err());

    Ok(())
}

#[test_log::test]
fn data_monitor_reports_bindings() -> TestResult {
    let phi = parse_formula("[read, *file] -> once [open, *file]")?;
    let mut network = DiscreteDataNetwork::new(&phi, Options::default())?;

    network.update(&["open", "wonderland"].map(Value::from).to_vec())?;
    network.update(&["read", "wonderland"].map(Value::from).to_vec())?;

    assert!(network.holds());

    network.update(&["read", "looking_glass"].map(Value::from).to_vec())?;

    let mut files = network.bindings("file");
    files.sort();

    assert!(!files.contains(&"looking_glass".to_string()));
    assert!(files.contains(&"wonderland".to_string()));

    Ok(())
}
