// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runtime Interval Tests
//!
//! Interval models whose bounds come from `now()` or bind variables,
//! evaluated per execution.

use chrono::{TimeZone, Utc};
use where_intrinsics::core::parse_partial_timestamp;
use where_intrinsics::{
    parse_predicate, BoundParams, DataType, IntervalList, IntrinsicModel, IntrinsicValue, Schema,
    SchemaBuilder, Value, WhereClauseAnalyzer,
};

fn quotes_table() -> Schema {
    SchemaBuilder::new("x")
        .add("bid", DataType::Float)
        .add_indexed_symbol("sym")
        .add_designated_timestamp("timestamp")
        .build()
}

fn model_of(sql: &str) -> IntrinsicModel {
    let schema = quotes_table();
    let predicate = parse_predicate(sql).unwrap();
    WhereClauseAnalyzer::for_table(&schema)
        .extract_predicate(&predicate, None)
        .unwrap()
}

fn micros(s: &str) -> i64 {
    parse_partial_timestamp(s).unwrap().floor
}

fn evaluate(sql: &str, binds: &BoundParams, now: i64) -> String {
    let model = model_of(sql);
    assert_eq!(model.intrinsic_value, IntrinsicValue::Undefined, "{}", sql);
    assert!(model.static_intervals().is_none(), "{} should be dynamic", sql);
    model.build_interval_model().evaluate(binds, now).to_string()
}

fn no_binds() -> BoundParams {
    BoundParams::default()
}

#[test]
fn test_between_now_and_dateadd() {
    let result = evaluate(
        "timestamp between now() and dateadd('d', 1, now())",
        &no_binds(),
        micros("2014-01-03T12:30:00.000000Z"),
    );
    assert_eq!(
        result,
        "[{lo=2014-01-03T12:30:00.000000Z, hi=2014-01-04T12:30:00.000000Z}]"
    );

    // bounds in either order
    let result = evaluate(
        "timestamp between dateadd('d', 1, now()) and now()",
        &no_binds(),
        micros("2014-01-03T12:30:00.000000Z"),
    );
    assert_eq!(
        result,
        "[{lo=2014-01-03T12:30:00.000000Z, hi=2014-01-04T12:30:00.000000Z}]"
    );
}

#[test]
fn test_less_than_now() {
    let result = evaluate("timestamp < now()", &no_binds(), 86_400_000_000);
    assert_eq!(result, "[{lo=, hi=1970-01-01T23:59:59.999999Z}]");

    let result = evaluate("now() >= timestamp", &no_binds(), 86_400_000_000);
    assert_eq!(result, "[{lo=, hi=1970-01-02T00:00:00.000000Z}]");
}

#[test]
fn test_now_with_not_in() {
    let sql = "timestamp not in '2020-01' and now() <= timestamp";
    assert_eq!(
        evaluate(sql, &no_binds(), micros("2020-01-10T00:00:00.000000Z")),
        "[{lo=2020-02-01T00:00:00.000000Z, hi=294247-01-10T04:00:54.775807Z}]"
    );
    assert_eq!(
        evaluate(sql, &no_binds(), micros("2019-12-31T12:00:00.000000Z")),
        "[{lo=2019-12-31T12:00:00.000000Z, hi=2019-12-31T23:59:59.999999Z},\
         {lo=2020-02-01T00:00:00.000000Z, hi=294247-01-10T04:00:54.775807Z}]"
    );
}

#[test]
fn test_static_base_narrowed_at_runtime() {
    let sql = "timestamp in '2015' and timestamp > now()";
    assert_eq!(
        evaluate(sql, &no_binds(), micros("2015-12-31T00:00:00.000000Z")),
        "[{lo=2015-12-31T00:00:00.000001Z, hi=2015-12-31T23:59:59.999999Z}]"
    );
    assert_eq!(
        evaluate(sql, &no_binds(), micros("2020-01-01T00:00:00.000000Z")),
        "[]"
    );
}

#[test]
fn test_bind_variable_bounds() {
    let sql = "timestamp >= $1 and timestamp < $2";
    let binds = BoundParams::new(("2015-02-23", "2015-02-24"));
    assert_eq!(
        evaluate(sql, &binds, 0),
        "[{lo=2015-02-23T00:00:00.000000Z, hi=2015-02-23T23:59:59.999999Z}]"
    );

    // timestamps and epoch microseconds bind as exact instants
    let from = Utc.with_ymd_and_hms(2015, 2, 23, 10, 0, 0).unwrap();
    let binds = BoundParams::new((from, micros("2015-02-23T11:00:00.000000Z")));
    assert_eq!(
        evaluate(sql, &binds, 0),
        "[{lo=2015-02-23T10:00:00.000000Z, hi=2015-02-23T10:59:59.999999Z}]"
    );

    // the same model serves several executions
    let model = model_of(sql).build_interval_model();
    let mut binds = BoundParams::new(("2015-02-23", "2015-02-24"));
    let first = model.evaluate(&binds, 0);
    binds.set(1, "2015-02-23T12:00");
    let second = model.evaluate(&binds, 0);
    assert_eq!(first.len(), 1);
    assert_eq!(
        second.to_string(),
        "[{lo=2015-02-23T00:00:00.000000Z, hi=2015-02-23T11:59:59.999999Z}]"
    );
}

#[test]
fn test_unresolved_binds_degrade() {
    let sql = "timestamp >= $1 and timestamp < $2";

    let binds = BoundParams::new((None::<&str>, "2015-02-24"));
    assert_eq!(
        evaluate(sql, &binds, 0),
        "[{lo=, hi=2015-02-23T23:59:59.999999Z}]"
    );

    let binds = BoundParams::new(("not a date", "2015-02-24"));
    assert_eq!(
        evaluate(sql, &binds, 0),
        "[{lo=, hi=2015-02-23T23:59:59.999999Z}]"
    );

    // a missing bind opens the bound as well
    assert_eq!(evaluate(sql, &no_binds(), 0), IntervalList::full().to_string());

    // an unresolved exclusion removes nothing
    let binds = BoundParams::new((Value::null(DataType::Timestamp),));
    assert_eq!(
        evaluate("timestamp in '2015' and timestamp != $1", &binds, 0),
        "[{lo=2015-01-01T00:00:00.000000Z, hi=2015-12-31T23:59:59.999999Z}]"
    );
}

#[test]
fn test_unresolved_bind_opens_one_bound() {
    let null = BoundParams::new((Value::null(DataType::Timestamp),));

    assert_eq!(
        evaluate("timestamp between $1 and '2015-01-01'", &null, 0),
        "[{lo=, hi=2015-01-01T23:59:59.999999Z}]"
    );

    // a NULL element of an IN list matches like the literal null
    let literal = model_of("timestamp in ('2015', null)")
        .static_intervals()
        .map(|l| l.to_string());
    assert_eq!(
        literal.as_deref(),
        Some("[{lo=, hi=},{lo=2015-01-01T00:00:00.000000Z, hi=2015-12-31T23:59:59.999999Z}]")
    );
    assert_eq!(
        Some(evaluate("timestamp in ('2015', $1)", &null, 0)),
        literal
    );
}

#[test]
fn test_bind_past_the_domain_matches_literal() {
    assert_eq!(
        model_of("timestamp > 9223372036854775807").intrinsic_value,
        IntrinsicValue::False
    );

    let binds = BoundParams::new((Value::Timestamp(i64::MAX),));
    assert_eq!(evaluate("timestamp > $1", &binds, 0), "[]");
}

#[test]
fn test_in_list_with_binds() {
    let binds = BoundParams::new(("2015-03-01T10:00",));
    assert_eq!(
        evaluate("timestamp in ('2015-02-23', $1)", &binds, 0),
        "[{lo=2015-02-23T00:00:00.000000Z, hi=2015-02-23T23:59:59.999999Z},\
         {lo=2015-03-01T10:00:00.000000Z, hi=2015-03-01T10:00:59.999999Z}]"
    );

    let binds = BoundParams::new(("2015-02-23",));
    assert_eq!(
        evaluate("timestamp not in ($1) and timestamp in '2015-02'", &binds, 0),
        "[{lo=2015-02-01T00:00:00.000000Z, hi=2015-02-22T23:59:59.999999Z},\
         {lo=2015-02-24T00:00:00.000000Z, hi=2015-02-28T23:59:59.999999Z}]"
    );
}

#[test]
fn test_not_between_runtime_bounds() {
    let sql = "timestamp in '2015-02-23' and timestamp not between $1 and now()";
    let binds = BoundParams::new(("2015-02-23T10:00",));
    assert_eq!(
        evaluate(sql, &binds, micros("2015-02-23T12:00:00.000000Z")),
        "[{lo=2015-02-23T00:00:00.000000Z, hi=2015-02-23T09:59:59.999999Z},\
         {lo=2015-02-23T12:00:00.000001Z, hi=2015-02-23T23:59:59.999999Z}]"
    );
}

#[test]
fn test_models_without_timestamp_predicates() {
    let model = model_of("sym = 'a' and bid > 1");
    assert!(!model.has_interval_filters());
    assert_eq!(
        model.build_interval_model().evaluate(&no_binds(), 0),
        IntervalList::full()
    );

    let model = model_of("timestamp in '2015'");
    let runtime = model.build_interval_model();
    assert!(runtime.is_static());
    assert_eq!(Some(runtime.base()), model.static_intervals());
}

#[test]
fn test_concurrent_evaluation() {
    let model = model_of("timestamp > dateadd('h', -1, now()) and timestamp <= now()")
        .build_interval_model();

    let results: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|day| {
                let model = &model;
                scope.spawn(move || {
                    let now = micros("2015-02-01T12:00:00.000000Z") + day * 86_400_000_000;
                    model.evaluate(&no_binds(), now).to_string()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("evaluation thread panicked"))
            .collect()
    });

    for (day, result) in results.iter().enumerate() {
        let date = format!("2015-02-{:02}", day + 1);
        assert_eq!(
            result,
            &format!(
                "[{{lo={}T11:00:00.000001Z, hi={}T12:00:00.000000Z}}]",
                date, date
            )
        );
    }
}
