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

//! Key Column Tests
//!
//! Symbol key extraction: inclusion and exclusion sets, sub-query keys,
//! preferred columns and NULL keys.

use where_intrinsics::{
    parse_predicate, AnalyzerConfig, DataType, Error, IntrinsicModel, IntrinsicValue, KeyValue,
    Predicate, Result, Schema, SchemaBuilder, WhereClauseAnalyzer,
};

fn quotes_table() -> Schema {
    SchemaBuilder::new("x")
        .add("bid", DataType::Float)
        .add("ask", DataType::Float)
        .add_indexed_symbol("sym")
        .add_indexed_symbol("mode")
        .add_indexed_symbol("ex")
        .add("venue", DataType::Symbol)
        .add_designated_timestamp("timestamp")
        .build()
}

fn analyze_on(
    schema: &Schema,
    sql: &str,
    preferred: Option<&str>,
) -> Result<(Predicate, IntrinsicModel)> {
    let predicate = parse_predicate(sql)?;
    let model = WhereClauseAnalyzer::for_table(schema).extract_predicate(&predicate, preferred)?;
    Ok((predicate, model))
}

fn analyze(sql: &str) -> (Predicate, IntrinsicModel) {
    analyze_on(&quotes_table(), sql, None).expect("analysis failed")
}

fn analyze_preferred(sql: &str, preferred: &str) -> (Predicate, IntrinsicModel) {
    analyze_on(&quotes_table(), sql, Some(preferred)).expect("analysis failed")
}

#[test]
fn test_in_list_with_filter() {
    let (p, m) = analyze("sym in ('X', 'Y') and bid > 10");
    assert_eq!(m.intrinsic_value, IntrinsicValue::Undefined);
    assert_eq!(m.key_column.as_deref(), Some("sym"));
    assert_eq!(m.key_values.to_string(), "[X,Y]");
    assert!(m.key_excluded_values.is_empty());
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("bid > 10"));
}

#[test]
fn test_or_of_equalities_becomes_in_list() {
    let (p, m) = analyze("(sym = 'X' or sym = 'Y') and bid > 10");
    assert_eq!(m.key_column.as_deref(), Some("sym"));
    assert_eq!(m.key_values.to_string(), "[X,Y]");
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("bid > 10"));

    let (p, m) = analyze("sym = 'a' or ex = 'b'");
    assert!(m.key_column.is_none());
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("sym = 'a' or ex = 'b'"));

    let (p, m) = analyze_on(&quotes_table(), "sym in ('a') or sym in ('b')", None).unwrap();
    assert_eq!(m.key_values.to_string(), "[a,b]");
    assert!(m.filter_sql(&p.arena).is_none());
}

#[test]
fn test_or_merging_disabled() {
    let schema = quotes_table();
    let p = parse_predicate("sym = 'a' or sym = 'b'").unwrap();
    let m = WhereClauseAnalyzer::for_table(&schema)
        .with_config(AnalyzerConfig::new().with_merge_or_branches(false))
        .extract_predicate(&p, None)
        .unwrap();
    assert!(m.key_column.is_none());
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("sym = 'a' or sym = 'b'"));
}

#[test]
fn test_in_lists_intersect() {
    let (_, m) = analyze("sym in ('a', 'b', 'c') and sym in ('b', 'c', 'd')");
    assert_eq!(m.key_values.to_string(), "[b,c]");

    let (_, m) = analyze("sym in ('a', 'b', 'c') and sym != 'b'");
    assert_eq!(m.key_values.to_string(), "[a,c]");
    assert!(m.key_excluded_values.is_empty());

    let (_, m) = analyze("SYM = 'a' and sym in ('a', 'z')");
    assert_eq!(m.key_column.as_deref(), Some("sym"));
    assert_eq!(m.key_values.to_string(), "[a]");
}

#[test]
fn test_disjoint_keys_are_false() {
    for sql in [
        "sym in ('a', 'b') and sym = 'c'",
        "sym = 'a' and sym != 'a'",
        "sym in ('a', 'b') and not (sym in ('a', 'b')) and bid > 1",
        "sym = 'a' and timestamp in '2015' and sym = 'b'",
    ] {
        let (_, m) = analyze(sql);
        assert_eq!(m.intrinsic_value, IntrinsicValue::False, "{}", sql);
        assert!(m.key_column.is_none(), "{}", sql);
        assert!(m.filter.is_none(), "{}", sql);
    }
}

#[test]
fn test_exclusions() {
    let (p, m) = analyze("sym != 'x' and sym != 'y'");
    assert_eq!(m.key_column.as_deref(), Some("sym"));
    assert!(m.key_values.is_empty());
    assert_eq!(m.key_excluded_values.to_string(), "[x,y]");
    assert!(m.filter_sql(&p.arena).is_none());

    let (_, m) = analyze("not (sym in ('x', 'y'))");
    assert_eq!(m.key_excluded_values.to_string(), "[x,y]");

    let (_, m) = analyze("sym not in ('x', 'y') and sym != 'z'");
    assert_eq!(m.key_excluded_values.to_string(), "[x,y,z]");

    // NOT of an equality is an exclusion
    let (_, m) = analyze("not (sym = 'x')");
    assert_eq!(m.key_excluded_values.to_string(), "[x]");

    // an inclusion is preferred over a column with only exclusions
    let (p, m) = analyze("ex != 'x' and sym = 'a'");
    assert_eq!(m.key_column.as_deref(), Some("sym"));
    assert_eq!(m.key_values.to_string(), "[a]");
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("ex != 'x'"));
}

#[test]
fn test_integer_key_values() {
    let (_, m) = analyze("ex in (1, 2)");
    assert_eq!(m.key_column.as_deref(), Some("ex"));
    assert_eq!(m.key_values.as_slice(), &[KeyValue::from("1"), KeyValue::from("2")]);
}

#[test]
fn test_sub_query_key() {
    let (p, m) = analyze("ex in (1, 2) and sym in (select * from xyz)");
    assert_eq!(m.key_column.as_deref(), Some("sym"));
    assert_eq!(m.key_sub_query.as_deref(), Some("select * from xyz"));
    assert!(m.key_values.is_empty());
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("ex in (1, 2)"));

    // value predicates on the sub-query column stay in the filter
    let (p, m) = analyze("sym = 'a' and sym in (select s from t)");
    assert_eq!(m.key_sub_query.as_deref(), Some("select s from t"));
    assert!(m.key_values.is_empty());
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("sym = 'a'"));
}

#[test]
fn test_negated_sub_query_goes_to_filter() {
    let (p, m) = analyze("not (sym in (select a from xyz)) and not (ex in (1, 2))");
    assert_eq!(m.key_column.as_deref(), Some("ex"));
    assert!(m.key_sub_query.is_none());
    assert_eq!(m.key_excluded_values.to_string(), "[1,2]");
    assert_eq!(
        m.filter_sql(&p.arena).as_deref(),
        Some("not sym in (select a from xyz)")
    );

    let (p, m) = analyze("sym not in (select a from xyz)");
    assert!(m.key_column.is_none());
    assert_eq!(
        m.filter_sql(&p.arena).as_deref(),
        Some("sym not in (select a from xyz)")
    );
}

#[test]
fn test_sub_query_mixed_with_values_goes_to_filter() {
    let (p, m) = analyze("sym in ('a', (select s from t))");
    assert!(m.key_column.is_none());
    assert_eq!(
        m.filter_sql(&p.arena).as_deref(),
        Some("sym in ('a', (select s from t))")
    );
}

#[test]
fn test_multiple_lambdas() {
    let err = analyze_on(
        &quotes_table(),
        "sym in (select a from x) and sym in (select b from y)",
        None,
    )
    .unwrap_err();
    assert_eq!(err, Error::MultipleLambda { position: 4 });

    let (p, m) = analyze("sym in (select a from x) and ex in (select b from y)");
    assert_eq!(m.key_column.as_deref(), Some("sym"));
    assert_eq!(m.key_sub_query.as_deref(), Some("select a from x"));
    assert_eq!(
        m.filter_sql(&p.arena).as_deref(),
        Some("ex in (select b from y)")
    );
}

#[test]
fn test_preferred_column() {
    let (p, m) = analyze_preferred("sym = 'a' and ex = 'b'", "ex");
    assert_eq!(m.key_column.as_deref(), Some("ex"));
    assert_eq!(m.key_values.to_string(), "[b]");
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("sym = 'a'"));

    // the preferred column does not need an index
    let (p, m) = analyze_preferred("venue = 'v' and sym = 'a'", "VENUE");
    assert_eq!(m.key_column.as_deref(), Some("venue"));
    assert_eq!(m.key_values.to_string(), "[v]");
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("sym = 'a'"));

    // no predicate on the preferred column
    let (p, m) = analyze_preferred("sym = 'a'", "ex");
    assert!(m.key_column.is_none());
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("sym = 'a'"));

    // the preferred column wins over an earlier sub-query
    let (p, m) = analyze_preferred("sym in (select s from t) and ex = 'b'", "ex");
    assert_eq!(m.key_column.as_deref(), Some("ex"));
    assert!(m.key_sub_query.is_none());
    assert_eq!(
        m.filter_sql(&p.arena).as_deref(),
        Some("sym in (select s from t)")
    );
}

#[test]
fn test_non_indexed_and_non_symbol_columns() {
    let (p, m) = analyze("venue = 'v'");
    assert!(m.key_column.is_none());
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("venue = 'v'"));

    let (p, m) = analyze("bid = 10 and sym = bid");
    assert!(m.key_column.is_none());
    assert_eq!(
        m.filter_sql(&p.arena).as_deref(),
        Some("bid = 10 and sym = bid")
    );

    let (p, m) = analyze("sym = upper('a')");
    assert!(m.key_column.is_none());
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("sym = upper('a')"));
}

#[test]
fn test_unknown_column() {
    let err = analyze_on(&quotes_table(), "xyz = 'a'", None).unwrap_err();
    assert_eq!(err, Error::invalid_column(0, "xyz"));

    let err = analyze_on(&quotes_table(), "not (xyz in ('a'))", None).unwrap_err();
    assert_eq!(err, Error::invalid_column(5, "xyz"));
    assert!(err.to_string().contains("Invalid column: xyz"));
}

#[test]
fn test_null_keys() {
    let (_, m) = analyze("sym = null");
    assert_eq!(m.key_column.as_deref(), Some("sym"));
    assert_eq!(m.key_values.as_slice(), &[KeyValue::Null]);

    let (_, m) = analyze("sym in ('a', null)");
    assert_eq!(m.key_values.to_string(), "[a,null]");

    let strict = SchemaBuilder::new("y")
        .add_indexed_symbol("sym")
        .add_designated_timestamp("timestamp")
        .null_keys(false)
        .build();
    let (p, m) = analyze_on(&strict, "sym = null and sym != 'b'", None).unwrap();
    assert_eq!(m.key_column.as_deref(), Some("sym"));
    assert_eq!(m.key_excluded_values.to_string(), "[b]");
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("sym = null"));

    let (p, m) = analyze_on(&strict, "sym in ('a', null)", None).unwrap();
    assert!(m.key_column.is_none());
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("sym in ('a', null)"));
}

#[test]
fn test_keys_and_intervals_together() {
    let (p, m) = analyze(
        "sym in ('a', 'b') and timestamp in '2015-02-23' and bid > 1 and sym != 'b'",
    );
    assert_eq!(m.key_column.as_deref(), Some("sym"));
    assert_eq!(m.key_values.to_string(), "[a]");
    assert_eq!(
        m.static_intervals().unwrap().to_string(),
        "[{lo=2015-02-23T00:00:00.000000Z, hi=2015-02-23T23:59:59.999999Z}]"
    );
    assert_eq!(m.filter_sql(&p.arena).as_deref(), Some("bid > 1"));
}
