// Copyright 2024 OctoFHIR Team
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

//! End-to-end tests for compiling and evaluating JSONPath queries

use octofhir_jsonpath::diagnostics::CoercedArgument;
use octofhir_jsonpath::{
    Compiler, Diagnostic, DiagnosticCollector, Evaluator, ExpressionType, FilterValue,
    FunctionExtensionRepository, JsonPath, JsonPathError, function_extension,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;

fn bookstore() -> Value {
    json!({
        "store": {
            "book": [
                {"category": "reference", "author": "Nigel Rees", "title": "Sayings of the Century", "price": 8.95},
                {"category": "fiction", "author": "Evelyn Waugh", "title": "Sword of Honour", "price": 12.99},
                {"category": "fiction", "author": "Herman Melville", "title": "Moby Dick", "isbn": "0-553-21311-3", "price": 8.99},
                {"category": "fiction", "author": "J. R. R. Tolkien", "title": "The Lord of the Rings", "isbn": "0-395-19395-8", "price": 22.99}
            ],
            "bicycle": {"color": "red", "price": 399}
        }
    })
}

fn compile(
    repository: &Arc<FunctionExtensionRepository>,
    source: &str,
) -> (Option<octofhir_jsonpath::CompiledPath>, Vec<Diagnostic>) {
    let collector = Arc::new(DiagnosticCollector::new());
    let compiler = Compiler::new(Arc::clone(repository), collector.clone());
    let compiled = compiler.compile_with_listener(source, collector.as_ref());
    (compiled, collector.take())
}

fn values(source: &str, document: &Value) -> Vec<Value> {
    JsonPath::parse(source)
        .unwrap()
        .query_values(document)
        .into_iter()
        .cloned()
        .collect()
}

#[rstest]
#[case("$[-1]", vec![json!("c")])]
#[case("$[3]", vec![])]
#[case("$[0]", vec![json!("a")])]
#[case("$[-4]", vec![])]
fn index_selector(#[case] source: &str, #[case] expected: Vec<Value>) {
    assert_eq!(values(source, &json!(["a", "b", "c"])), expected);
}

#[rstest]
#[case("$[1:3]", vec![json!(1), json!(2)])]
#[case("$[::-1]", vec![json!(4), json!(3), json!(2), json!(1), json!(0)])]
#[case("$[::0]", vec![])]
#[case("$[-2:]", vec![json!(3), json!(4)])]
#[case("$[::2]", vec![json!(0), json!(2), json!(4)])]
fn slice_selector(#[case] source: &str, #[case] expected: Vec<Value>) {
    assert_eq!(values(source, &json!([0, 1, 2, 3, 4])), expected);
}

#[test]
fn descendant_segment_visits_in_document_order() {
    let document = json!({"a": {"key": 1, "b": {"key": 2}}});
    assert_eq!(values("$..key", &document), vec![json!(1), json!(2)]);
}

#[test]
fn normalized_paths_of_descendant_wildcard() {
    let document = json!({"o": {"j": 1, "k": 2}, "a": [5, 3]});
    let path = JsonPath::parse("$..[*]").unwrap();
    assert_eq!(
        path.query(&document).paths(),
        vec![
            "$['o']",
            "$['a']",
            "$['o']['j']",
            "$['o']['k']",
            "$['a'][0]",
            "$['a'][1]",
        ]
    );
}

#[rstest]
#[case("$.store.book[?@.price < 10].title", vec![json!("Sayings of the Century"), json!("Moby Dick")])]
#[case("$.store.book[?@.isbn].author", vec![json!("Herman Melville"), json!("J. R. R. Tolkien")])]
#[case("$.store.book[?!@.isbn].price", vec![json!(8.95), json!(12.99)])]
#[case("$.store.book[?@.category == 'fiction' && @.price > 20].title", vec![json!("The Lord of the Rings")])]
#[case("$.store.book[?length(@.title) == 9].title", vec![json!("Moby Dick")])]
#[case("$.store.book[?match(@.author, '.*Waugh')].price", vec![json!(12.99)])]
#[case("$.store.book[?search(@.title, 'of')].price", vec![json!(8.95), json!(12.99), json!(22.99)])]
#[case("$.store[?count(@.*) == 2].price", vec![json!(399)])]
#[case("$.store.book[?value(@..price) < 9].title", vec![json!("Sayings of the Century"), json!("Moby Dick")])]
fn filters_over_bookstore(#[case] source: &str, #[case] expected: Vec<Value>) {
    assert_eq!(values(source, &bookstore()), expected);
}

#[test]
fn evaluation_is_deterministic() {
    let document = bookstore();
    let path = JsonPath::parse("$..*").unwrap();
    let first = path.query(&document).paths();
    for _ in 0..10 {
        assert_eq!(path.query(&document).paths(), first);
    }
}

#[test]
fn recompiling_yields_the_same_results() {
    let document = bookstore();
    let source = "$.store.book[?@.price > 10 || @.category == 'reference'].author";
    let first = JsonPath::parse(source).unwrap();
    let second = JsonPath::parse(source).unwrap();
    assert_eq!(first.query(&document), second.query(&document));
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn empty_node_lists_compare_equal() {
    let document = json!([{"a": 1}, {"b": 2}]);
    assert_eq!(
        values("$[?@.x == @.y]", &document),
        vec![json!({"a": 1}), json!({"b": 2})]
    );
    // Nothing on both sides for the second element only
    assert_eq!(values("$[?@.a == @.y]", &document), vec![json!({"b": 2})]);
}

#[test]
fn value_function_as_test_is_rejected() {
    let repository = Arc::new(FunctionExtensionRepository::with_builtins());
    let (compiled, diagnostics) = compile(&repository, "$[?length(@.a)]");

    assert!(compiled.is_none());
    assert_eq!(
        diagnostics,
        vec![Diagnostic::InvalidFunctionExtensionForTestExpression {
            name: "length".to_string()
        }]
    );
}

#[test]
fn unknown_function_is_reported_once() {
    let repository = Arc::new(FunctionExtensionRepository::with_builtins());
    let (compiled, diagnostics) = compile(&repository, "$[?nope(@.a)]");

    assert!(compiled.is_none());
    assert_eq!(
        diagnostics,
        vec![Diagnostic::UnknownFunctionExtension {
            name: "nope".to_string()
        }]
    );
}

#[test]
fn wrong_argument_count_is_reported() {
    let repository = Arc::new(FunctionExtensionRepository::new());
    repository.register(
        "positive",
        function_extension([ExpressionType::Value], ExpressionType::Logical, |args| {
            let positive = args[0]
                .as_value()
                .and_then(Value::as_f64)
                .is_some_and(|n| n > 0.0);
            FilterValue::Logical(positive)
        }),
    );

    let (compiled, diagnostics) = compile(&repository, "$[?positive(@.a, @.b)]");
    assert!(compiled.is_none());
    assert_eq!(
        diagnostics,
        vec![Diagnostic::InvalidArglistForFunctionExtension {
            name: "positive".to_string(),
            expected: vec![ExpressionType::Value],
            actual: vec![
                CoercedArgument::new(Some(ExpressionType::Value), "@.a"),
                CoercedArgument::new(Some(ExpressionType::Nodes), "@.b"),
            ],
        }]
    );

    let (compiled, diagnostics) = compile(&repository, "$[?positive(@.a)]");
    assert!(diagnostics.is_empty());
    let document = json!([{"a": 2}, {"a": -1}]);
    let results = Evaluator::default().evaluate(&compiled.unwrap(), &document);
    assert_eq!(results.values(), vec![&json!({"a": 2})]);
}

fn typed_repository() -> Arc<FunctionExtensionRepository> {
    let repository = Arc::new(FunctionExtensionRepository::with_builtins());
    repository.register(
        "truthy",
        function_extension([ExpressionType::Logical], ExpressionType::Logical, |args| {
            FilterValue::Logical(args[0].as_logical().unwrap_or(false))
        }),
    );
    repository.register(
        "containers",
        function_extension([ExpressionType::Nodes], ExpressionType::Nodes, |args| {
            match args.into_iter().next() {
                Some(FilterValue::Nodes(nodes)) => FilterValue::Nodes(
                    nodes
                        .into_iter()
                        .filter(|node| node.is_array() || node.is_object())
                        .collect(),
                ),
                _ => FilterValue::Nodes(Vec::new()),
            }
        }),
    );
    // Declares a logical result but answers with a value
    repository.register(
        "mislabeled",
        function_extension([ExpressionType::Nodes], ExpressionType::Logical, |_| {
            FilterValue::owned(json!(true))
        }),
    );
    repository
}

fn select_paths(
    repository: &Arc<FunctionExtensionRepository>,
    source: &str,
    document: &Value,
) -> Vec<String> {
    let (compiled, diagnostics) = compile(repository, source);
    assert_eq!(diagnostics, Vec::<Diagnostic>::new(), "{source}");
    Evaluator::default()
        .evaluate(&compiled.unwrap(), document)
        .paths()
}

#[rstest]
#[case("$[?truthy(@.a == 1)]", vec!["$[0]"])]
#[case("$[?truthy(@.a)]", vec!["$[0]", "$[1]"])]
#[case("$[?truthy(@.a > 1 || @.a == 1)]", vec!["$[0]", "$[1]"])]
#[case("$[?!truthy(@.a)]", vec!["$[2]"])]
fn logical_parameter_receives_test_results(#[case] source: &str, #[case] expected: Vec<&str>) {
    let document = json!([{"a": 1}, {"a": 2}, {"b": 3}]);
    assert_eq!(select_paths(&typed_repository(), source, &document), expected);
}

#[rstest]
#[case("$[?containers(@.*)]", vec!["$[0]", "$[1]"])]
#[case("$[?containers(@.*) == @.a]", vec!["$[0]"])]
#[case("$[?count(containers(@.*)) == 2]", vec!["$[1]"])]
#[case("$[?count(containers(@.*)) == 0]", vec!["$[2]"])]
fn nodes_function_in_every_position(#[case] source: &str, #[case] expected: Vec<&str>) {
    let document = json!([
        {"a": {"x": 1}},
        {"a": [1, 2], "b": {}},
        {"a": 3}
    ]);
    assert_eq!(select_paths(&typed_repository(), source, &document), expected);
}

#[test]
fn wrong_runtime_return_variant_is_treated_as_empty() {
    let repository = typed_repository();
    let document = json!([{"a": 1}, {"a": 2}, {}]);

    assert!(select_paths(&repository, "$[?mislabeled(@.a)]", &document).is_empty());
    assert_eq!(
        select_paths(&repository, "$[?!mislabeled(@.a)]", &document),
        vec!["$[0]", "$[1]", "$[2]"]
    );
}

#[test]
fn logical_function_as_comparable_is_rejected() {
    let repository = Arc::new(FunctionExtensionRepository::with_builtins());
    let (compiled, diagnostics) = compile(&repository, "$[?match(@.a, 'x') == true]");

    assert!(compiled.is_none());
    assert_eq!(
        diagnostics,
        vec![Diagnostic::InvalidFunctionExtensionForComparable {
            name: "match".to_string()
        }]
    );
}

#[test]
fn functions_are_bound_at_compile_time() {
    let repository = Arc::new(FunctionExtensionRepository::with_builtins());
    let document = json!([{"a": "abc"}, {"a": "de"}]);

    let (before, _) = compile(&repository, "$[?length(@.a) == 3]");
    let before = before.unwrap();

    repository.register(
        "length",
        function_extension([ExpressionType::Value], ExpressionType::Value, |_| {
            FilterValue::owned(json!(2))
        }),
    );
    let (after, _) = compile(&repository, "$[?length(@.a) == 3]");
    let after = after.unwrap();

    let evaluator = Evaluator::default();
    assert_eq!(
        evaluator.evaluate(&before, &document).values(),
        vec![&json!({"a": "abc"})]
    );
    assert!(evaluator.evaluate(&after, &document).is_empty());
}

#[test]
fn syntax_errors_carry_a_position() {
    let error = JsonPath::parse("$.a[?@.b ==]").unwrap_err();
    match &error {
        JsonPathError::Compilation { diagnostics, .. } => {
            assert_eq!(diagnostics.len(), 1);
            assert!(diagnostics[0].is_syntax_error());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
#[case("")]
#[case("$.")]
#[case(" $")]
#[case("$[01]")]
#[case("$[?@.a == 1 == 2]")]
#[case("$['unterminated]")]
#[case("@.a")]
fn malformed_queries_are_rejected(#[case] source: &str) {
    assert!(JsonPath::parse(source).is_err(), "{source:?} should not compile");
}

#[test]
fn concurrent_evaluation_shares_one_plan() {
    let path = Arc::new(JsonPath::parse("$.store.book[?@.price < 10].title").unwrap());
    let document = Arc::new(bookstore());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let path = Arc::clone(&path);
            let document = Arc::clone(&document);
            std::thread::spawn(move || {
                (0..100)
                    .map(|_| path.query_values(&document).len())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().into_iter().all(|count| count == 2));
    }
}
