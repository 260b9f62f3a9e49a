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

//! JSONPath Performance Benchmarks
//!
//! Benchmark suite covering tokenizer, compiler, and evaluator performance.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use octofhir_jsonpath::parser::tokenizer::tokenize;
use octofhir_jsonpath::{Compiler, Evaluator, JsonPathCompiler};
use serde_json::{Value, json};
use std::hint::black_box;

const TEST_EXPRESSIONS: &[(&str, &str)] = &[
    ("simple", "$.store.book[0].title"),
    ("medium", "$.store.book[?@.price < 10].title"),
    (
        "complex",
        "$..book[?length(@.title) > 5 && (match(@.category, 'fic.*') || @.price >= 20)].author",
    ),
];

fn document(books: usize) -> Value {
    let book: Vec<Value> = (0..books)
        .map(|i| {
            json!({
                "category": if i % 2 == 0 { "fiction" } else { "reference" },
                "author": format!("Author {i}"),
                "title": format!("Title number {i}"),
                "price": (i % 30) as f64 + 0.99,
            })
        })
        .collect();
    json!({"store": {"book": book, "bicycle": {"color": "red", "price": 19.95}}})
}

fn bench_tokenizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenizer");
    group.throughput(Throughput::Elements(1));

    for (complexity, expression) in TEST_EXPRESSIONS {
        group.bench_with_input(
            BenchmarkId::new("tokenize", complexity),
            expression,
            |b, expr| b.iter(|| black_box(tokenize(black_box(expr)))),
        );
    }

    group.finish();
}

fn bench_compiler(c: &mut Criterion) {
    let mut group = c.benchmark_group("compiler");
    group.throughput(Throughput::Elements(1));
    let compiler = Compiler::default();

    for (complexity, expression) in TEST_EXPRESSIONS {
        group.bench_with_input(
            BenchmarkId::new("compile", complexity),
            expression,
            |b, expr| b.iter(|| black_box(compiler.compile(black_box(expr)))),
        );
    }

    group.finish();
}

fn bench_evaluator(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluator");
    let compiler = Compiler::default();
    let evaluator = Evaluator::default();

    for size in [10, 1000] {
        let input = document(size);
        group.throughput(Throughput::Elements(size as u64));

        for (complexity, expression) in TEST_EXPRESSIONS {
            let Some(path) = compiler.compile(expression) else {
                panic!("benchmark expression {expression} does not compile");
            };
            group.bench_with_input(
                BenchmarkId::new(format!("evaluate_{complexity}"), size),
                &input,
                |b, input| b.iter(|| black_box(evaluator.evaluate(&path, black_box(input)).len())),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_tokenizer, bench_compiler, bench_evaluator);
criterion_main!(benches);
