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

//! Simple CLI for JSONPath evaluation
//!
//! A command-line interface for evaluating JSONPath queries against JSON
//! documents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use octofhir_jsonpath::typing::format_type_list;
use octofhir_jsonpath::{
    Compiler, DiagnosticCollector, Evaluator, JsonPathCompiler, JsonPathConfig,
    default_repository,
};
use serde_json::Value as JsonValue;
use std::fs;
use std::io::{self, Read};
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "octofhir-jsonpath")]
#[command(about = "Simple JSONPath CLI for evaluating queries against JSON documents")]
#[command(version)]
#[command(author = "OctoFHIR Team <funyloony@gmail.com>")]
struct Cli {
    /// JSON file with compiler and evaluator settings
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a JSONPath query against a JSON document
    Evaluate {
        /// JSONPath query to evaluate
        expression: String,
        /// JSON file to query (reads from stdin if not provided)
        #[arg(short, long)]
        file: Option<String>,
        /// Print normalized paths instead of values
        #[arg(long)]
        paths: bool,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
        /// Suppress informational messages
        #[arg(short, long)]
        quiet: bool,
    },
    /// Compile a JSONPath query and report every diagnostic
    Validate {
        /// JSONPath query to validate
        expression: String,
        /// Suppress informational messages
        #[arg(short, long)]
        quiet: bool,
    },
    /// List the registered function extensions with their signatures
    Functions,
}

fn main() -> Result<()> {
    // Setup human-panic for better error messages
    human_panic::setup_panic!();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Evaluate {
            expression,
            file,
            paths,
            pretty,
            quiet,
        } => handle_evaluate(&config, &expression, file.as_deref(), paths, pretty, quiet),
        Commands::Validate { expression, quiet } => {
            handle_validate(&config, &expression, quiet);
            Ok(())
        }
        Commands::Functions => {
            handle_functions();
            Ok(())
        }
    }
}

fn load_config(path: Option<&str>) -> Result<JsonPathConfig> {
    let Some(path) = path else {
        return Ok(JsonPathConfig::default());
    };
    let content =
        fs::read_to_string(path).with_context(|| format!("Error reading config '{path}'"))?;
    JsonPathConfig::from_json_str(&content).with_context(|| format!("Error parsing config '{path}'"))
}

fn compiler(config: &JsonPathConfig, collector: &Arc<DiagnosticCollector>) -> Compiler {
    Compiler::with_config(
        default_repository(),
        collector.clone(),
        config.compiler.clone(),
    )
}

fn handle_evaluate(
    config: &JsonPathConfig,
    expression: &str,
    file: Option<&str>,
    paths: bool,
    pretty: bool,
    quiet: bool,
) -> Result<()> {
    let document_data = match file {
        Some(filename) => fs::read_to_string(filename)
            .with_context(|| format!("Error reading file '{filename}'"))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Error reading from stdin")?;
            buffer
        }
    };
    let document: JsonValue =
        serde_json::from_str(&document_data).context("Error parsing JSON document")?;

    let collector = Arc::new(DiagnosticCollector::new());
    let Some(path) = compiler(config, &collector).compile(expression) else {
        for diagnostic in collector.take() {
            eprintln!("✗ {diagnostic}");
        }
        process::exit(1);
    };

    let nodes = Evaluator::new(config.evaluator.clone()).evaluate(&path, &document);
    if !quiet {
        eprintln!("Expression: {expression}");
        eprintln!("Matched {} nodes", nodes.len());
    }

    let result = if paths {
        JsonValue::from(nodes.paths())
    } else {
        JsonValue::from_iter(nodes.values().into_iter().cloned())
    };
    let output = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{output}");
    Ok(())
}

fn handle_validate(config: &JsonPathConfig, expression: &str, quiet: bool) {
    let collector = Arc::new(DiagnosticCollector::new());
    if compiler(config, &collector).compile(expression).is_some() {
        if !quiet {
            println!("✓ Expression is valid");
            println!("Expression: {expression}");
        } else {
            println!("VALID");
        }
        return;
    }

    if !quiet {
        eprintln!("✗ Invalid expression: {expression}");
        for diagnostic in collector.take() {
            eprintln!("  {diagnostic}");
        }
    } else {
        eprintln!("INVALID");
    }
    process::exit(1);
}

fn handle_functions() {
    let repository = default_repository();
    for name in repository.names() {
        let Some(function) = repository.lookup(&name) else {
            continue;
        };
        println!(
            "{name}({}) -> {}",
            format_type_list(function.argument_types()),
            function.return_type()
        );
        let documentation = function.documentation();
        if !documentation.is_empty() {
            println!("    {documentation}");
        }
    }
}
