//! Storing different kinds of callables behind one signature.
//!
//! This example demonstrates:
//! 1. A function item, a callable struct and a closure in one collection
//! 2. Results that only need to convert into the declared return type
//! 3. Thread-safe functions that can be sent to other threads

use std::thread;

use polymorph::{markers::SendSync, prelude::*, space::S1};
use rootcause::prelude::*;
use tracing_subscriber::EnvFilter;

fn foo() -> i32 {
    1
}

/// A callable object: calling it does not go through a closure.
#[derive(Clone)]
struct Foo;

impl Callable<()> for Foo {
    type Output = i32;

    fn call(&self, (): ()) -> i32 {
        2
    }
}

/// A scaled sum of two values, kept inline.
fn scaled_sum(factor: i32) -> InlineFunction<dyn Fn(i32, i32) -> i64, S1> {
    // `i32` converts into the declared `i64`
    InlineFunction::new(move |a: i32, b: i32| (a + b) * factor)
}

/// Runs each function on its own thread.
fn run_on_threads(
    functions: Vec<Function<dyn Fn() -> u64, Heap, SendSync>>,
) -> Result<Vec<u64>, Report> {
    let handles: Vec<_> = functions
        .into_iter()
        .map(|function| thread::spawn(move || function.call()))
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.join() {
            Ok(result) => results.push(result),
            Err(_) => bail!("A worker thread panicked"),
        }
    }
    Ok(results)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Three Callables ===\n");
    let functions: Vec<Function<dyn Fn() -> i32>> = vec![
        Function::new(foo),
        Function::new(Foo),
        Function::new(|| 3),
    ];
    for function in &functions {
        println!("{}", function.call());
    }
    println!();

    println!("=== Converting Results ===\n");
    let double = scaled_sum(2);
    let copy = double.clone();
    println!("(20 + 1) * 2 = {}", double.call(20, 1));
    println!("(1 + 2) * 2 = {}", copy.call(1, 2));
    println!();

    println!("=== Across Threads ===\n");
    let functions: Vec<Function<dyn Fn() -> u64, Heap, SendSync>> = (1..=3_u64)
        .map(|n| Function::new(move || (1..=n * 10).sum::<u64>()))
        .collect();
    match run_on_threads(functions) {
        Ok(results) => println!("{results:?}"),
        Err(report) => println!("{report}"),
    }
}
