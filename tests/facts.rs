//! End-to-end tests: facts evaluated against a context with real and
//! placeholder collaborators, the way an external runner would drive the
//! engine.

use factual::{
    anything, args, fact, named, Checker, CheckerRegistry, FuncRef, MockContext, Value,
};

fn int(i: i64) -> Value {
    Value::Int(i)
}

/// A context modeling a small service: `fetch_user` is a placeholder
/// (network-backed in production, must be mocked here), `greeting` is real
/// and composes over it.
fn service_context() -> MockContext {
    let ctx = MockContext::new();
    ctx.placeholder("fetch_user");

    let users = ctx.clone();
    ctx.register("greeting", move |args| match args {
        [id] => {
            let name = users.call("fetch_user", std::slice::from_ref(id))?;
            match name {
                Value::Str(name) => Ok(Value::Str(format!("hello, {}", name))),
                other => anyhow::bail!("fetch_user returned {}", other),
            }
        }
        _ => anyhow::bail!("greeting expects one argument"),
    });
    ctx
}

#[test]
fn greeting_composes_over_mocked_fetch() {
    let ctx = service_context();

    fact("greets the fetched user by name")
        .provided("fetch_user", args![7], "ada")
        .asserts(|s| s.call("greeting", &[int(7)]), "hello, ada")
        .check(&ctx);
}

#[test]
fn facts_do_not_leak_stubs_into_each_other() {
    let ctx = service_context();

    let first = fact("mocks fetch_user")
        .provided("fetch_user", args![1], "grace")
        .asserts(|s| s.call("fetch_user", &[int(1)]), "grace")
        .evaluate(&ctx);
    assert!(first.passed());

    // The placeholder is exposed again: calling it without a clause in a
    // later fact is the author-forgot-to-mock error, not a stale stub.
    let second = fact("forgot to mock fetch_user")
        .asserts(|s| s.call("fetch_user", &[int(1)]), "grace")
        .evaluate(&ctx);
    assert!(!second.passed());
    assert_eq!(
        second.fatal.unwrap().kind,
        "undefined-function-called"
    );
}

#[test]
fn report_serializes_for_an_external_runner() {
    let ctx = service_context();

    let result = fact("greets the fetched user by name")
        .provided("fetch_user", args![7], "ada")
        .provided("fetch_user", args![8], "lin")
        .asserts(|s| s.call("greeting", &[int(7)]), "hello, ada")
        .evaluate(&ctx);

    // One clause triggered, one not; the runner gets all of it as data.
    assert!(!result.passed());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["name"], "greets the fetched user by name");
    assert_eq!(json["assertions"][0]["passed"], true);
    assert_eq!(json["assertions"][0]["actual"], "hello, ada");
    assert_eq!(json["expectations"][0]["triggered"], true);
    assert_eq!(json["expectations"][1]["triggered"], false);
    assert_eq!(json["unsatisfied"][0]["function"], "fetch_user");
    assert_eq!(json["fatal"], serde_json::Value::Null);
}

#[test]
fn wildcard_and_pattern_matchers_in_clauses() {
    let ctx = MockContext::new();
    ctx.placeholder("read_file");

    fact("any env file reads as empty")
        .provided(
            "read_file",
            vec![named("pattern", vec![Value::from("*.env")]), anything()],
            "",
        )
        .asserts(
            |s| s.call("read_file", &[Value::from("local.env"), Value::Bool(true)]),
            "",
        )
        .check(&ctx);
}

#[test]
fn custom_checker_registered_by_a_collaborator() {
    let mut registry = CheckerRegistry::default();
    registry.register("sorted", |args| {
        if !args.is_empty() {
            return Err("sorted takes no arguments".to_string());
        }
        Ok(Checker::new("sorted", |v| match v {
            Value::List(items) => items.windows(2).all(|w| match (&w[0], &w[1]) {
                (Value::Int(a), Value::Int(b)) => a <= b,
                _ => false,
            }),
            _ => false,
        }))
    });

    let ctx = MockContext::new();
    ctx.register("range", |_| {
        Ok(Value::from(vec![int(1), int(2), int(3)]))
    });

    fact("range is sorted")
        .with_registry(registry)
        .asserts(|s| s.call("range", &[]), named("sorted", vec![]))
        .check(&ctx);
}

#[test]
fn predicate_checkers_judge_call_arguments() {
    let positive = FuncRef::new("positive?", |args| match args {
        [Value::Int(n)] => Ok(Value::Bool(*n > 0)),
        _ => Ok(Value::Bool(false)),
    });

    let ctx = MockContext::new();
    ctx.placeholder("store");

    let result = fact("stores only positive amounts")
        .provided("store", vec![positive.into()], true)
        .asserts(|s| s.call("store", &[int(-5)]), true)
        .evaluate(&ctx);

    // -5 fails the argument predicate: that call was untested behavior.
    assert!(!result.passed());
    assert_eq!(result.fatal.unwrap().kind, "unexpected-call");
}

#[test]
fn a_runner_loop_collects_structured_results() {
    let ctx = service_context();

    let facts = vec![
        fact("greets ada")
            .provided("fetch_user", args![7], "ada")
            .asserts(|s| s.call("greeting", &[int(7)]), "hello, ada"),
        fact("greets the wrong person")
            .provided("fetch_user", args![7], "ada")
            .asserts(|s| s.call("greeting", &[int(7)]), "hello, lin"),
    ];

    let results: Vec<_> = facts.into_iter().map(|f| f.evaluate(&ctx)).collect();

    assert!(results[0].passed());
    assert!(!results[1].passed());
    assert_eq!(
        results[1].failures(),
        vec!["expected \"hello, lin\", got \"hello, ada\"".to_string()]
    );
}
