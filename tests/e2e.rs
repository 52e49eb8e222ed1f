use json_logic_check as jlc;
use serde_json::json;

#[test]
fn test_var_whole_context_and_default() {
    let data = json!({"a": 1});
    assert_eq!(jlc::evaluate(&json!({"var": ""}), &data).unwrap(), data);
    assert_eq!(
        jlc::evaluate(&json!({"var": ["missing.path", "default"]}), &json!({})).unwrap(),
        json!("default")
    );
}

#[test]
fn test_truthiness_examples() {
    assert_eq!(jlc::evaluate(&json!({"!!": [[]]}), &json!({})).unwrap(), json!(false));
    assert_eq!(jlc::evaluate(&json!({"!!": ["0"]}), &json!({})).unwrap(), json!(true));
    assert_eq!(jlc::evaluate(&json!({"!!": [[0]]}), &json!({})).unwrap(), json!(true));
    assert_eq!(jlc::evaluate(&json!({"!": [{}]}), &json!({})).unwrap(), json!(false));
}

#[test]
fn test_and_or_return_operands() {
    assert_eq!(jlc::evaluate(&json!({"and": [true, 0, "x"]}), &json!({})).unwrap(), json!(0));
    assert_eq!(
        jlc::evaluate(&json!({"or": [false, 0, "hello"]}), &json!({})).unwrap(),
        json!("hello")
    );
}

#[test]
fn test_if_else_fallthrough() {
    assert_eq!(
        jlc::evaluate(&json!({"if": [false, "a", false, "b", "c"]}), &json!({})).unwrap(),
        json!("c")
    );
}

#[test]
fn test_map_and_reduce() {
    assert_eq!(
        jlc::evaluate(
            &json!({"map": [{"var": "nums"}, {"*": [{"var": ""}, 2]}]}),
            &json!({"nums": [1, 2, 3]})
        )
        .unwrap(),
        json!([2, 4, 6])
    );
    assert_eq!(
        jlc::evaluate(
            &json!({"reduce": [{"var": "nums"}, {"+": [{"var": "accumulator"}, {"var": "current"}]}, 0]}),
            &json!({"nums": [1, 2, 3, 4]})
        )
        .unwrap(),
        json!(10)
    );
}

#[test]
fn test_substr_examples() {
    assert_eq!(jlc::evaluate(&json!({"substr": ["jsonlogic", -5]}), &json!({})).unwrap(), json!("logic"));
    assert_eq!(jlc::evaluate(&json!({"substr": ["jsonlogic", 0, -5]}), &json!({})).unwrap(), json!("json"));
}

#[test]
fn test_nested_business_rule() {
    let rule = json!({"if": [
        {"and": [
            {">=": [{"var": "order.total"}, 100]},
            {"in": [{"var": "customer.tier"}, ["gold", "platinum"]]}
        ]},
        {"cat": ["discount:", {"*": [{"var": "order.total"}, 0.5]}]},
        {"missing": ["order.total", "customer.tier"]}
    ]});
    let gold = json!({"order": {"total": 250}, "customer": {"tier": "gold"}});
    assert_eq!(jlc::evaluate(&rule, &gold).unwrap(), json!("discount:125"));
    let anonymous = json!({"order": {"total": 250}});
    assert_eq!(jlc::evaluate(&rule, &anonymous).unwrap(), json!(["customer.tier"]));
}

#[test]
fn test_filter_objects_by_field() {
    let rule = json!({"map": [
        {"filter": [{"var": "people"}, {">": [{"var": "age"}, 30]}]},
        {"var": "name"}
    ]});
    let data = json!({"people": [
        {"name": "Ana", "age": 31},
        {"name": "Bo", "age": 22},
        {"name": "Cy", "age": 45}
    ]});
    assert_eq!(jlc::evaluate(&rule, &data).unwrap(), json!(["Ana", "Cy"]));
}

#[test]
fn test_errors_abort_whole_evaluation() {
    let rule = json!({"cat": ["ok", {"/": [1, 0]}]});
    assert_eq!(
        jlc::evaluate(&rule, &json!({})).unwrap_err(),
        jlc::EvalError::DivisionByZero("/".into())
    );
    assert_eq!(
        jlc::evaluate(&json!({"and": [true, {"nope": 1}]}), &json!({})).unwrap_err(),
        jlc::EvalError::UnknownOperator("nope".into())
    );
}

#[test]
fn test_shared_evaluator_across_threads() {
    let ev = jlc::Evaluator::default();
    let rule = json!({"+": [{"var": "x"}, 1]});
    std::thread::scope(|s| {
        for i in 0..8 {
            let (ev, rule) = (&ev, &rule);
            s.spawn(move || {
                let out = ev.evaluate(rule, &json!({"x": i})).unwrap();
                assert_eq!(out, json!(i + 1));
            });
        }
    });
}
