#![no_main]

//! Renders agent sessions built from arbitrary activity payloads in every
//! output mode. Catches panics from slicing multi-byte text and from
//! activity shapes the decoder does not expect.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::{json, Map, Value};

use linctl::agent::{render, resolve};
use linctl::models::Issue;
use linctl::output::OutputMode;

#[derive(Arbitrary, Debug)]
struct Activity {
    kind: u8,
    body: String,
    parameter: Option<String>,
    extra_key: Option<String>,
}

#[derive(Arbitrary, Debug)]
struct RenderInput {
    title: String,
    status: String,
    delegate: Option<String>,
    activities: Vec<Activity>,
    has_next_page: bool,
}

fn content(activity: &Activity) -> Value {
    let mut map = Map::new();
    let kind = match activity.kind % 7 {
        0 => "thought",
        1 => "response",
        2 => "elicitation",
        3 => "error",
        4 => "action",
        5 => "prompt",
        _ => "",
    };
    if !kind.is_empty() {
        map.insert("type".into(), json!(kind));
    }
    if kind == "action" {
        map.insert("action".into(), json!(activity.body));
        if let Some(parameter) = &activity.parameter {
            map.insert("parameter".into(), json!(parameter));
        }
    } else {
        map.insert("body".into(), json!(activity.body));
    }
    if let Some(key) = &activity.extra_key {
        map.insert(key.clone(), json!(true));
    }
    Value::Object(map)
}

fuzz_target!(|input: RenderInput| {
    let activities: Vec<Value> = input
        .activities
        .iter()
        .take(32)
        .enumerate()
        .map(|(i, a)| {
            json!({
                "id": format!("a{}", i),
                "createdAt": "2025-01-01T12:00:00Z",
                "content": content(a),
            })
        })
        .collect();

    let issue = json!({
        "id": "uuid",
        "identifier": "ENG-1",
        "title": input.title,
        "delegate": input.delegate.as_ref().map(|d| json!({"id": "u", "displayName": d})),
        "comments": {"nodes": [{
            "id": "c1",
            "agentSession": {
                "id": "s1",
                "status": input.status,
                "activities": {
                    "nodes": activities,
                    "pageInfo": {"hasNextPage": input.has_next_page}
                }
            }
        }]}
    });

    let issue: Issue = match serde_json::from_value(issue) {
        Ok(issue) => issue,
        Err(_) => return,
    };

    for mode in [OutputMode::Rich, OutputMode::Plain, OutputMode::Json] {
        let mut out = Vec::new();
        render(&mut out, &issue, resolve(&issue), mode).expect("writing to a Vec cannot fail");
        if mode == OutputMode::Json {
            serde_json::from_slice::<Value>(&out).expect("JSON mode must emit valid JSON");
        }
    }
});
