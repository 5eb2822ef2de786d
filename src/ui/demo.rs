//! Canned debuggee states for the terminal host
//!
//! Each scenario is a sequence of [`Step`]s, one suspended state per step,
//! which the host walks forward and backward like a debugger stepping
//! through a program.

use crate::introspect::{
    FrameInfo, ObjectId, ObjectState, ScriptedProcess, Value, Variable, NO_RETURN_VALUE,
};

pub const SCENARIOS: &[&str] = &["linked-list", "threads", "idle"];

pub const DEFAULT_SCENARIO: &str = "linked-list";

/// One suspended state of the scripted program
#[derive(Debug, Clone)]
pub struct Step {
    pub description: String,
    pub process: ScriptedProcess,
}

/// Steps of the named scenario, or `None` if there is no such scenario
pub fn scenario(name: &str) -> Option<Vec<Step>> {
    match name {
        "linked-list" => Some(linked_list()),
        "threads" => Some(threads()),
        "idle" => Some(vec![Step {
            description: "Program not started".to_string(),
            process: ScriptedProcess::new(),
        }]),
        _ => None,
    }
}

const ARGS: ObjectId = 10;
const LIST: ObjectId = 20;
const FIRST_NODE: ObjectId = 31;

/// Placeholder return slot the debugger reports before anything returned
fn nothing_returned() -> Variable {
    Variable::new(NO_RETURN_VALUE, "void", Value::Null)
}

fn snapshot(description: &str, frames: Vec<(FrameInfo, Vec<Variable>)>, objects: &[(ObjectId, ObjectState)]) -> Step {
    let (mut process, thread) = ScriptedProcess::with_main_thread();
    for (info, variables) in frames {
        process.push_frame(thread, info, variables);
    }
    for (id, state) in objects {
        process.put_object(*id, state.clone());
    }
    Step {
        description: description.to_string(),
        process,
    }
}

fn main_frame(line: i32) -> FrameInfo {
    FrameInfo::method("demo.Main", "main", &["java.lang.String[]"], line)
}

fn list_state(head: Option<ObjectId>, size: usize) -> ObjectState {
    let head = match head {
        Some(id) => Variable::object("head", "demo.Node", id),
        None => Variable::null("head", "demo.Node"),
    };
    ObjectState::new(
        "demo.LinkedList",
        vec![head, Variable::primitive("size", "int", &size.to_string())],
    )
}

fn node_state(value: i32, next: Option<ObjectId>) -> ObjectState {
    let next = match next {
        Some(id) => Variable::object("next", "demo.Node", id),
        None => Variable::null("next", "demo.Node"),
    };
    ObjectState::new(
        "demo.Node",
        vec![Variable::primitive("value", "int", &value.to_string()), next],
    )
}

/// `main` builds a three element list by prepending to its head
fn linked_list() -> Vec<Step> {
    let mut steps = Vec::new();
    let mut objects = vec![(ARGS, ObjectState::array("java.lang.String[]", Vec::new()))];
    let args = || Variable::object("args", "java.lang.String[]", ARGS);
    let list = || Variable::object("list", "demo.LinkedList", LIST);

    steps.push(snapshot(
        "main() started",
        vec![(main_frame(5), vec![nothing_returned(), args()])],
        &objects,
    ));

    objects.push((LIST, list_state(None, 0)));
    steps.push(snapshot(
        "list = new LinkedList()",
        vec![(main_frame(6), vec![nothing_returned(), args(), list()])],
        &objects,
    ));

    let mut head = None;
    for (index, value) in (1..=3).enumerate() {
        let line = 7 + index as i32;
        let caller = (main_frame(line), vec![args(), list()]);
        let add = |line: i32, node: Option<ObjectId>| {
            let mut variables = vec![
                nothing_returned(),
                Variable::object("this", "demo.LinkedList", LIST),
                Variable::primitive("value", "int", &value.to_string()),
            ];
            if let Some(id) = node {
                variables.push(Variable::object("node", "demo.Node", id));
            }
            (FrameInfo::method("demo.LinkedList", "add", &["int"], line), variables)
        };

        steps.push(snapshot(
            &format!("list.add({})", value),
            vec![caller.clone(), add(12, None)],
            &objects,
        ));

        let node = FIRST_NODE + index as ObjectId;
        objects.push((node, node_state(value, head)));
        steps.push(snapshot(
            &format!("node = new Node({})", value),
            vec![caller.clone(), add(13, Some(node))],
            &objects,
        ));

        head = Some(node);
        objects[1] = (LIST, list_state(head, index + 1));
        steps.push(snapshot("head = node", vec![caller, add(14, Some(node))], &objects));

        steps.push(snapshot(
            "add() returned",
            vec![(
                main_frame(line + 1),
                vec![
                    Variable::primitive("add() returned", "boolean", "true"),
                    args(),
                    list(),
                ],
            )],
            &objects,
        ));
    }
    steps
}

/// Two debug targets, several threads: only the first of each is drawn
fn threads() -> Vec<Step> {
    let mut process = ScriptedProcess::new();
    let target = process.add_target("Server");
    process.add_target("Client");
    process.add_thread(target, "Reference Handler", true);
    let main = process.add_thread(target, "main", false);
    let worker = process.add_thread(target, "worker-1", false);
    process.add_thread(target, "worker-2", false);

    process.push_frame(
        main,
        main_frame(21),
        vec![nothing_returned(), Variable::object("queue", "demo.LinkedList", LIST)],
    );
    process.push_frame(
        worker,
        FrameInfo::method("demo.Worker", "run", &[], 40),
        vec![nothing_returned(), Variable::primitive("jobs", "int", "3")],
    );
    process.put_object(LIST, list_state(None, 0));

    vec![Step {
        description: "Suspended on all threads".to_string(),
        process,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::Introspector;

    #[test]
    fn test_every_scenario_exists() {
        for name in SCENARIOS {
            let steps = scenario(name).unwrap();
            assert!(!steps.is_empty(), "{}", name);
        }
        assert!(scenario("nope").is_none());
    }

    #[test]
    fn test_linked_list_ends_with_three_nodes() {
        let steps = scenario(DEFAULT_SCENARIO).unwrap();
        let last = &steps.last().unwrap().process;
        let list = last.object(LIST).unwrap();
        assert_eq!(list.fields[1].value, Value::Primitive("3".into()));
        // Prepending: the newest node is the head
        assert_eq!(list.fields[0].value.object_id(), Some(FIRST_NODE + 2));
        let tail = last.object(FIRST_NODE).unwrap();
        assert_eq!(tail.fields[1].value, Value::Null);
    }

    #[test]
    fn test_add_frames_are_innermost_while_adding() {
        let steps = scenario(DEFAULT_SCENARIO).unwrap();
        let step = &steps[2];
        assert_eq!(step.description, "list.add(1)");
        let target = &step.process.targets().unwrap()[0];
        let thread = &step.process.threads(target).unwrap()[0];
        let frames = step.process.frames(thread).unwrap();
        assert_eq!(frames[0].method.as_deref(), Some("add"));
        assert_eq!(frames[1].method.as_deref(), Some("main"));
    }
}
