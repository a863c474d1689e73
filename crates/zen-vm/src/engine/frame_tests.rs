use std::sync::Arc;

use zen_compiler::ast::Stmt;

use super::test_utils::program;
use super::{Frame, InvocationStack, LoadedClass, RuntimeError, Value};

/// `Main` with `pair(a, b) { var c = a; return c; }`.
fn pair_class() -> (Arc<LoadedClass>, usize) {
    let file = program(|b| {
        let a = b.name("a");
        let c = b.var("c", Some(a));
        let result = b.name("c");
        let pair = b.function("pair", &["a", "b"], vec![Stmt::Variable(c), Stmt::Return(Some(result))]);
        vec![zen_compiler::ast::Component::Function(pair)]
    });
    let class = LoadedClass::from_entity_file(&file).unwrap();
    let index = class.find_accepting("pair", 2).unwrap();
    (Arc::new(class), index)
}

#[test]
fn locals_start_with_arguments() {
    let (class, index) = pair_class();
    let frame = Frame::new(class, index, vec![Value::Int(1)]);

    assert_eq!(frame.function().name, "pair");
    assert!(frame.locals.len() >= 3);
    assert_eq!(frame.local(0).unwrap(), Value::Int(1));
    assert_eq!(frame.local(1).unwrap(), Value::Null);
    assert_eq!(frame.current_offset(), None);
}

#[test]
fn pc_counts_decoded_instructions() {
    let (class, index) = pair_class();
    let mut frame = Frame::new(class, index, vec![]);
    let offsets: Vec<usize> = frame.function().code.iter().map(|i| i.offset).collect();
    assert!(offsets.len() >= 2);

    frame.pc = 2;

    assert_eq!(frame.current_offset(), Some(offsets[1]));
    assert!(offsets.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn out_of_range_local() {
    let (class, index) = pair_class();
    let mut frame = Frame::new(class, index, vec![]);
    let count = frame.locals.len();

    assert!(matches!(
        frame.local(200),
        Err(RuntimeError::InvalidLocal { slot: 200, count: c }) if c == count
    ));
    assert!(frame.set_local(200, Value::Null).is_err());
    frame.set_local(2, Value::Long(9)).unwrap();
    assert_eq!(frame.local(2).unwrap(), Value::Long(9));
}

#[test]
fn operand_stack() {
    let (class, index) = pair_class();
    let mut frame = Frame::new(class, index, vec![]);
    frame.push(Value::Int(1));
    frame.push(Value::Int(2));
    frame.push(Value::Int(3));

    assert_eq!(frame.peek(0).unwrap(), &Value::Int(3));
    assert_eq!(frame.peek(2).unwrap(), &Value::Int(1));
    assert!(matches!(frame.peek(3), Err(RuntimeError::StackUnderflow)));
    assert_eq!(frame.pop_n(2).unwrap(), vec![Value::Int(2), Value::Int(3)]);
    assert!(matches!(frame.pop_n(2), Err(RuntimeError::StackUnderflow)));
    assert_eq!(frame.pop().unwrap(), Value::Int(1));
    assert!(matches!(frame.pop(), Err(RuntimeError::StackUnderflow)));
}

#[test]
fn frames_link_to_their_caller() {
    let (class, index) = pair_class();
    let mut frames = InvocationStack::new();
    assert!(frames.is_empty());

    frames.push(Frame::new(class.clone(), index, vec![Value::Int(1)]));
    frames.push(Frame::new(class.clone(), index, vec![Value::Int(2)]));
    frames.push(Frame::new(class, index, vec![Value::Int(3)]));

    let top = frames.current().unwrap();
    assert_eq!(top.previous, Some(1));
    let caller = frames.caller(top).unwrap();
    assert_eq!(caller.local(0).unwrap(), Value::Int(2));
    let root = frames.caller(caller).unwrap();
    assert_eq!(root.previous, None);
    assert!(frames.caller(root).is_none());

    frames.truncate(1);
    assert_eq!(frames.depth(), 1);
    frames.current_mut().unwrap().pc = 4;
    let last = frames.pop().unwrap();
    assert_eq!(last.pc, 4);
    assert!(frames.current().is_none());
}
