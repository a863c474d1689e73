use zen_bytecode::ConstantPoolEntry;

use super::{ConstantPoolBuilder, EmitError};

#[test]
fn interning_twice_returns_the_same_index() {
    let mut pool = ConstantPoolBuilder::new();
    let a = pool.intern_utf8("main").unwrap();
    let b = pool.intern_utf8("main").unwrap();
    assert_eq!(a, b);
    assert_eq!(pool.count_entries(), 1);
}

#[test]
fn distinct_values_get_dense_increasing_indices() {
    let mut pool = ConstantPoolBuilder::new();
    let indices: Vec<u16> = ["a", "b", "c", "d"]
        .iter()
        .map(|s| pool.intern_utf8(s).unwrap())
        .collect();
    assert_eq!(indices, [1, 2, 3, 4]);
    assert_eq!(pool.count_entries(), 4);
}

#[test]
fn kinds_do_not_collide() {
    let mut pool = ConstantPoolBuilder::new();
    let int = pool.intern_integer(7).unwrap();
    let long = pool.intern_long(7).unwrap();
    let utf8 = pool.intern_utf8("7").unwrap();
    let string = pool.intern_string("7").unwrap();

    assert_eq!((int, long, utf8, string), (1, 2, 3, 4));
    assert_eq!(pool.get_entry(string), &ConstantPoolEntry::String { string_index: 3 });
}

#[test]
fn floats_deduplicate_by_bits() {
    let mut pool = ConstantPoolBuilder::new();
    let a = pool.intern_double(f64::NAN).unwrap();
    let b = pool.intern_double(f64::NAN).unwrap();
    let zero = pool.intern_double(0.0).unwrap();
    let negative_zero = pool.intern_double(-0.0).unwrap();
    assert_eq!(a, b);
    assert_ne!(zero, negative_zero);
}

#[test]
fn composite_entries_reuse_components() {
    let mut pool = ConstantPoolBuilder::new();
    let f = pool
        .intern_function("demo/Main", "run", "(zen/core/Object):v")
        .unwrap();
    let g = pool
        .intern_function("demo/Main", "run", "(zen/core/Object):v")
        .unwrap();
    let class = pool.intern_class("demo/Main").unwrap();

    assert_eq!(f, g);
    assert_eq!(class, 2);
    assert_eq!(
        pool.get_entry(f),
        &ConstantPoolEntry::Function {
            class_index: 2,
            descriptor_index: 3,
            name_index: 4,
        }
    );
    assert_eq!(pool.count_entries(), 5);
}

#[test]
fn overflow_is_an_error() {
    let mut pool = ConstantPoolBuilder::new();
    for value in 0..65535 {
        pool.intern_integer(value).unwrap();
    }
    assert_eq!(pool.intern_integer(-1), Err(EmitError::TooManyConstants));
    assert_eq!(pool.intern_integer(0), Ok(1));
}

#[test]
#[should_panic(expected = "constant pool index 0 out of range")]
fn reserved_index_panics() {
    ConstantPoolBuilder::new().get_entry(0);
}

#[test]
fn into_pool_keeps_order() {
    let mut pool = ConstantPoolBuilder::new();
    pool.intern_utf8("x").unwrap();
    pool.intern_integer(40000).unwrap();
    let pool = pool.into_pool();
    assert_eq!(pool.utf8(1), Some("x"));
    assert_eq!(pool.get(2), Some(&ConstantPoolEntry::Integer(40000)));
}
