use std::sync::Arc;
use tson::{encoding::constants::*, prelude::*};

#[derive(TsonRep, Clone, Debug, PartialEq)]
struct Foo {
    bar: i32,
}

#[derive(TsonRep, Clone, Debug, PartialEq)]
struct Other {
    baz: u8,
}

#[test]
fn registration_errors() {
    let mut registry = Registry::new();
    registry.register::<Foo>(50).unwrap();

    assert_eq!(
        registry.register::<Other>(50),
        Err(Error::DuplicateTypeId {
            id: 50,
            existing: "Foo".to_string(),
            name: "Other".to_string(),
        })
    );
    assert_eq!(
        registry.register::<Foo>(51),
        Err(Error::AlreadyRegistered {
            name: "Foo".to_string(),
            existing: 50,
            id: 51,
        })
    );
    assert_eq!(registry.register::<Other>(3), Err(Error::ReservedTypeId(3)));
}

#[test]
fn encoding_an_unregistered_type() {
    let registry = Registry::new();
    assert_eq!(
        encode(&vec![Foo { bar: 1 }], &registry),
        Err(Error::UnregisteredType("Foo".to_string()))
    );
    // even when empty, the element type must resolve
    assert_eq!(
        encode(&Vec::<Foo>::new(), &registry),
        Err(Error::UnregisteredType("Foo".to_string()))
    );
}

#[test]
fn decoding_an_unknown_id() {
    let mut registry = Registry::new();
    registry.register::<Foo>(50).unwrap();
    let enc = encode(&vec![Foo { bar: 1 }], &registry).unwrap();

    assert_eq!(
        decode_full(&enc, &Registry::new()),
        Err(Error::UnknownTypeId(50))
    );
}

#[test]
fn every_truncation_is_reported() {
    let mut registry = Registry::new();
    registry.register::<Foo>(50).unwrap();
    let value = vec![Foo { bar: 1 }, Foo { bar: 2 }];
    let enc = encode(&value, &registry).unwrap();

    for cut in 1..enc.len() {
        match decode_full(&enc[..cut], &registry) {
            Err(Error::TruncatedInput { .. }) => {}
            other => panic!("cut at {} gave {:?}", cut, other),
        }
    }
}

#[test]
fn malformed_tag_lists() {
    let registry = Registry::new();

    // sequence whose tag list names the inline tag
    let enc = [16, 0, 0, 0, 1, 0, 0, 0];
    assert!(matches!(
        decode_full(&enc, &registry),
        Err(Error::InvalidShape(_))
    ));

    // sequence whose tag list describes two shapes
    let enc = [16, 0, 0, 0, 2, 0, 8, 0, 8, 0];
    assert!(matches!(
        decode_full(&enc, &registry),
        Err(Error::InvalidShape(_))
    ));
}

#[test]
fn hostile_nesting_is_bounded() {
    let registry = Registry::new();
    let depth = 1000u16;

    let mut enc = vec![16, 0, 1, 0];
    enc.extend_from_slice(&depth.to_le_bytes());
    for _ in 0..depth - 1 {
        enc.extend_from_slice(&[16, 0]);
    }
    enc.extend_from_slice(&[8, 0]);

    assert_eq!(
        decode_full(&enc, &registry),
        Err(Error::DepthExceeded(Config::default().max_depth))
    );

    let lenient = Config { max_depth: 2000 };
    assert!(matches!(
        decode_with_config(&enc, &registry, lenient),
        Err(Error::TruncatedInput { .. })
    ));
}

fn map_tree(depth: usize, out: &mut Vec<TypeId>) {
    if depth == 0 {
        out.push(TAG_U8);
    } else {
        out.push(TAG_MAP);
        map_tree(depth - 1, out);
        map_tree(depth - 1, out);
    }
}

fn shares_children(a: &Shape, b: &Shape) -> bool {
    match (a, b) {
        (Shape::Map(ak, av), Shape::Map(bk, bv)) => Arc::ptr_eq(ak, bk) && Arc::ptr_eq(av, bv),
        _ => false,
    }
}

#[test]
fn wide_shapes_are_shared_between_elements() {
    let registry = Registry::new();
    let count = 20_000u16;

    let mut tags = Vec::new();
    map_tree(12, &mut tags);
    assert_eq!(tags.len(), 8191);

    let mut enc = vec![16, 0];
    enc.extend_from_slice(&count.to_le_bytes());
    enc.extend_from_slice(&(tags.len() as u16).to_le_bytes());
    for tag in &tags {
        enc.extend_from_slice(&tag.to_le_bytes());
    }
    for _ in 0..count {
        // an empty map per element
        enc.extend_from_slice(&[0, 0]);
    }

    let ks = decode_full(&enc, &registry).unwrap().unwrap();
    let (key, val, items) = match &ks {
        Tson::Seq(Shape::Map(key, val), items) => (key, val, items),
        other => panic!("unexpected value {}", other.shape()),
    };
    assert_eq!(items.len(), count as usize);

    for item in items {
        match item {
            Tson::Map(k, v, pairs) => {
                assert!(pairs.is_empty());
                assert!(shares_children(k, key));
                assert!(shares_children(v, val));
            }
            other => panic!("unexpected element {}", other.shape()),
        }
    }

    assert_eq!(encode_full(&ks, &registry).unwrap().as_ref(), enc.as_slice());
}

#[test]
fn errors_display() {
    assert_eq!(
        Error::UnknownTypeId(99).to_string(),
        "unknown type id 99"
    );
    assert_eq!(
        Error::UnregisteredType("Foo".to_string()).to_string(),
        "type `Foo` is not registered"
    );
}
