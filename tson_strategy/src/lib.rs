use bytes::Bytes;
use proptest::prelude::*;
use tson::{shape::Shape, Tson};

/// arbitrary Bytes for use with proptest
pub fn arb_bs() -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..32).prop_map(Bytes::from)
}

/// arbitrary non-NaN f32, so that values compare equal to themselves
pub fn arb_f32() -> impl Strategy<Value = f32> {
    use prop::num::f32::*;
    POSITIVE | NEGATIVE | NORMAL | SUBNORMAL | ZERO | INFINITE
}

/// arbitrary non-NaN f64
pub fn arb_f64() -> impl Strategy<Value = f64> {
    use prop::num::f64::*;
    POSITIVE | NEGATIVE | NORMAL | SUBNORMAL | ZERO | INFINITE
}

/// arbitrary scalar or string shape
pub fn arb_leaf_shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        Just(Shape::Bool),
        Just(Shape::Isize),
        Just(Shape::I8),
        Just(Shape::I16),
        Just(Shape::I32),
        Just(Shape::I64),
        Just(Shape::Usize),
        Just(Shape::U8),
        Just(Shape::U16),
        Just(Shape::U32),
        Just(Shape::U64),
        Just(Shape::F32),
        Just(Shape::F64),
        Just(Shape::Str),
    ]
}

/// arbitrary record-free shape for use with proptest
pub fn arb_shape() -> impl Strategy<Value = Shape> {
    arb_leaf_shape().prop_recursive(
        4,  // max depth
        16, // max nodes
        2,  // max items per collection
        |inner| {
            prop_oneof![
                inner.clone().prop_map(Shape::array),
                inner.clone().prop_map(Shape::seq),
                (inner.clone(), inner).prop_map(|(k, v)| Shape::map(k, v)),
            ]
        },
    )
}

/// arbitrary value of `shape`; records get no fields
pub fn arb_value(shape: &Shape) -> BoxedStrategy<Tson> {
    match shape {
        Shape::Bool => any::<bool>().prop_map(Tson::Bool).boxed(),
        Shape::Isize => any::<isize>().prop_map(Tson::Isize).boxed(),
        Shape::I8 => any::<i8>().prop_map(Tson::I8).boxed(),
        Shape::I16 => any::<i16>().prop_map(Tson::I16).boxed(),
        Shape::I32 => any::<i32>().prop_map(Tson::I32).boxed(),
        Shape::I64 => any::<i64>().prop_map(Tson::I64).boxed(),
        Shape::Usize => any::<usize>().prop_map(Tson::Usize).boxed(),
        Shape::U8 => any::<u8>().prop_map(Tson::U8).boxed(),
        Shape::U16 => any::<u16>().prop_map(Tson::U16).boxed(),
        Shape::U32 => any::<u32>().prop_map(Tson::U32).boxed(),
        Shape::U64 => any::<u64>().prop_map(Tson::U64).boxed(),
        Shape::F32 => arb_f32().prop_map(Tson::F32).boxed(),
        Shape::F64 => arb_f64().prop_map(Tson::F64).boxed(),
        Shape::Str => arb_bs().prop_map(Tson::Str).boxed(),
        Shape::Array(elem) => {
            let shape = (**elem).clone();
            prop::collection::vec(arb_value(elem), 0..4)
                .prop_map(move |items| Tson::Array(shape.clone(), items))
                .boxed()
        }
        Shape::Seq(elem) => {
            let shape = (**elem).clone();
            prop::collection::vec(arb_value(elem), 0..4)
                .prop_map(move |items| Tson::Seq(shape.clone(), items))
                .boxed()
        }
        Shape::Map(key, val) => {
            let (k, v) = ((**key).clone(), (**val).clone());
            prop::collection::vec((arb_value(key), arb_value(val)), 0..4)
                .prop_map(move |pairs| Tson::Map(k.clone(), v.clone(), pairs))
                .boxed()
        }
        Shape::Record(name) => Just(Tson::Record(tson::Record::new(name.as_str()))).boxed(),
    }
}

/// arbitrary TSON for use with proptest
pub fn arb_tson() -> impl Strategy<Value = Tson> {
    arb_shape().prop_flat_map(|shape| arb_value(&shape))
}
