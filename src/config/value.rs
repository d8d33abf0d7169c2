//! Configuration node types
//!
//! Every node of the tree is a [`ConfigValue`]. Interior nodes are
//! `Table`s; every other variant is a leaf whose [`ValueKind`] is fixed by
//! the default tree.

use ndarray::{ArrayD, ArrayViewD, IxDyn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Interior node: named children in key order.
pub type ConfigTable = BTreeMap<String, ConfigValue>;

/// A single configuration node.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    /// Fixed-size numeric tuple, e.g. `TRAIN.SCALES = (600,)`
    Tuple(Vec<Number>),
    /// Numeric list, e.g. `ANCHOR_SCALES = [32, 64, 128, 256, 512]`
    List(Vec<Number>),
    /// Small fixed-shape numeric array, e.g. `PIXEL_MEANS`
    Array(NumArray),
    Table(ConfigTable),
}

/// Kind of a node. Overrides must match the kind of the value they replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Int,
    Bool,
    Str,
    Tuple,
    List,
    Array,
    Table,
    None,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Float => "float",
            ValueKind::Int => "int",
            ValueKind::Bool => "bool",
            ValueKind::Str => "str",
            ValueKind::Tuple => "tuple",
            ValueKind::List => "list",
            ValueKind::Array => "ndarray",
            ValueKind::Table => "table",
            ValueKind::None => "none",
        };
        write!(f, "{}", name)
    }
}

impl ValueKind {
    /// Kind of a value in an override document.
    ///
    /// Documents have a single sequence type, reported as `list`.
    pub fn of_document(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::None,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) if n.is_f64() => ValueKind::Float,
            Value::Number(_) => ValueKind::Int,
            Value::String(_) => ValueKind::Str,
            Value::Array(_) => ValueKind::List,
            Value::Object(_) => ValueKind::Table,
        }
    }
}

/// Element of a tuple or list leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(x) => x,
        }
    }

    /// Convert a document number, keeping integers as integers
    pub fn from_document(value: &Value) -> Option<Self> {
        let Value::Number(n) = value else {
            return None;
        };
        if n.is_f64() {
            n.as_f64().map(Number::Float)
        } else {
            n.as_i64().map(Number::Int)
        }
    }

    fn to_value(self) -> Value {
        match self {
            Number::Int(i) => Value::from(i),
            Number::Float(x) => float_value(x),
        }
    }
}

/// Element type of a [`NumArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Float64,
    Int64,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Float64 => write!(f, "float64"),
            ElementType::Int64 => write!(f, "int64"),
        }
    }
}

/// Fixed-shape numeric array; the element type is part of the leaf kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NumArray {
    Float64(ArrayD<f64>),
    Int64(ArrayD<i64>),
}

impl NumArray {
    /// Build an array of `dtype`, returning None if `data` does not fill
    /// `shape`. Values are truncated for `Int64`.
    pub fn new(shape: Vec<usize>, data: Vec<f64>, dtype: ElementType) -> Option<Self> {
        match dtype {
            ElementType::Float64 => ArrayD::from_shape_vec(IxDyn(&shape), data)
                .ok()
                .map(NumArray::Float64),
            ElementType::Int64 => {
                let data = data
                    .into_iter()
                    .map(|x| x.is_finite().then(|| x.trunc() as i64))
                    .collect::<Option<Vec<_>>>()?;
                ArrayD::from_shape_vec(IxDyn(&shape), data)
                    .ok()
                    .map(NumArray::Int64)
            }
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            NumArray::Float64(a) => a.shape(),
            NumArray::Int64(a) => a.shape(),
        }
    }

    /// Elements in row-major order, widened to f64
    pub fn values(&self) -> Vec<f64> {
        match self {
            NumArray::Float64(a) => a.iter().copied().collect(),
            NumArray::Int64(a) => a.iter().map(|&i| i as f64).collect(),
        }
    }

    pub fn dtype(&self) -> ElementType {
        match self {
            NumArray::Float64(_) => ElementType::Float64,
            NumArray::Int64(_) => ElementType::Int64,
        }
    }

    /// Coerce a document value into an array of `dtype`.
    ///
    /// Accepts a bare number (zero-dimensional array) or rectangular nested
    /// sequences of numbers. The shape follows the nesting of the input.
    pub fn from_document(value: &Value, dtype: ElementType) -> Option<Self> {
        let mut data = Vec::new();
        let shape = collect_rectangular(value, &mut data)?;
        Self::new(shape, data, dtype)
    }

    /// Nested-sequence document form
    pub fn to_value(&self) -> Value {
        match self {
            NumArray::Float64(a) => nest(a.view(), float_value),
            NumArray::Int64(a) => nest(a.view(), Value::from),
        }
    }
}

fn nest<A: Copy>(view: ArrayViewD<'_, A>, element: fn(A) -> Value) -> Value {
    if view.ndim() == 0 {
        return view.iter().next().map_or(Value::Null, |&x| element(x));
    }
    Value::Array(view.outer_iter().map(|sub| nest(sub, element)).collect())
}

fn collect_rectangular(value: &Value, data: &mut Vec<f64>) -> Option<Vec<usize>> {
    match value {
        Value::Number(n) => {
            data.push(n.as_f64()?);
            Some(Vec::new())
        }
        Value::Array(items) => {
            let mut inner: Option<Vec<usize>> = None;
            for item in items {
                let shape = collect_rectangular(item, data)?;
                match &inner {
                    Some(expected) if *expected != shape => return None,
                    Some(_) => {}
                    None => inner = Some(shape),
                }
            }
            let mut shape = vec![items.len()];
            shape.extend(inner.unwrap_or_default());
            Some(shape)
        }
        _ => None,
    }
}

fn float_value(x: f64) -> Value {
    serde_json::Number::from_f64(x)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

impl ConfigValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigValue::Float(_) => ValueKind::Float,
            ConfigValue::Int(_) => ValueKind::Int,
            ConfigValue::Bool(_) => ValueKind::Bool,
            ConfigValue::Text(_) => ValueKind::Str,
            ConfigValue::Tuple(_) => ValueKind::Tuple,
            ConfigValue::List(_) => ValueKind::List,
            ConfigValue::Array(_) => ValueKind::Array,
            ConfigValue::Table(_) => ValueKind::Table,
        }
    }

    pub fn as_table(&self) -> Option<&ConfigTable> {
        match self {
            ConfigValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut ConfigTable> {
        match self {
            ConfigValue::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Elements of a tuple or list leaf
    pub fn as_numbers(&self) -> Option<&[Number]> {
        match self {
            ConfigValue::Tuple(items) | ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert to the override-document form.
    ///
    /// Tuples and lists become sequences and arrays become nested sequences
    /// by shape, so merging the result back yields the same node.
    pub fn to_value(&self) -> Value {
        match self {
            ConfigValue::Float(x) => float_value(*x),
            ConfigValue::Int(i) => Value::from(*i),
            ConfigValue::Bool(b) => Value::Bool(*b),
            ConfigValue::Text(s) => Value::String(s.clone()),
            ConfigValue::Tuple(items) | ConfigValue::List(items) => {
                Value::Array(items.iter().map(|n| n.to_value()).collect())
            }
            ConfigValue::Array(array) => array.to_value(),
            ConfigValue::Table(table) => table_to_value(table),
        }
    }
}

/// Convert a whole table to the override-document form
pub fn table_to_value(table: &ConfigTable) -> Value {
    Value::Object(
        table
            .iter()
            .map(|(k, v)| (k.clone(), v.to_value()))
            .collect(),
    )
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Text(s) => write!(f, "{}", s),
            other => write!(f, "{}", other.to_value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_from_nested_sequence() {
        let value = json!([[[1, 2.5, 3]]]);
        let array = NumArray::from_document(&value, ElementType::Float64).unwrap();

        assert_eq!(array.shape(), &[1, 1, 3]);
        assert_eq!(array.values(), vec![1.0, 2.5, 3.0]);
        assert_eq!(array.dtype(), ElementType::Float64);
    }

    #[test]
    fn test_array_int_dtype_truncates() {
        let value = json!([1.9, -2.7]);
        let array = NumArray::from_document(&value, ElementType::Int64).unwrap();

        assert_eq!(array, NumArray::Int64(ArrayD::from_shape_vec(IxDyn(&[2]), vec![1, -2]).unwrap()));
        assert_eq!(array.to_value(), json!([1, -2]));
    }

    #[test]
    fn test_array_rejects_ragged_and_non_numeric() {
        assert!(NumArray::from_document(&json!([[1, 2], [3]]), ElementType::Float64).is_none());
        assert!(NumArray::from_document(&json!(["a", "b"]), ElementType::Float64).is_none());
        assert!(NumArray::from_document(&json!({"a": 1}), ElementType::Float64).is_none());
    }

    #[test]
    fn test_array_scalar_is_zero_dimensional() {
        let array = NumArray::from_document(&json!(4.0), ElementType::Float64).unwrap();
        assert!(array.shape().is_empty());
        assert_eq!(array.to_value(), json!(4.0));
    }

    #[test]
    fn test_array_round_trip_shape() {
        let array = NumArray::new(vec![1, 1, 3], vec![1.64, 1.52, 3.875], ElementType::Float64)
            .unwrap();
        let value = array.to_value();
        assert_eq!(value, json!([[[1.64, 1.52, 3.875]]]));
        assert_eq!(
            NumArray::from_document(&value, ElementType::Float64).unwrap(),
            array
        );
    }

    #[test]
    fn test_array_new_checks_length() {
        assert!(NumArray::new(vec![2, 2], vec![1.0, 2.0, 3.0], ElementType::Float64).is_none());
        assert!(NumArray::new(vec![3], vec![1.0, f64::NAN, 3.0], ElementType::Int64).is_none());
    }

    #[test]
    fn test_int_array_nests_by_axis() {
        let array = NumArray::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0], ElementType::Int64).unwrap();
        assert_eq!(array.shape(), &[2, 2]);
        assert_eq!(array.to_value(), json!([[1, 2], [3, 4]]));
    }

    #[test]
    fn test_document_kinds() {
        assert_eq!(ValueKind::of_document(&json!(1)), ValueKind::Int);
        assert_eq!(ValueKind::of_document(&json!(1.0)), ValueKind::Float);
        assert_eq!(ValueKind::of_document(&json!("x")), ValueKind::Str);
        assert_eq!(ValueKind::of_document(&json!([1])), ValueKind::List);
        assert_eq!(ValueKind::of_document(&json!(null)), ValueKind::None);
    }

    #[test]
    fn test_tuple_to_value_keeps_integers() {
        let value = ConfigValue::Tuple(vec![Number::Int(600)]);
        assert_eq!(value.to_value(), json!([600]));
        assert_eq!(value.kind().to_string(), "tuple");
    }
}
