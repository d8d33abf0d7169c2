//! Dotted-path overrides (command-line layer)
//!
//! Takes a flat `[KEY, VALUE, KEY, VALUE, ...]` list such as
//! `["TRAIN.LEARNING_RATE", "0.01", "RESNET.FIXED_BLOCKS", "2"]`.
//! Values are parsed as literals and must match the leaf kind exactly;
//! unlike document merges there is no array coercion.

use rcnn_literal::{parse_literal, Literal};
use tracing::debug;

use super::error::ConfigError;
use super::merge::join_key;
use super::value::{ConfigTable, ConfigValue, Number, ValueKind};

/// An override value after literal parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOverride {
    Literal(Literal),
    /// The value was not a literal and is used verbatim
    PlainText(String),
}

impl ParsedOverride {
    pub fn parse(raw: &str) -> Self {
        match parse_literal(raw) {
            Ok(literal) => ParsedOverride::Literal(literal),
            Err(e) => {
                debug!(value = raw, reason = %e, "Override value is not a literal, using plain text");
                ParsedOverride::PlainText(raw.to_string())
            }
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ParsedOverride::PlainText(_) => ValueKind::Str,
            ParsedOverride::Literal(literal) => match literal {
                Literal::None => ValueKind::None,
                Literal::Bool(_) => ValueKind::Bool,
                Literal::Int(_) => ValueKind::Int,
                Literal::Float(_) => ValueKind::Float,
                Literal::Str(_) => ValueKind::Str,
                Literal::Tuple(_) => ValueKind::Tuple,
                Literal::List(_) => ValueKind::List,
            },
        }
    }
}

/// Apply dotted-path overrides in order.
///
/// Fails with `MalformedArguments` before touching `root` if the list has
/// odd length. Later failures may leave earlier pairs applied; use
/// [`ConfigTree::set_by_dotted_path`](super::ConfigTree::set_by_dotted_path)
/// for an all-or-nothing update.
pub fn set_by_dotted_path<S: AsRef<str>>(pairs: &[S], root: &mut ConfigTable) -> Result<(), ConfigError> {
    if pairs.len() % 2 != 0 {
        return Err(ConfigError::MalformedArguments { len: pairs.len() });
    }

    for pair in pairs.chunks_exact(2) {
        let (path, raw) = (pair[0].as_ref(), pair[1].as_ref());
        let slot = lookup_mut(root, path)?;
        let replacement = replacement_leaf(path, slot, ParsedOverride::parse(raw))?;
        *slot = replacement;
        debug!(key = path, value = %slot, "Applied command-line override");
    }

    Ok(())
}

/// Walk `path` segment by segment; every segment must exist.
fn lookup_mut<'a>(root: &'a mut ConfigTable, path: &str) -> Result<&'a mut ConfigValue, ConfigError> {
    let mut segments = path.split('.');
    let mut walked = String::new();
    let mut table = root;

    loop {
        let segment = segments.next().unwrap_or_default();
        walked = join_key(&walked, segment);
        let node = table
            .get_mut(segment)
            .ok_or_else(|| ConfigError::unknown_key(&walked))?;

        if segments.clone().next().is_none() {
            return Ok(node);
        }
        table = node
            .as_table_mut()
            .ok_or_else(|| ConfigError::unknown_key(path))?;
    }
}

fn replacement_leaf(
    key: &str,
    current: &ConfigValue,
    parsed: ParsedOverride,
) -> Result<ConfigValue, ConfigError> {
    let found = parsed.kind();
    let fell_back = matches!(parsed, ParsedOverride::PlainText(_));

    let replacement = match (current, parsed) {
        (ConfigValue::Float(_), ParsedOverride::Literal(Literal::Float(x))) => Some(ConfigValue::Float(x)),
        (ConfigValue::Int(_), ParsedOverride::Literal(Literal::Int(i))) => Some(ConfigValue::Int(i)),
        (ConfigValue::Bool(_), ParsedOverride::Literal(Literal::Bool(b))) => Some(ConfigValue::Bool(b)),
        (ConfigValue::Text(_), ParsedOverride::Literal(Literal::Str(s)))
        | (ConfigValue::Text(_), ParsedOverride::PlainText(s)) => Some(ConfigValue::Text(s)),
        (ConfigValue::Tuple(_), ParsedOverride::Literal(Literal::Tuple(items))) => {
            return numbers(key, found, &items).map(ConfigValue::Tuple);
        }
        (ConfigValue::List(_), ParsedOverride::Literal(Literal::List(items))) => {
            return numbers(key, found, &items).map(ConfigValue::List);
        }
        _ => None,
    };

    replacement.ok_or_else(|| {
        let err = ConfigError::type_mismatch(key, current.kind(), found);
        if fell_back {
            err.with_detail("value is not a literal and was kept as plain text")
        } else {
            err
        }
    })
}

fn numbers(key: &str, kind: ValueKind, items: &[Literal]) -> Result<Vec<Number>, ConfigError> {
    items
        .iter()
        .map(|item| match item {
            Literal::Int(i) => Ok(Number::Int(*i)),
            Literal::Float(x) => Ok(Number::Float(*x)),
            other => Err(ConfigError::type_mismatch(key, kind, kind)
                .with_detail(format!("element {} is a {}, not a number", other, other.type_name()))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::default_table;
    use std::path::Path;

    fn base() -> ConfigTable {
        default_table(Path::new("/srv/rcnn"))
    }

    fn get<'a>(table: &'a ConfigTable, path: &str) -> &'a ConfigValue {
        let (section, key) = path.split_once('.').unwrap();
        &table[section].as_table().unwrap()[key]
    }

    #[test]
    fn test_set_int_and_float() {
        let mut table = base();
        set_by_dotted_path(
            &["TRAIN.LEARNING_RATE", "0.01", "RESNET.FIXED_BLOCKS", "2"],
            &mut table,
        )
        .unwrap();

        assert_eq!(get(&table, "TRAIN.LEARNING_RATE"), &ConfigValue::Float(0.01));
        assert_eq!(get(&table, "RESNET.FIXED_BLOCKS"), &ConfigValue::Int(2));
    }

    #[test]
    fn test_set_single_element_tuple() {
        let mut table = base();
        set_by_dotted_path(&["TRAIN.SCALES", "(300,)"], &mut table).unwrap();
        assert_eq!(
            get(&table, "TRAIN.SCALES"),
            &ConfigValue::Tuple(vec![Number::Int(300)])
        );
    }

    #[test]
    fn test_plain_text_fallback() {
        let mut table = base();
        set_by_dotted_path(&["POOLING_MODE", "crop", "EXP_DIR", "'vgg16'"], &mut table).unwrap();
        assert_eq!(table["POOLING_MODE"], ConfigValue::Text("crop".to_string()));
        assert_eq!(table["EXP_DIR"], ConfigValue::Text("vgg16".to_string()));
    }

    #[test]
    fn test_odd_length_is_malformed() {
        let mut table = base();
        let before = table.clone();
        let err = set_by_dotted_path(&["TRAIN.GAMMA", "0.2", "RNG_SEED"], &mut table).unwrap_err();

        assert!(matches!(err, ConfigError::MalformedArguments { len: 3 }));
        assert_eq!(table, before);
    }

    #[test]
    fn test_unknown_segments() {
        let mut table = base();

        let err = set_by_dotted_path(&["TRAINING.GAMMA", "0.2"], &mut table).unwrap_err();
        assert_eq!(err.to_string(), "TRAINING is not a valid config key");

        let err = set_by_dotted_path(&["TRAIN.GAMA", "0.2"], &mut table).unwrap_err();
        assert_eq!(err.to_string(), "TRAIN.GAMA is not a valid config key");

        let err = set_by_dotted_path(&["EPS.X", "0.2"], &mut table).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey { .. }));
    }

    #[test]
    fn test_float_leaf_rejects_text() {
        let mut table = base();
        let err = set_by_dotted_path(&["TRAIN.LEARNING_RATE", "fast"], &mut table).unwrap_err();

        match &err {
            ConfigError::TypeMismatch {
                expected,
                found,
                detail,
                ..
            } => {
                assert_eq!(*expected, ValueKind::Float);
                assert_eq!(*found, ValueKind::Str);
                assert!(detail.is_some());
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(get(&table, "TRAIN.LEARNING_RATE"), &ConfigValue::Float(0.001));
    }

    #[test]
    fn test_exact_kind_required() {
        let mut table = base();

        // int literal for a float leaf
        assert!(set_by_dotted_path(&["TRAIN.GAMMA", "1"], &mut table).is_err());
        // list literal for a tuple leaf
        assert!(set_by_dotted_path(&["TRAIN.SCALES", "[300]"], &mut table).is_err());
        // no array coercion on the command line
        assert!(set_by_dotted_path(&["PIXEL_MEANS", "[1.0, 2.0, 3.0]"], &mut table).is_err());
        // lowercase booleans are not literals
        assert!(set_by_dotted_path(&["USE_GPU_NMS", "false"], &mut table).is_err());
        // whole sub-tables cannot be replaced
        assert!(set_by_dotted_path(&["RESNET", "1"], &mut table).is_err());

        set_by_dotted_path(&["USE_GPU_NMS", "False"], &mut table).unwrap();
        assert_eq!(table["USE_GPU_NMS"], ConfigValue::Bool(false));
    }

    #[test]
    fn test_list_elements_must_be_numbers() {
        let mut table = base();
        let err = set_by_dotted_path(&["ANCHOR_SCALES", "[32, 'x']"], &mut table).unwrap_err();
        assert!(err.to_string().contains("not a number"));

        set_by_dotted_path(&["ANCHOR_SCALES", "[64, 128]"], &mut table).unwrap();
        assert_eq!(
            table["ANCHOR_SCALES"],
            ConfigValue::List(vec![Number::Int(64), Number::Int(128)])
        );
    }

    #[test]
    fn test_parsed_override_kinds() {
        assert_eq!(ParsedOverride::parse("(1, 2)").kind(), ValueKind::Tuple);
        assert_eq!(ParsedOverride::parse("/data/coco").kind(), ValueKind::Str);
        assert_eq!(ParsedOverride::parse("None").kind(), ValueKind::None);
    }
}
