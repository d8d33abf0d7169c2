//! Built-in defaults
//!
//! Hardcoded defaults for every recognized key. The key set and the kind of
//! every leaf defined here is the schema that overrides are checked against.

use ndarray::arr3;
use std::path::Path;

use super::value::ConfigValue::{Bool, Float, Int, Text};
use super::value::{ConfigTable, ConfigValue, NumArray, Number};

/// Build the default tree rooted at `root_dir`.
///
/// `ROOT_DIR` is `root_dir` itself and `DATA_DIR` is `<root_dir>/data`.
pub fn default_table(root_dir: &Path) -> ConfigTable {
    let data_dir = root_dir.join("data");

    table(vec![
        ("TRAIN", ConfigValue::Table(train_defaults())),
        ("TEST", ConfigValue::Table(test_defaults())),
        ("RESNET", ConfigValue::Table(resnet_defaults())),
        // Scale factor for identifying boxes that collapse onto the same
        // feature-map cell. 1/16 is correct for VGG16-style strides.
        ("DEDUP_BOXES", Float(1.0 / 16.0)),
        // BGR order, shape (1, 1, 3)
        ("PIXEL_MEANS", mean_vector([102.9801, 115.9465, 122.7717])),
        // ROI size of the keypoint branch
        ("KPTS_GRID", Int(28)),
        ("DIM_MEANS", mean_vector([1.64, 1.52, 3.875])),
        ("RNG_SEED", Int(3)),
        ("EPS", Float(1e-14)),
        ("ROOT_DIR", Text(root_dir.to_string_lossy().into_owned())),
        ("DATA_DIR", Text(data_dir.to_string_lossy().into_owned())),
        // Name of (or path to) the matlab executable
        ("MATLAB", Text("matlab".to_string())),
        // Outputs are placed under this experiment directory
        ("EXP_DIR", Text("res101".to_string())),
        ("USE_GPU_NMS", Bool(true)),
        ("GPU_ID", Int(0)),
        ("POOLING_MODE", Text("align".to_string())),
        // Size of the pooled region after RoI pooling
        ("POOLING_SIZE", Int(7)),
        ("MAX_NUM_GT_BOXES", Int(30)),
        ("ANCHOR_SCALES", int_list(&[32, 64, 128, 256, 512])),
        (
            "ANCHOR_RATIOS",
            ConfigValue::List(vec![Number::Float(0.5), Number::Int(1), Number::Int(2)]),
        ),
        ("FEAT_STRIDE", int_list(&[16])),
        ("FPN_FEAT_STRIDE", Int(32)),
        ("FPN_ANCHOR_STRIDE", Int(1)),
    ])
}

fn train_defaults() -> ConfigTable {
    table(vec![
        ("LEARNING_RATE", Float(0.001)),
        ("MOMENTUM", Float(0.9)),
        ("WEIGHT_DECAY", Float(0.0001)),
        // Factor for reducing the learning rate
        ("GAMMA", Float(0.1)),
        // Weight individual losses by learned uncertainty
        ("MULTI_TASK_LOSS", Bool(true)),
        ("USE_FLIPPED", Bool(true)),
        ("DOUBLE_BIAS", Bool(false)),
        ("TRUNCATED", Bool(false)),
        ("BIAS_DECAY", Bool(false)),
        // Pixel size of an image's shortest side
        ("SCALES", int_tuple(&[600])),
        // Max pixel size of the longest side of a scaled input image
        ("MAX_SIZE", Int(2484)),
        // Minibatch size (number of ROIs)
        ("BATCH_SIZE", Int(512)),
        ("FG_FRACTION", Float(0.25)),
        ("FG_THRESH", Float(0.5)),
        // Background if overlap in [LO, HI)
        ("BG_THRESH_HI", Float(0.5)),
        ("BG_THRESH_LO", Float(0.0)),
        ("BBOX_NORMALIZE_TARGETS", Bool(true)),
        ("BBOX_INSIDE_WEIGHTS", float_tuple(&[1.0, 1.0, 1.0, 1.0])),
        // Requires BBOX_NORMALIZE_TARGETS
        ("BBOX_NORMALIZE_TARGETS_PRECOMPUTED", Bool(true)),
        ("BBOX_NORMALIZE_MEANS", float_tuple(&[0.0, 0.0, 0.0, 0.0])),
        ("BBOX_NORMALIZE_STDS", float_tuple(&[0.1, 0.1, 0.2, 0.2])),
        ("DIM_NORMALIZE_TARGETS_PRECOMPUTED", Bool(true)),
        ("DIM_NORMALIZE_MEANS", float_tuple(&[1.6, 1.5, 4.0, 0.0, 0.0])),
        ("DIM_NORMALIZE_STDS", float_tuple(&[0.5, 0.5, 0.5, 0.5, 0.5])),
        // IOU >= thresh: positive example
        ("RPN_POSITIVE_OVERLAP", Float(0.7)),
        // IOU < thresh: negative example
        ("RPN_NEGATIVE_OVERLAP", Float(0.3)),
        // Anchors that are both positive and negative become negative
        ("RPN_CLOBBER_POSITIVES", Bool(false)),
        ("RPN_FG_FRACTION", Float(0.5)),
        ("RPN_BATCHSIZE", Int(512)),
        ("RPN_NMS_THRESH", Float(0.7)),
        ("RPN_PRE_NMS_TOP_N", Int(12000)),
        ("RPN_POST_NMS_TOP_N", Int(2000)),
        // At original image scale
        ("RPN_MIN_SIZE", Int(8)),
        ("RPN_BBOX_INSIDE_WEIGHTS", float_tuple(&[1.0, 1.0, 1.0, 1.0])),
        // -1.0 means uniform example weighting
        ("RPN_POSITIVE_WEIGHT", Float(-1.0)),
    ])
}

fn test_defaults() -> ConfigTable {
    table(vec![
        // Single scale only
        ("SCALES", int_tuple(&[600])),
        ("MAX_SIZE", Int(2484)),
        // Suppress boxes with IoU >= this threshold
        ("NMS", Float(0.3)),
        ("RPN_NMS_THRESH", Float(0.7)),
        ("RPN_PRE_NMS_TOP_N", Int(6000)),
        ("RPN_POST_NMS_TOP_N", Int(300)),
        ("RPN_MIN_SIZE", Int(16)),
        // Only used when the test mode is 'top'
        ("RPN_TOP_N", Int(5000)),
    ])
}

fn resnet_defaults() -> ConfigTable {
    table(vec![
        // Append 2x2 max-pooling after crop-and-resize
        ("MAX_POOL", Bool(false)),
        // Blocks frozen during fine-tuning, 0 (none) to 3 (all)
        ("FIXED_BLOCKS", Int(1)),
    ])
}

fn table(entries: Vec<(&str, ConfigValue)>) -> ConfigTable {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn int_tuple(items: &[i64]) -> ConfigValue {
    ConfigValue::Tuple(items.iter().copied().map(Number::Int).collect())
}

fn float_tuple(items: &[f64]) -> ConfigValue {
    ConfigValue::Tuple(items.iter().copied().map(Number::Float).collect())
}

fn int_list(items: &[i64]) -> ConfigValue {
    ConfigValue::List(items.iter().copied().map(Number::Int).collect())
}

fn mean_vector(means: [f64; 3]) -> ConfigValue {
    ConfigValue::Array(NumArray::Float64(arr3(&[[means]]).into_dyn()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::value::ElementType;
    use std::path::PathBuf;

    fn defaults() -> ConfigTable {
        default_table(&PathBuf::from("/srv/rcnn"))
    }

    #[test]
    fn test_stage_groups() {
        let table = defaults();
        let train = table["TRAIN"].as_table().unwrap();
        let test = table["TEST"].as_table().unwrap();
        let resnet = table["RESNET"].as_table().unwrap();

        assert_eq!(train["LEARNING_RATE"], Float(0.001));
        assert_eq!(train["RPN_PRE_NMS_TOP_N"], Int(12000));
        assert_eq!(train["SCALES"], int_tuple(&[600]));
        assert_eq!(test["RPN_POST_NMS_TOP_N"], Int(300));
        assert_eq!(test["NMS"], Float(0.3));
        assert_eq!(resnet["FIXED_BLOCKS"], Int(1));
        assert_eq!(resnet["MAX_POOL"], Bool(false));
    }

    #[test]
    fn test_directories_follow_root() {
        let table = defaults();
        assert_eq!(table["ROOT_DIR"], Text("/srv/rcnn".to_string()));
        assert_eq!(table["DATA_DIR"], Text("/srv/rcnn/data".to_string()));
    }

    #[test]
    fn test_pixel_means_shape() {
        let table = defaults();
        match &table["PIXEL_MEANS"] {
            ConfigValue::Array(array) => {
                assert_eq!(array.shape(), &[1, 1, 3]);
                assert_eq!(array.values(), vec![102.9801, 115.9465, 122.7717]);
                assert_eq!(array.dtype(), ElementType::Float64);
            }
            other => panic!("unexpected PIXEL_MEANS: {:?}", other),
        }
    }

    #[test]
    fn test_anchor_geometry() {
        let table = defaults();
        assert_eq!(table["ANCHOR_SCALES"], int_list(&[32, 64, 128, 256, 512]));
        assert_eq!(table["FEAT_STRIDE"], int_list(&[16]));
        assert_eq!(table["FPN_FEAT_STRIDE"], Int(32));
        assert_eq!(table["DEDUP_BOXES"], Float(0.0625));
    }
}
