use std::{collections::HashMap, io::{BufReader, Read}};

use crate::{error::{HuffError, Result}, header::HeaderFormat};

/// Driver settings read from a `.properties` file.
///
/// Recognized keys are `headerformat` (`counts` or `tree`) and `force`
/// (`true` or `false`). Missing keys keep their defaults; unknown keys are
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecProperties {
    pub header_format: HeaderFormat,
    pub force: bool,
}

impl Default for CodecProperties {
    fn default() -> Self {
        Self {
            header_format: HeaderFormat::Tree,
            force: false,
        }
    }
}

impl CodecProperties {
    pub fn load<R: Read>(input: R) -> Result<Self> {
        let p = java_properties::read(BufReader::new(input))
            .map_err(|e| HuffError::Config(format!("failed parsing the properties file: {}", e)))?;
        Self::try_from(p)
    }
}

impl TryFrom<HashMap<String, String>> for CodecProperties {
    type Error = HuffError;

    fn try_from(value: HashMap<String, String>) -> Result<Self> {
        let mut props = CodecProperties::default();

        if let Some(format) = value.get("headerformat") {
            props.header_format = format.parse()?;
        }
        if let Some(force) = value.get("force") {
            props.force = force.trim().parse().map_err(|_| {
                HuffError::Config(format!("force must be 'true' or 'false', got '{}'", force))
            })?;
        }

        Ok(props)
    }
}

#[test]
fn test_load_properties() {
    let file = "# written by hand\nheaderformat = counts\nforce=true\nunrelated=1\n";

    let props = CodecProperties::load(file.as_bytes()).unwrap();

    assert_eq!(props, CodecProperties { header_format: HeaderFormat::Counts, force: true });
}

#[test]
fn test_missing_keys_keep_defaults() {
    let props = CodecProperties::load("".as_bytes()).unwrap();

    assert_eq!(props, CodecProperties::default());
}

#[test]
fn test_malformed_values() {
    assert!(matches!(CodecProperties::load("force = maybe".as_bytes()), Err(HuffError::Config(_))));
    assert!(matches!(CodecProperties::load("headerformat = zip".as_bytes()), Err(HuffError::Config(_))));
}
