//! Manifest loading
//!
//! A manifest declares shapes and mappings in one YAML or JSON document and
//! stands in for both the shape introspector and the configuration parser.
//!
//! ```yaml
//! origin: orders.yaml
//! shapes:
//!   Order:
//!     - { name: Id, type: int }
//!     - { name: Customer, type: Customer, nullable: true }
//! mappings:
//!   - source: Order
//!     destination: OrderDto
//!     ignore: [Secret]
//!     expression: { Total: "s => s.Price * s.Quantity" }
//! ```

use fieldmap_registry::{FluentConfig, MappingEntry, MappingKey, MappingRegistry, Provenance};
use fieldmap_shape::{
    ElementType, FieldDescriptor, FieldSet, ShapeError, ShapeTable, StorageClass, StorageWidth,
};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Manifest loading errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Extension is neither YAML nor JSON
    #[error("unsupported manifest format: {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),

    /// Malformed YAML
    #[error("invalid YAML manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed JSON
    #[error("invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// Shape declares a field twice
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Mapping refers to a shape the manifest does not declare
    #[error("mapping {key} refers to undeclared shape `{shape}`")]
    UndeclaredShape {
        /// Mapping
        key: MappingKey,
        /// Missing shape
        shape: String,
    },

    /// One destination field configured more than one way
    #[error("mapping {key} configures field `{field}` more than once")]
    ConflictingDirective {
        /// Mapping
        key: MappingKey,
        /// Destination field
        field: String,
    },

    /// Field declaration that cannot be represented
    #[error("field `{field}` of shape `{shape}`: {reason}")]
    InvalidField {
        /// Shape
        shape: String,
        /// Field
        field: String,
        /// What is wrong
        reason: String,
    },
}

/// Manifest document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Configuration origin, defaults to the file path
    #[serde(default)]
    pub origin: Option<String>,

    /// Declared shapes, each with its fields in declaration order
    #[serde(default)]
    pub shapes: BTreeMap<String, Vec<FieldSpec>>,

    /// Declared mappings
    #[serde(default)]
    pub mappings: Vec<MappingSpec>,
}

/// One declared field
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Field name
    pub name: String,

    /// Type name: primitive, shape, `List<T>` or `T[]`
    #[serde(rename = "type")]
    pub ty: String,

    /// Storage class for non-primitive types (default reference)
    #[serde(default)]
    pub storage: Option<StorageClass>,

    /// Width of a non-primitive value type (default large)
    #[serde(default)]
    pub width: Option<StorageWidth>,

    /// Reference may be absent
    #[serde(default)]
    pub nullable: bool,

    /// Field can be read
    #[serde(default = "yes")]
    pub readable: bool,

    /// Field can be written
    #[serde(default = "yes")]
    pub writable: bool,

    /// Never mapped
    #[serde(default)]
    pub ignored: bool,

    /// Alternate source field name
    #[serde(default)]
    pub source_name: Option<String>,
}

fn yes() -> bool {
    true
}

/// One declared mapping
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingSpec {
    /// Source shape
    pub source: String,

    /// Destination shape
    pub destination: String,

    /// Also derive the reverse mapping
    #[serde(default)]
    pub reverse: bool,

    /// Ignore destination fields without a source
    #[serde(default)]
    pub ignore_unmatched: bool,

    /// Ignored destination fields
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Destination field to source field
    #[serde(default)]
    pub rename: BTreeMap<String, String>,

    /// Destination field to expression
    #[serde(default)]
    pub expression: BTreeMap<String, String>,

    /// Destination field to constant text
    #[serde(default)]
    pub constant: BTreeMap<String, String>,
}

impl Manifest {
    /// Parse YAML text
    ///
    /// # Errors
    /// Returns error on malformed YAML
    pub fn from_yaml_str(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse JSON text
    ///
    /// # Errors
    /// Returns error on malformed JSON
    pub fn from_json_str(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a manifest file, format chosen by extension
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let parse = match extension.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str,
            Some("json") => Self::from_json_str,
            _ => return Err(ManifestError::UnsupportedFormat(path.to_path_buf())),
        };

        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = parse(&text)?;
        if manifest.origin.is_none() {
            manifest.origin = Some(path.display().to_string());
        }
        tracing::debug!(
            path = %path.display(),
            shapes = manifest.shapes.len(),
            mappings = manifest.mappings.len(),
            "manifest loaded"
        );
        Ok(manifest)
    }

    /// Declared shapes
    ///
    /// # Errors
    /// Returns error on duplicate field names or an invalid field
    pub fn shape_table(&self) -> Result<ShapeTable, ManifestError> {
        let mut table = ShapeTable::new();
        for (shape, fields) in &self.shapes {
            let descriptors = fields
                .iter()
                .map(|spec| descriptor(shape, spec))
                .collect::<Result<Vec<_>, _>>()?;
            table.insert(FieldSet::new(shape.as_str(), descriptors)?);
        }
        Ok(table)
    }

    /// Register every declared mapping
    ///
    /// Entries carry this manifest's origin and their position as provenance.
    ///
    /// # Errors
    /// Returns error if a mapping names an undeclared shape or configures a
    /// field more than once
    pub fn register(&self, registry: &MappingRegistry) -> Result<(), ManifestError> {
        let origin = self.origin.as_deref().unwrap_or("manifest");
        for (ordinal, spec) in (0_u32..).zip(&self.mappings) {
            let key = MappingKey::new(spec.source.as_str(), spec.destination.as_str());
            for shape in [&spec.source, &spec.destination] {
                if !self.shapes.contains_key(shape) {
                    return Err(ManifestError::UndeclaredShape {
                        key,
                        shape: shape.clone(),
                    });
                }
            }
            let config = fluent_config(&key, spec)?;
            let outcome = registry.add(MappingEntry::explicit(
                key,
                config,
                Provenance::new(origin, ordinal),
            ));
            tracing::trace!(ordinal, ?outcome, "mapping registered");
        }
        Ok(())
    }
}

fn fluent_config(key: &MappingKey, spec: &MappingSpec) -> Result<FluentConfig, ManifestError> {
    let mut seen = BTreeSet::new();
    let names = spec
        .ignore
        .iter()
        .chain(spec.rename.keys())
        .chain(spec.expression.keys())
        .chain(spec.constant.keys());
    for name in names {
        if !seen.insert(name) {
            return Err(ManifestError::ConflictingDirective {
                key: key.clone(),
                field: name.clone(),
            });
        }
    }

    let mut config = FluentConfig::new()
        .reverse(spec.reverse)
        .ignore_unmatched(spec.ignore_unmatched);
    for name in &spec.ignore {
        config = config.ignore(name.as_str());
    }
    for (dest, source) in &spec.rename {
        config = config.rename(dest.as_str(), source.as_str());
    }
    for (dest, text) in &spec.expression {
        config = config.expression(dest.as_str(), text.as_str());
    }
    for (dest, text) in &spec.constant {
        config = config.constant(dest.as_str(), text.as_str());
    }
    Ok(config)
}

enum Primitive {
    Value(StorageWidth),
    Reference,
}

fn primitive(ty: &str) -> Option<Primitive> {
    use StorageWidth::{Byte, DoubleWord, Large, Short, Word};
    let width = match ty {
        "bool" | "byte" | "sbyte" => Byte,
        "short" | "ushort" | "char" => Short,
        "int" | "uint" | "float" => Word,
        "long" | "ulong" | "double" | "DateTime" | "TimeSpan" => DoubleWord,
        "decimal" | "Guid" => Large,
        "string" | "object" => return Some(Primitive::Reference),
        _ => return None,
    };
    Some(Primitive::Value(width))
}

fn collection_element(ty: &str) -> Option<&str> {
    ty.strip_prefix("List<")
        .and_then(|rest| rest.strip_suffix('>'))
        .or_else(|| ty.strip_suffix("[]"))
        .map(str::trim)
        .filter(|element| !element.is_empty())
}

fn descriptor(shape: &str, spec: &FieldSpec) -> Result<FieldDescriptor, ManifestError> {
    let base = if let Some(element) = collection_element(&spec.ty) {
        let element = match primitive(element) {
            Some(Primitive::Value(_)) => ElementType::value(element),
            Some(Primitive::Reference) | None => ElementType::reference(element),
        };
        if spec.storage == Some(StorageClass::Value) {
            return Err(ManifestError::InvalidField {
                shape: shape.to_string(),
                field: spec.name.clone(),
                reason: "collections are reference-class".to_string(),
            });
        }
        FieldDescriptor::reference(spec.name.as_str(), spec.ty.as_str()).with_element(element)
    } else {
        match (primitive(&spec.ty), spec.storage) {
            (Some(Primitive::Value(width)), _) => {
                FieldDescriptor::value(spec.name.as_str(), spec.ty.as_str(), width)
            }
            (None, Some(StorageClass::Value)) => FieldDescriptor::value(
                spec.name.as_str(),
                spec.ty.as_str(),
                spec.width.unwrap_or(StorageWidth::Large),
            ),
            (Some(Primitive::Reference) | None, _) => {
                FieldDescriptor::reference(spec.name.as_str(), spec.ty.as_str())
            }
        }
    };

    let mut field = base
        .with_readable(spec.readable)
        .with_writable(spec.writable);
    if spec.nullable {
        field = field.nullable();
    }
    if spec.ignored {
        field = field.ignored();
    }
    if let Some(source) = &spec.source_name {
        field = field.with_source_name(source.as_str());
    }
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_shape::ShapeIntrospector;

    const ORDERS: &str = r#"
origin: orders.yaml
shapes:
  Order:
    - { name: Id, type: int }
    - { name: Lines, type: "List<OrderLine>" }
    - { name: Codes, type: "int[]" }
    - { name: Stamp, type: Instant, storage: value, width: double_word }
  OrderDto:
    - { name: Id, type: int, source_name: Key }
    - { name: Customer, type: Customer, nullable: true }
    - { name: Audit, type: string, writable: false, ignored: true }
mappings:
  - source: Order
    destination: OrderDto
    reverse: true
    ignore: [Audit]
    rename: { Id: Id }
"#;

    #[test]
    fn primitive_widths() {
        let manifest = Manifest::from_yaml_str(ORDERS).unwrap();
        let table = manifest.shape_table().unwrap();
        let order = table.introspect(&"Order".into());

        let id = order.get("Id").unwrap();
        assert_eq!(id.width(), Some(StorageWidth::Word));

        let lines = order.get("Lines").unwrap();
        assert_eq!(lines.storage(), StorageClass::Reference);
        assert_eq!(lines.element(), Some(&ElementType::reference("OrderLine")));

        let codes = order.get("Codes").unwrap();
        assert_eq!(codes.element(), Some(&ElementType::value("int")));

        let stamp = order.get("Stamp").unwrap();
        assert_eq!(stamp.storage(), StorageClass::Value);
        assert_eq!(stamp.width(), Some(StorageWidth::DoubleWord));
    }

    #[test]
    fn field_flags() {
        let manifest = Manifest::from_yaml_str(ORDERS).unwrap();
        let table = manifest.shape_table().unwrap();
        let dto = table.introspect(&"OrderDto".into());

        assert_eq!(dto.get("Id").unwrap().source_name(), Some("Key"));
        assert!(dto.get("Customer").unwrap().is_defaultable());
        let audit = dto.get("Audit").unwrap();
        assert!(!audit.is_writable());
        assert!(audit.is_ignored());
    }

    #[test]
    fn registers_with_provenance() {
        let manifest = Manifest::from_yaml_str(ORDERS).unwrap();
        let registry = MappingRegistry::new();
        manifest.register(&registry).unwrap();

        let entry = registry.get(&MappingKey::new("Order", "OrderDto")).unwrap();
        assert_eq!(entry.provenance(), Some(&Provenance::new("orders.yaml", 0)));
        assert!(entry.config().is_reverse());
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn conflicting_directive_rejected() {
        let text = r"
shapes: { A: [], B: [] }
mappings:
  - { source: A, destination: B, ignore: [X], constant: { X: '1' } }
";
        let manifest = Manifest::from_yaml_str(text).unwrap();
        let err = manifest.register(&MappingRegistry::new()).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::ConflictingDirective { ref field, .. } if field == "X"
        ));
    }

    #[test]
    fn undeclared_shape_rejected() {
        let manifest =
            Manifest::from_yaml_str("mappings: [{ source: A, destination: B }]").unwrap();
        let err = manifest.register(&MappingRegistry::new()).unwrap_err();
        assert!(matches!(err, ManifestError::UndeclaredShape { ref shape, .. } if shape == "A"));
    }

    #[test]
    fn duplicate_field_rejected() {
        let text = "shapes: { A: [{ name: X, type: int }, { name: X, type: int }] }";
        let manifest = Manifest::from_yaml_str(text).unwrap();
        assert!(matches!(manifest.shape_table(), Err(ManifestError::Shape(_))));
    }

    #[test]
    fn value_collection_rejected() {
        let manifest =
            Manifest::from_yaml_str("shapes: { A: [{ name: X, type: 'int[]', storage: value }] }")
                .unwrap();
        assert!(matches!(manifest.shape_table(), Err(ManifestError::InvalidField { .. })));
    }

    #[test]
    fn json_and_unknown_fields() {
        let text = r#"{"shapes": {"A": [{"name": "X", "type": "int"}]}}"#;
        let manifest = Manifest::from_json_str(text).unwrap();
        assert_eq!(manifest.shapes.len(), 1);
        assert!(Manifest::from_yaml_str("shapez: {}").is_err());
    }

    #[test]
    fn load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("m.yaml");
        std::fs::write(&yaml, "shapes: { A: [] }").unwrap();
        let manifest = Manifest::load(&yaml).unwrap();
        assert_eq!(manifest.origin.as_deref(), Some(yaml.display().to_string().as_str()));

        let toml = dir.path().join("m.toml");
        std::fs::write(&toml, "").unwrap();
        assert!(matches!(Manifest::load(&toml), Err(ManifestError::UnsupportedFormat(_))));
    }
}
