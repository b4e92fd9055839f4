//! Resolution engine
//!
//! Decides, per destination field, how a mapping fills it. First match wins:
//!
//! 1. not writable, or ignored by shape metadata or configuration: `Ignored`
//! 2. configured constant: `Constant`
//! 3. configured expression: `Expression`, parameter renamed
//! 4. source field by rename, declared source name, or own name:
//!    direct copy, collection copy, nested mapping, or a diagnostic

use crate::config::EngineConfig;
use crate::plan::{CollectionPath, NullGuard, PlannedField, ResolutionKind, ResolutionPlan};
use fieldmap_registry::{
    Diagnostic, DiagnosticKind, FieldDirective, FluentConfig, MappingEntry, MappingKey,
    RegistrySnapshot, Severity,
};
use fieldmap_rewrite::ParameterRewriter;
use fieldmap_shape::{
    can_assign_direct, can_box_elements, FieldDescriptor, FieldSet, Fingerprint,
    FingerprintBuilder, ShapeId,
};
use std::collections::BTreeSet;

/// Builds resolution plans
#[derive(Debug, Clone)]
pub struct Resolver {
    rewriter: ParameterRewriter,
    escalate_missing_source: bool,
    options: Fingerprint,
}

impl Resolver {
    /// Create resolver from engine options
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let mut options = FingerprintBuilder::new();
        options.bytes(config.parameter_target.as_bytes());
        for alias in &config.conventional_aliases {
            options.bytes(alias.as_bytes());
        }
        options.bytes(&[u8::from(config.escalate_missing_source)]);

        Self {
            rewriter: config.rewriter(),
            escalate_missing_source: config.escalate_missing_source,
            options: options.finish(),
        }
    }

    /// Digest of everything a plan for `entry` depends on
    ///
    /// Covers the key, both field sets, the configuration, the registered
    /// pairs reachable from the source's field types, and the engine options.
    ///
    /// # Errors
    /// Returns error if an input fails to serialize
    pub fn fingerprint(
        &self,
        entry: &MappingEntry,
        source: &FieldSet,
        dest: &FieldSet,
        registry: &RegistrySnapshot,
    ) -> Result<Fingerprint, serde_json::Error> {
        let reachable: BTreeSet<ShapeId> = source
            .iter()
            .flat_map(|f| {
                let element = f.element().map(|e| e.ty.shape());
                std::iter::once(f.ty().shape()).chain(element)
            })
            .collect();

        let mut builder = FingerprintBuilder::new();
        builder
            .value(entry.key())?
            .value(source)?
            .value(dest)?
            .value(entry.config())?;
        for key in registry.keys().filter(|k| reachable.contains(&k.source)) {
            builder.value(key)?;
        }
        builder.bytes(self.options.as_bytes());
        Ok(builder.finish())
    }

    /// Resolve every destination field of `entry`
    #[must_use]
    pub fn resolve(
        &self,
        entry: &MappingEntry,
        source: &FieldSet,
        dest: &FieldSet,
        registry: &RegistrySnapshot,
    ) -> ResolutionPlan {
        let fingerprint = self
            .fingerprint(entry, source, dest, registry)
            .unwrap_or_else(|err| {
                tracing::warn!(key = %entry.key(), %err, "cannot fingerprint plan inputs");
                Fingerprint::default()
            });
        self.resolve_with(entry, source, dest, registry, fingerprint)
    }

    pub(crate) fn resolve_with(
        &self,
        entry: &MappingEntry,
        source: &FieldSet,
        dest: &FieldSet,
        registry: &RegistrySnapshot,
        fingerprint: Fingerprint,
    ) -> ResolutionPlan {
        let mut cx = Context {
            key: entry.key(),
            config: entry.config(),
            source,
            registry,
            diagnostics: Vec::new(),
            has_missing_source: false,
            has_type_error: false,
        };

        let fields = dest
            .iter()
            .map(|field| {
                let kind = self.resolve_field(&mut cx, field);
                tracing::debug!(key = %cx.key, field = field.name(), ?kind, "resolved field");
                PlannedField {
                    descriptor: field.clone(),
                    kind,
                }
            })
            .collect();

        ResolutionPlan::new(
            entry.key().clone(),
            fields,
            cx.diagnostics,
            cx.has_missing_source,
            cx.has_type_error,
            fingerprint,
        )
    }

    fn resolve_field(&self, cx: &mut Context<'_>, dest: &FieldDescriptor) -> ResolutionKind {
        let directive = cx.config.directive(dest.name());
        if !dest.is_writable() || dest.is_ignored() || directive == Some(FieldDirective::Ignore) {
            return ResolutionKind::Ignored;
        }

        let source_name = match directive {
            Some(FieldDirective::Constant(text)) => {
                return ResolutionKind::Constant(text.to_string());
            }
            Some(FieldDirective::Expression(text)) => return self.expression(cx, dest, text),
            Some(FieldDirective::Rename(name)) => name,
            Some(FieldDirective::Ignore) | None => dest.source_name().unwrap_or(dest.name()),
        };

        let Some(src) = cx.source.get(source_name).filter(|f| f.is_readable()) else {
            return self.missing(cx, dest, source_name);
        };

        if can_assign_direct(src, dest) {
            return ResolutionKind::Direct(src.name().to_string());
        }
        if let (Some(se), Some(de)) = (src.element(), dest.element()) {
            let element_key = MappingKey::new(se.ty.shape(), de.ty.shape());
            if cx.registry.get(&element_key).is_some() {
                return ResolutionKind::Collection {
                    source: src.name().to_string(),
                    path: CollectionPath::PerElement(element_key),
                };
            }
            // boxing only carries elements of one identity
            if se.ty == de.ty && can_box_elements(se, de) {
                return ResolutionKind::Collection {
                    source: src.name().to_string(),
                    path: CollectionPath::Boxed,
                };
            }
            let (kind, message) = if se.storage == de.storage {
                (
                    DiagnosticKind::TypeMismatch,
                    format!("elements {} and {} have no registered mapping", se.ty, de.ty),
                )
            } else {
                (
                    DiagnosticKind::UnsoundBoxing,
                    format!(
                        "{:?} elements {} cannot be boxed into {:?} elements {}",
                        se.storage, se.ty, de.storage, de.ty
                    ),
                )
            };
            return cx.type_error(kind, dest, message);
        }

        let nested = MappingKey::new(src.ty().shape(), dest.ty().shape());
        if cx.registry.get(&nested).is_some() {
            return ResolutionKind::Nested {
                source: src.name().to_string(),
                key: nested,
                null_guard: NullGuard::between(src.storage(), dest.storage()),
            };
        }

        let message = format!(
            "source `{}` is {}, destination is {} and no mapping is registered",
            src.name(),
            src.ty(),
            dest.ty()
        );
        cx.type_error(DiagnosticKind::TypeMismatch, dest, message)
    }

    fn expression(
        &self,
        cx: &mut Context<'_>,
        dest: &FieldDescriptor,
        text: &str,
    ) -> ResolutionKind {
        let rewrite = self.rewriter.rewrite(text);
        if rewrite.is_malformed() {
            tracing::warn!(key = %cx.key, field = dest.name(), "expression kept verbatim");
            cx.diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::MalformedExpression,
                    Severity::Warning,
                    cx.key.clone(),
                    "unterminated literal or comment, parameter not renamed",
                )
                .with_field(dest.name()),
            );
        }
        ResolutionKind::Expression(rewrite.text)
    }

    fn missing(&self, cx: &mut Context<'_>, dest: &FieldDescriptor, name: &str) -> ResolutionKind {
        if cx.config.ignores_unmatched() {
            return ResolutionKind::Ignored;
        }

        let severity = if dest.is_defaultable() {
            Severity::Warning
        } else {
            cx.has_missing_source = true;
            if self.escalate_missing_source {
                Severity::Error
            } else {
                Severity::Warning
            }
        };
        tracing::warn!(key = %cx.key, field = dest.name(), source = name, "no readable source");
        cx.diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::MissingSource,
                severity,
                cx.key.clone(),
                format!("no readable source field `{name}`"),
            )
            .with_field(dest.name()),
        );
        ResolutionKind::Unresolved
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

struct Context<'a> {
    key: &'a MappingKey,
    config: &'a FluentConfig,
    source: &'a FieldSet,
    registry: &'a RegistrySnapshot,
    diagnostics: Vec<Diagnostic>,
    has_missing_source: bool,
    has_type_error: bool,
}

impl Context<'_> {
    fn type_error(
        &mut self,
        kind: DiagnosticKind,
        dest: &FieldDescriptor,
        message: String,
    ) -> ResolutionKind {
        tracing::warn!(key = %self.key, field = dest.name(), code = kind.code(), "field refused");
        self.has_type_error = true;
        self.diagnostics.push(
            Diagnostic::new(kind, Severity::Error, self.key.clone(), message)
                .with_field(dest.name()),
        );
        ResolutionKind::Unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_registry::{MappingRegistry, Provenance};
    use fieldmap_shape::{ElementType, StorageWidth};

    fn set(shape: &str, fields: Vec<FieldDescriptor>) -> FieldSet {
        FieldSet::new(shape, fields).unwrap()
    }

    fn entry(config: FluentConfig) -> MappingEntry {
        MappingEntry::explicit(MappingKey::new("Src", "Dst"), config, Provenance::new("t", 0))
    }

    fn resolve_one(
        source: Vec<FieldDescriptor>,
        dest: FieldDescriptor,
        config: FluentConfig,
        registry: &RegistrySnapshot,
    ) -> ResolutionPlan {
        Resolver::default().resolve(
            &entry(config),
            &set("Src", source),
            &set("Dst", vec![dest]),
            registry,
        )
    }

    fn int(name: &str) -> FieldDescriptor {
        FieldDescriptor::value(name, "int", StorageWidth::Word)
    }

    #[test]
    fn unwritable_destination_ignored() {
        let plan = resolve_one(
            vec![int("Id")],
            int("Id").with_writable(false),
            FluentConfig::new(),
            &RegistrySnapshot::default(),
        );
        assert_eq!(plan.fields_by_destination()[0].kind, ResolutionKind::Ignored);
    }

    #[test]
    fn metadata_ignore_wins_over_constant() {
        let plan = resolve_one(
            vec![],
            int("Id").ignored(),
            FluentConfig::new().constant("Id", "7"),
            &RegistrySnapshot::default(),
        );
        assert_eq!(plan.fields_by_destination()[0].kind, ResolutionKind::Ignored);
    }

    #[test]
    fn declared_source_name_used() {
        let plan = resolve_one(
            vec![int("Identifier")],
            int("Id").with_source_name("Identifier"),
            FluentConfig::new(),
            &RegistrySnapshot::default(),
        );
        assert_eq!(
            plan.fields_by_destination()[0].kind,
            ResolutionKind::Direct("Identifier".into())
        );
    }

    #[test]
    fn rename_beats_declared_source_name() {
        let plan = resolve_one(
            vec![int("Identifier"), int("Key")],
            int("Id").with_source_name("Identifier"),
            FluentConfig::new().rename("Id", "Key"),
            &RegistrySnapshot::default(),
        );
        assert_eq!(plan.fields_by_destination()[0].kind, ResolutionKind::Direct("Key".into()));
    }

    #[test]
    fn unreadable_source_is_missing() {
        let plan = resolve_one(
            vec![int("Id").with_readable(false)],
            int("Id"),
            FluentConfig::new(),
            &RegistrySnapshot::default(),
        );
        assert_eq!(plan.fields_by_destination()[0].kind, ResolutionKind::Unresolved);
        assert_eq!(plan.diagnostics()[0].kind(), DiagnosticKind::MissingSource);
        assert_eq!(plan.diagnostics()[0].severity(), Severity::Warning);
        assert!(!plan.has_missing_source());
    }

    #[test]
    fn missing_non_defaultable_escalates() {
        let plan = resolve_one(
            vec![],
            FieldDescriptor::reference("Name", "string"),
            FluentConfig::new(),
            &RegistrySnapshot::default(),
        );
        assert!(plan.has_missing_source());
        assert_eq!(plan.diagnostics()[0].severity(), Severity::Error);

        let lenient = Resolver::new(&EngineConfig::new().with_escalate_missing_source(false));
        let plan = lenient.resolve(
            &entry(FluentConfig::new()),
            &set("Src", vec![]),
            &set("Dst", vec![FieldDescriptor::reference("Name", "string")]),
            &RegistrySnapshot::default(),
        );
        assert!(plan.has_missing_source());
        assert_eq!(plan.diagnostics()[0].severity(), Severity::Warning);
    }

    #[test]
    fn ignore_unmatched_suppresses_missing() {
        let plan = resolve_one(
            vec![],
            FieldDescriptor::reference("Name", "string"),
            FluentConfig::new().ignore_unmatched(true),
            &RegistrySnapshot::default(),
        );
        assert_eq!(plan.fields_by_destination()[0].kind, ResolutionKind::Ignored);
        assert!(plan.diagnostics().is_empty());
    }

    #[test]
    fn type_mismatch_without_mapping() {
        let plan = resolve_one(
            vec![FieldDescriptor::value("Id", "long", StorageWidth::DoubleWord)],
            int("Id"),
            FluentConfig::new(),
            &RegistrySnapshot::default(),
        );
        assert_eq!(plan.fields_by_destination()[0].kind, ResolutionKind::Unresolved);
        assert!(plan.has_type_error());
        assert_eq!(plan.diagnostics()[0].kind(), DiagnosticKind::TypeMismatch);
    }

    #[test]
    fn nested_through_registered_mapping() {
        let registry = MappingRegistry::new();
        registry.add(MappingEntry::explicit(
            MappingKey::new("Address", "AddressDto"),
            FluentConfig::new(),
            Provenance::new("t", 1),
        ));
        let plan = resolve_one(
            vec![FieldDescriptor::reference("Home", "Address")],
            FieldDescriptor::reference("Home", "AddressDto").nullable(),
            FluentConfig::new(),
            &registry.snapshot(),
        );
        assert_eq!(
            plan.fields_by_destination()[0].kind,
            ResolutionKind::Nested {
                source: "Home".into(),
                key: MappingKey::new("Address", "AddressDto"),
                null_guard: NullGuard::PropagateAbsence,
            }
        );
    }

    #[test]
    fn collections() {
        let list = |name: &str, ty: &str, element: ElementType| {
            FieldDescriptor::reference(name, ty).with_element(element)
        };

        // identical reference elements box
        let plan = resolve_one(
            vec![list("Tags", "List<Tag>", ElementType::reference("Tag"))],
            list("Tags", "Tag[]", ElementType::reference("Tag")),
            FluentConfig::new(),
            &RegistrySnapshot::default(),
        );
        assert_eq!(
            plan.fields_by_destination()[0].kind,
            ResolutionKind::Collection {
                source: "Tags".into(),
                path: CollectionPath::Boxed,
            }
        );

        // differing reference elements need their own mapping
        let plan = resolve_one(
            vec![list("Tags", "List<Tag>", ElementType::reference("Tag"))],
            list("Tags", "List<TagDto>", ElementType::reference("TagDto")),
            FluentConfig::new(),
            &RegistrySnapshot::default(),
        );
        assert_eq!(plan.fields_by_destination()[0].kind, ResolutionKind::Unresolved);
        assert_eq!(plan.diagnostics()[0].kind(), DiagnosticKind::TypeMismatch);

        let registry = MappingRegistry::new();
        registry.add(MappingEntry::explicit(
            MappingKey::new("Tag", "TagDto"),
            FluentConfig::new(),
            Provenance::new("t", 1),
        ));
        let plan = resolve_one(
            vec![list("Tags", "List<Tag>", ElementType::reference("Tag"))],
            list("Tags", "List<TagDto>", ElementType::reference("TagDto")),
            FluentConfig::new(),
            &registry.snapshot(),
        );
        assert_eq!(
            plan.fields_by_destination()[0].kind,
            ResolutionKind::Collection {
                source: "Tags".into(),
                path: CollectionPath::PerElement(MappingKey::new("Tag", "TagDto")),
            }
        );

        // value into reference elements never boxes
        let plan = resolve_one(
            vec![list("Ids", "List<int>", ElementType::value("int"))],
            list("Ids", "List<object>", ElementType::reference("object")),
            FluentConfig::new(),
            &RegistrySnapshot::default(),
        );
        assert_eq!(plan.fields_by_destination()[0].kind, ResolutionKind::Unresolved);
        assert_eq!(plan.diagnostics()[0].kind(), DiagnosticKind::UnsoundBoxing);
        assert!(plan.has_type_error());

        // unless a per-element mapping is registered
        let registry = MappingRegistry::new();
        registry.add(MappingEntry::explicit(
            MappingKey::new("int", "object"),
            FluentConfig::new(),
            Provenance::new("t", 2),
        ));
        let plan = resolve_one(
            vec![list("Ids", "List<int>", ElementType::value("int"))],
            list("Ids", "List<object>", ElementType::reference("object")),
            FluentConfig::new(),
            &registry.snapshot(),
        );
        assert_eq!(
            plan.fields_by_destination()[0].kind,
            ResolutionKind::Collection {
                source: "Ids".into(),
                path: CollectionPath::PerElement(MappingKey::new("int", "object")),
            }
        );
    }

    #[test]
    fn malformed_expression_kept_and_reported() {
        let plan = resolve_one(
            vec![],
            FieldDescriptor::reference("Label", "string"),
            FluentConfig::new().expression("Label", "s => s.Name + \"open"),
            &RegistrySnapshot::default(),
        );
        assert_eq!(
            plan.fields_by_destination()[0].kind,
            ResolutionKind::Expression("s => s.Name + \"open".into())
        );
        assert_eq!(plan.diagnostics()[0].kind(), DiagnosticKind::MalformedExpression);
    }

    #[test]
    fn fingerprint_tracks_inputs() {
        let resolver = Resolver::default();
        let registry = RegistrySnapshot::default();
        let source = set("Src", vec![int("Id")]);
        let dest = set("Dst", vec![int("Id")]);

        let a = resolver
            .fingerprint(&entry(FluentConfig::new()), &source, &dest, &registry)
            .unwrap();
        let b = resolver
            .fingerprint(&entry(FluentConfig::new()), &source, &dest, &registry)
            .unwrap();
        let c = resolver
            .fingerprint(&entry(FluentConfig::new().ignore("Id")), &source, &dest, &registry)
            .unwrap();
        let d = Resolver::new(&EngineConfig::new().with_parameter_target("src"))
            .fingerprint(&entry(FluentConfig::new()), &source, &dest, &registry)
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }
}
