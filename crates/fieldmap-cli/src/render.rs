//! Plan and diagnostic output

use fieldmap_engine::{
    CollectionPath, Diagnostic, NullGuard, PassOutput, PlannedField, ResolutionKind,
    ResolutionPlan,
};
use fieldmap_registry::MappingKey;
use fieldmap_shape::Fingerprint;
use serde::Serialize;
use std::io::{self, Write};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human readable
    #[default]
    Text,

    /// One pretty-printed JSON document
    Json,
}

/// Write every plan of a pass, then its diagnostics
///
/// # Errors
/// Returns error if writing fails
pub fn plans(out: &mut impl Write, output: &PassOutput, format: Format) -> io::Result<()> {
    match format {
        Format::Text => {
            for plan in output.plans() {
                plan_text(out, plan)?;
                writeln!(out)?;
            }
            diagnostics_text(out, output.diagnostics())
        }
        Format::Json => json(out, &PassReport::new(output)),
    }
}

/// Write only the diagnostics of a pass
///
/// # Errors
/// Returns error if writing fails
pub fn diagnostics(out: &mut impl Write, output: &PassOutput, format: Format) -> io::Result<()> {
    match format {
        Format::Text => {
            diagnostics_text(out, output.diagnostics())?;
            let errors = output.escalations().len();
            writeln!(
                out,
                "{} mapping(s), {} diagnostic(s), {errors} error(s)",
                output.plans().len(),
                output.diagnostics().len(),
            )
        }
        Format::Json => json(out, &output.diagnostics()),
    }
}

fn plan_text(out: &mut impl Write, plan: &ResolutionPlan) -> io::Result<()> {
    writeln!(out, "{} [{}]", plan.key(), plan.fingerprint().short())?;

    let emitted = plan.emission_order();
    let fields = plan.fields_by_destination();
    let skipped = fields.iter().filter(|f| !f.kind.is_emitted());
    let width = fields.iter().map(|f| f.name().len()).max().unwrap_or(0);
    for field in emitted.into_iter().chain(skipped) {
        writeln!(out, "  {:<width$}  {}", field.name(), describe(&field.kind))?;
    }
    Ok(())
}

fn diagnostics_text(out: &mut impl Write, diagnostics: &[Diagnostic]) -> io::Result<()> {
    for diagnostic in diagnostics {
        writeln!(out, "{diagnostic}")?;
    }
    Ok(())
}

fn describe(kind: &ResolutionKind) -> String {
    match kind {
        ResolutionKind::Direct(source) => format!("<- {source}"),
        ResolutionKind::Nested {
            source,
            key,
            null_guard,
        } => {
            let guard = match null_guard {
                NullGuard::None => "",
                NullGuard::PropagateAbsence => ", absent stays absent",
                NullGuard::SkipWhenAbsent => ", skipped when absent",
            };
            format!("<- {source} via {key}{guard}")
        }
        ResolutionKind::Constant(text) => format!("= {text}"),
        ResolutionKind::Expression(text) => format!("= {{ {text} }}"),
        ResolutionKind::Collection { source, path } => match path {
            CollectionPath::Boxed => format!("<- [{source}] boxed"),
            CollectionPath::PerElement(key) => format!("<- [{source}] via {key}"),
        },
        ResolutionKind::Ignored => "ignored".to_string(),
        ResolutionKind::Unresolved => "unresolved".to_string(),
    }
}

fn json(out: &mut impl Write, value: &impl Serialize) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

#[derive(Serialize)]
struct PassReport<'a> {
    version: &'static str,
    plans: Vec<PlanReport<'a>>,
    diagnostics: &'a [Diagnostic],
    cache_hits: usize,
}

impl<'a> PassReport<'a> {
    fn new(output: &'a PassOutput) -> Self {
        Self {
            version: crate::VERSION,
            plans: output.plans().iter().map(|p| PlanReport::new(p)).collect(),
            diagnostics: output.diagnostics(),
            cache_hits: output.cache_hits(),
        }
    }
}

#[derive(Serialize)]
struct PlanReport<'a> {
    key: &'a MappingKey,
    fingerprint: Fingerprint,
    emission_order: Vec<&'a str>,
    fields: &'a [PlannedField],
    has_missing_source: bool,
    has_type_error: bool,
}

impl<'a> PlanReport<'a> {
    fn new(plan: &'a ResolutionPlan) -> Self {
        Self {
            key: plan.key(),
            fingerprint: plan.fingerprint(),
            emission_order: plan.emission_order().into_iter().map(PlannedField::name).collect(),
            fields: plan.fields_by_destination(),
            has_missing_source: plan.has_missing_source(),
            has_type_error: plan.has_type_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use fieldmap_engine::EngineConfig;

    const MANIFEST: &str = r#"
shapes:
  Person:
    - { name: Id, type: int }
    - { name: Name, type: string }
    - { name: Home, type: Address, nullable: true }
  PersonDto:
    - { name: Name, type: string }
    - { name: Id, type: int }
    - { name: Home, type: AddressDto, nullable: true }
    - { name: Kind, type: string }
    - { name: Age, type: int }
  Address:
    - { name: Street, type: string }
  AddressDto:
    - { name: Street, type: string }
mappings:
  - source: Person
    destination: PersonDto
    constant: { Kind: '"person"' }
  - { source: Address, destination: AddressDto }
"#;

    fn compile() -> PassOutput {
        let manifest = Manifest::from_yaml_str(MANIFEST).unwrap();
        crate::compile(&manifest, EngineConfig::default()).unwrap()
    }

    fn render(format: Format) -> String {
        let mut buffer = Vec::new();
        plans(&mut buffer, &compile(), format).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn text_lists_fields_in_emission_order() {
        let text = render(Format::Text);
        let person: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with("Person -> PersonDto"))
            .skip(1)
            .take_while(|l| l.starts_with("  "))
            .map(str::trim)
            .collect();
        assert_eq!(
            person,
            [
                "Id    <- Id",
                "Kind  = \"person\"",
                "Name  <- Name",
                "Home  <- Home via Address -> AddressDto, absent stays absent",
                "Age   unresolved",
            ]
        );
    }

    #[test]
    fn text_ends_with_diagnostics() {
        let output = compile();
        let mut buffer = Vec::new();
        diagnostics(&mut buffer, &output, Format::Text).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("[missing-source]"));
        assert!(text.trim_end().ends_with("2 mapping(s), 1 diagnostic(s), 0 error(s)"));
    }

    #[test]
    fn json_report_shape() {
        let value: serde_json::Value = serde_json::from_str(&render(Format::Json)).unwrap();
        let plans = value["plans"].as_array().unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[1]["key"]["source"], "Person");
        assert_eq!(plans[1]["emission_order"][0], "Id");
        assert_eq!(value["cache_hits"], 0);
    }
}
