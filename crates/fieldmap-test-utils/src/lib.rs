//! Testing utilities for the fieldmap workspace
//!
//! Field shorthands, shape and mapping builders, and the order/customer
//! fixture used across integration tests.

#![allow(missing_docs)]

use fieldmap_registry::{FluentConfig, MappingEntry, MappingKey, MappingRegistry, Provenance};
use fieldmap_shape::{ElementType, FieldDescriptor, FieldSet, ShapeTable, StorageWidth};
use std::sync::atomic::{AtomicU32, Ordering};

pub fn boolean(name: &str) -> FieldDescriptor {
    FieldDescriptor::value(name, "bool", StorageWidth::Byte)
}

pub fn short(name: &str) -> FieldDescriptor {
    FieldDescriptor::value(name, "short", StorageWidth::Short)
}

pub fn int(name: &str) -> FieldDescriptor {
    FieldDescriptor::value(name, "int", StorageWidth::Word)
}

pub fn long(name: &str) -> FieldDescriptor {
    FieldDescriptor::value(name, "long", StorageWidth::DoubleWord)
}

pub fn decimal(name: &str) -> FieldDescriptor {
    FieldDescriptor::value(name, "decimal", StorageWidth::Large)
}

pub fn string(name: &str) -> FieldDescriptor {
    FieldDescriptor::reference(name, "string")
}

pub fn nullable_string(name: &str) -> FieldDescriptor {
    FieldDescriptor::reference(name, "string").nullable()
}

pub fn object(name: &str, shape: &str) -> FieldDescriptor {
    FieldDescriptor::reference(name, shape).nullable()
}

pub fn list_of(name: &str, element: ElementType) -> FieldDescriptor {
    let ty = format!("List<{}>", element.ty);
    FieldDescriptor::reference(name, ty).nullable().with_element(element)
}

pub fn shape(id: &str, fields: impl IntoIterator<Item = FieldDescriptor>) -> FieldSet {
    FieldSet::new(id, fields).unwrap()
}

/// Builds registry entries with increasing ordinals from one origin
#[derive(Debug)]
pub struct EntryFactory {
    origin: String,
    next: AtomicU32,
}

impl EntryFactory {
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            next: AtomicU32::new(0),
        }
    }

    pub fn entry(&self, source: &str, destination: &str, config: FluentConfig) -> MappingEntry {
        let ordinal = self.next.fetch_add(1, Ordering::Relaxed);
        MappingEntry::explicit(
            MappingKey::new(source, destination),
            config,
            Provenance::new(self.origin.clone(), ordinal),
        )
    }
}

/// Order/customer domain used by integration tests
pub fn order_shapes() -> ShapeTable {
    ShapeTable::new()
        .with_shape(shape(
            "Order",
            [
                int("Id"),
                decimal("Price"),
                int("Quantity"),
                boolean("Paid"),
                string("Number"),
                object("Customer", "Customer"),
                list_of("Lines", ElementType::reference("OrderLine")),
            ],
        ))
        .with_shape(shape(
            "OrderDto",
            [
                string("Number"),
                decimal("Total"),
                int("Id"),
                object("Customer", "CustomerDto"),
                boolean("Paid"),
                nullable_string("Kind"),
                list_of("Lines", ElementType::reference("OrderLineDto")),
                nullable_string("Secret"),
            ],
        ))
        .with_shape(shape("Customer", [int("Id"), string("Name")]))
        .with_shape(shape("CustomerDto", [int("Id"), string("Name")]))
        .with_shape(shape("OrderLine", [string("Sku"), int("Quantity")]))
        .with_shape(shape("OrderLineDto", [string("Sku"), int("Quantity")]))
}

/// Registry over [`order_shapes`]: `Order -> OrderDto`, its line items, and
/// `Customer -> CustomerDto` with reverse
pub fn order_registry() -> MappingRegistry {
    let factory = EntryFactory::new("orders.yaml");
    let registry = MappingRegistry::new();
    registry.add(factory.entry(
        "Order",
        "OrderDto",
        FluentConfig::new()
            .expression("Total", "o => o.Price * o.Quantity")
            .constant("Kind", "\"order\"")
            .ignore("Secret"),
    ));
    registry.add(factory.entry("Customer", "CustomerDto", FluentConfig::new().reverse(true)));
    registry.add(factory.entry("OrderLine", "OrderLineDto", FluentConfig::new()));
    registry
}

/// Install a test subscriber honoring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
