//! Storage-class compatibility rules
//!
//! Pure predicates deciding which assignment paths are sound between two
//! fields. The boxing rules are the only ones allowed to refuse a code path
//! outright: a generic path that round-trips through an erased slot is never
//! planned across storage classes.

use crate::field::{ElementType, FieldDescriptor, StorageClass};

/// Whether `dest` can be assigned directly from `source`
///
/// Nominal identity only, no coercion.
#[inline]
#[must_use]
pub fn can_assign_direct(source: &FieldDescriptor, dest: &FieldDescriptor) -> bool {
    source.ty() == dest.ty()
}

/// Whether a generic, type-erased path is sound between two storage classes
///
/// | source    | dest      | sound |
/// |-----------|-----------|-------|
/// | Reference | Reference | yes   |
/// | Value     | Value     | yes (identity checked by [`can_box_elements`]) |
/// | Value     | Reference | no    |
/// | Reference | Value     | no    |
#[inline]
#[must_use]
pub const fn can_box_generically(source: StorageClass, dest: StorageClass) -> bool {
    matches!(
        (source, dest),
        (StorageClass::Reference, StorageClass::Reference)
            | (StorageClass::Value, StorageClass::Value)
    )
}

/// Whether collection elements may travel through the generic path
///
/// Value elements additionally require identical identities: unboxing into a
/// different value type corrupts or throws.
#[inline]
#[must_use]
pub fn can_box_elements(source: &ElementType, dest: &ElementType) -> bool {
    if !can_box_generically(source.storage, dest.storage) {
        return false;
    }
    match source.storage {
        StorageClass::Reference => true,
        StorageClass::Value => source.ty == dest.ty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::StorageWidth;
    use proptest::prelude::*;

    fn class() -> impl Strategy<Value = StorageClass> {
        prop_oneof![Just(StorageClass::Value), Just(StorageClass::Reference)]
    }

    #[test]
    fn direct_requires_equal_identity() {
        let a = FieldDescriptor::value("Id", "int", StorageWidth::Word);
        let b = FieldDescriptor::value("Id", "int", StorageWidth::Word).with_writable(false);
        let c = FieldDescriptor::value("Id", "long", StorageWidth::DoubleWord);

        assert!(can_assign_direct(&a, &b));
        assert!(!can_assign_direct(&a, &c));
    }

    #[test]
    fn boxing_table() {
        use StorageClass::{Reference, Value};
        assert!(can_box_generically(Reference, Reference));
        assert!(can_box_generically(Value, Value));
        assert!(!can_box_generically(Value, Reference));
        assert!(!can_box_generically(Reference, Value));
    }

    #[test]
    fn value_elements_need_same_identity() {
        assert!(can_box_elements(&ElementType::value("int"), &ElementType::value("int")));
        assert!(!can_box_elements(&ElementType::value("int"), &ElementType::value("long")));
        assert!(can_box_elements(
            &ElementType::reference("Address"),
            &ElementType::reference("AddressDto")
        ));
        assert!(!can_box_elements(&ElementType::value("int"), &ElementType::reference("int")));
    }

    proptest! {
        #[test]
        fn prop_boxing_sound_only_within_class(source in class(), dest in class()) {
            prop_assert_eq!(can_box_generically(source, dest), source == dest);
        }

        #[test]
        fn prop_cross_class_elements_never_box(
            ty in "[A-Z][a-z]{0,6}",
            source in class(),
            dest in class(),
        ) {
            let a = ElementType { ty: ty.as_str().into(), storage: source };
            let b = ElementType { ty: ty.as_str().into(), storage: dest };
            if source != dest {
                prop_assert!(!can_box_elements(&a, &b));
            } else {
                prop_assert!(can_box_elements(&a, &b));
            }
        }
    }
}
