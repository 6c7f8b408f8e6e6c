//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attributes: two
/// `Amount`s of 100 USD cents are the same amount. To "modify" one, build a
/// new one.
///
/// Contrast with [`crate::state::LinearState`], whose instances are tracked by
/// a stable identifier even when every other field coincides.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
