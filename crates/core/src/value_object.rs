//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two values with the same attributes
/// are equal. Purchase preferences and car specifications are value objects;
/// buyers and cars are entities.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
