//! Declarative operation descriptions.
//!
//! Every remote operation is described once, statically, by an
//! [`OperationDescriptor`]: the category it lives in (which fixes the
//! resource path and protocol version), the parameters it accepts and the
//! throttling quota the service enforces for it. The [`SchemaRegistry`]
//! maps operation names to descriptors and is shared read-only by every
//! call.
//!
//! # Example
//!
//! ```rust
//! use mws_api::schema::{
//!     Category, OperationDescriptor, ParameterRule, ParameterSchema, Quota, SchemaRegistry,
//! };
//!
//! const WIDGETS: Category = Category::new("Widgets", "/Widgets/2020-01-01", "2020-01-01");
//!
//! const LIST_WIDGETS_PARAMS: ParameterSchema = &[
//!     ("Color", ParameterRule::string().one_of(&["Red", "Blue"])),
//!     ("WidgetId", ParameterRule::string().required().list("WidgetId.Id").list_max(5)),
//! ];
//!
//! const LIST_WIDGETS: OperationDescriptor = OperationDescriptor::new("ListWidgets", WIDGETS)
//!     .parameters(LIST_WIDGETS_PARAMS)
//!     .quota(Quota::new(10, 60.0));
//!
//! let registry = SchemaRegistry::new().with(LIST_WIDGETS);
//! let descriptor = registry.get("ListWidgets").unwrap();
//! assert_eq!(descriptor.resource_path(), "/Widgets/2020-01-01");
//! ```

pub mod catalog;

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Type a parameter value must satisfy on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireType {
    /// Any string.
    String,
    /// A signed integer.
    Int,
    /// An integer `>= 0`.
    NonNegativeInt,
    /// An integer `>= 1`.
    PositiveInt,
    /// An ISO-8601 timestamp in `YYYY-MM-DDTHH:MM:SS.sssZ` form.
    DateTime,
    /// A service type the validator does not understand (e.g. `xs:boolean`).
    ///
    /// Values for these parameters are accepted as-is and a warning is logged.
    Other(&'static str),
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("xs:string"),
            Self::Int => f.write_str("xs:int"),
            Self::NonNegativeInt => f.write_str("xs:nonNegativeInteger"),
            Self::PositiveInt => f.write_str("xs:positiveInteger"),
            Self::DateTime => f.write_str("xs:dateTime"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Inclusive bounds for an integer parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueRange {
    /// Smallest accepted value.
    pub min: i64,
    /// Largest accepted value.
    pub max: i64,
}

/// Describes one parameter an operation accepts.
///
/// When `list_key` is set the caller supplies an array and each element is
/// sent as `{list_key}.1`, `{list_key}.2`, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParameterRule {
    /// Wire type each (element) value must satisfy.
    pub wire_type: WireType,
    /// Whether the caller must supply the parameter.
    pub required: bool,
    /// Closed set of accepted values.
    pub allowed_values: Option<&'static [&'static str]>,
    /// List key template; presence makes the parameter a list.
    pub list_key: Option<&'static str>,
    /// Maximum number of list elements.
    pub list_max: Option<usize>,
    /// Inclusive integer bounds.
    pub range: Option<ValueRange>,
}

impl ParameterRule {
    /// Creates an optional rule of the given type.
    #[must_use]
    pub const fn new(wire_type: WireType) -> Self {
        Self {
            wire_type,
            required: false,
            allowed_values: None,
            list_key: None,
            list_max: None,
            range: None,
        }
    }

    /// Optional string parameter.
    #[must_use]
    pub const fn string() -> Self {
        Self::new(WireType::String)
    }

    /// Optional integer parameter.
    #[must_use]
    pub const fn int() -> Self {
        Self::new(WireType::Int)
    }

    /// Optional date-time parameter.
    #[must_use]
    pub const fn date_time() -> Self {
        Self::new(WireType::DateTime)
    }

    /// Marks the parameter as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restricts values to a closed set.
    #[must_use]
    pub const fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.allowed_values = Some(values);
        self
    }

    /// Makes the parameter a list expanded under `key`.
    #[must_use]
    pub const fn list(mut self, key: &'static str) -> Self {
        self.list_key = Some(key);
        self
    }

    /// Caps the number of list elements.
    #[must_use]
    pub const fn list_max(mut self, max: usize) -> Self {
        self.list_max = Some(max);
        self
    }

    /// Restricts integer values to `min..=max`.
    #[must_use]
    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.range = Some(ValueRange { min, max });
        self
    }

    /// Returns `true` if the parameter is a list.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        self.list_key.is_some()
    }
}

/// An API section. Fixes the resource path and protocol version of every
/// operation in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Category {
    /// Category name, e.g. `Orders`.
    pub name: &'static str,
    /// Resource path, e.g. `/Orders/2013-09-01`.
    pub path: &'static str,
    /// Protocol version sent as the `Version` parameter.
    pub version: &'static str,
}

impl Category {
    /// Creates a category.
    #[must_use]
    pub const fn new(name: &'static str, path: &'static str, version: &'static str) -> Self {
        Self {
            name,
            path,
            version,
        }
    }
}

/// Throttling quota the service enforces for one operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quota {
    /// Maximum request burst (bucket size).
    pub max_in_flight: u32,
    /// Number of quota units restored per hour.
    pub restore_rate_per_hour: f64,
}

impl Quota {
    /// Creates a quota.
    #[must_use]
    pub const fn new(max_in_flight: u32, restore_rate_per_hour: f64) -> Self {
        Self {
            max_in_flight,
            restore_rate_per_hour,
        }
    }

    /// Returns `false` when the restore rate cannot be used for timing:
    /// not a positive finite number, or so small that the restore interval
    /// does not fit in a [`Duration`].
    ///
    /// The burst size plays no part; a zero burst is admitted one call at
    /// a time.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.restore_rate_per_hour.is_finite()
            && self.restore_rate_per_hour > 0.0
            && Duration::try_from_secs_f64(3600.0 / self.restore_rate_per_hour).is_ok()
    }

    /// Wait applied after a throttled response, before the safety margin:
    /// `60 / restore_rate_per_hour` seconds.
    ///
    /// Saturates at [`Duration::MAX`] when the quota is not usable.
    #[must_use]
    pub fn throttle_wait(&self) -> Duration {
        Duration::try_from_secs_f64(60.0 / self.restore_rate_per_hour).unwrap_or(Duration::MAX)
    }

    /// Time the service needs to restore a single quota unit.
    ///
    /// Saturates at [`Duration::MAX`] when the quota is not usable.
    #[must_use]
    pub fn restore_interval(&self) -> Duration {
        Duration::try_from_secs_f64(3600.0 / self.restore_rate_per_hour).unwrap_or(Duration::MAX)
    }
}

/// Parameter schema: parameter name paired with its rule.
pub type ParameterSchema = &'static [(&'static str, ParameterRule)];

/// Static description of one remote operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OperationDescriptor {
    /// Operation name, sent as the `Action` parameter.
    pub name: &'static str,
    /// Category the operation belongs to.
    pub category: Category,
    /// Accepted parameters; `None` skips validation entirely.
    pub parameters: Option<ParameterSchema>,
    /// Throttling quota, if known.
    pub quota: Option<Quota>,
}

impl OperationDescriptor {
    /// Creates a descriptor with no parameter schema and no quota.
    #[must_use]
    pub const fn new(name: &'static str, category: Category) -> Self {
        Self {
            name,
            category,
            parameters: None,
            quota: None,
        }
    }

    /// Sets the parameter schema.
    #[must_use]
    pub const fn parameters(mut self, parameters: ParameterSchema) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Sets the quota.
    #[must_use]
    pub const fn quota(mut self, quota: Quota) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Returns the resource path requests are posted to.
    #[must_use]
    pub const fn resource_path(&self) -> &'static str {
        self.category.path
    }

    /// Returns the protocol version.
    #[must_use]
    pub const fn protocol_version(&self) -> &'static str {
        self.category.version
    }

    /// Returns the quota when it is usable for timing.
    #[must_use]
    pub fn usable_quota(&self) -> Option<Quota> {
        self.quota.filter(Quota::is_usable)
    }
}

/// Read-only map from operation name to descriptor.
///
/// Built once at start-up and shared by reference (usually in an `Arc`)
/// between the dispatcher and any domain helpers.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    operations: HashMap<&'static str, OperationDescriptor>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in [`catalog`].
    #[must_use]
    pub fn builtin() -> Self {
        catalog::ALL
            .iter()
            .flat_map(|table| table.iter().copied())
            .fold(Self::new(), Self::with)
    }

    /// Adds (or replaces) a descriptor.
    #[must_use]
    pub fn with(mut self, descriptor: OperationDescriptor) -> Self {
        self.operations.insert(descriptor.name, descriptor);
        self
    }

    /// Looks up a descriptor by operation name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations.get(name)
    }

    /// Returns `true` if the operation is known.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Returns the number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if no operation is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns the registered operation names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.operations.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST: Category = Category::new("Test", "/Test/2020-01-01", "2020-01-01");

    #[test]
    fn test_rule_builders_compose() {
        let rule = ParameterRule::string()
            .required()
            .one_of(&["A", "B"])
            .list("Thing.Id")
            .list_max(3);

        assert_eq!(rule.wire_type, WireType::String);
        assert!(rule.required);
        assert!(rule.is_list());
        assert_eq!(rule.list_key, Some("Thing.Id"));
        assert_eq!(rule.list_max, Some(3));
        assert_eq!(rule.allowed_values, Some(&["A", "B"][..]));
    }

    #[test]
    fn test_quota_wait_math() {
        let quota = Quota::new(6, 60.0);
        assert_eq!(quota.throttle_wait(), Duration::from_secs(1));
        assert_eq!(quota.restore_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_unusable_quota_is_filtered() {
        let descriptor = OperationDescriptor::new("Op", TEST).quota(Quota::new(5, 0.0));
        assert!(descriptor.usable_quota().is_none());

        let descriptor = OperationDescriptor::new("Op", TEST).quota(Quota::new(5, 1e-20));
        assert!(descriptor.usable_quota().is_none());

        let descriptor = OperationDescriptor::new("Op", TEST).quota(Quota::new(5, f64::NAN));
        assert!(descriptor.usable_quota().is_none());
    }

    #[test]
    fn test_zero_burst_quota_is_still_usable() {
        let descriptor = OperationDescriptor::new("Op", TEST).quota(Quota::new(0, 60.0));
        assert_eq!(descriptor.usable_quota(), Some(Quota::new(0, 60.0)));
    }

    #[test]
    fn test_wait_math_saturates_instead_of_panicking() {
        assert_eq!(Quota::new(1, 1e-20).throttle_wait(), Duration::MAX);
        assert_eq!(Quota::new(1, 1e-20).restore_interval(), Duration::MAX);
        assert_eq!(Quota::new(1, -5.0).throttle_wait(), Duration::MAX);
        assert_eq!(Quota::new(1, 0.0).restore_interval(), Duration::MAX);
    }

    #[test]
    fn test_registry_lookup_and_replace() {
        let registry = SchemaRegistry::new()
            .with(OperationDescriptor::new("Op", TEST))
            .with(OperationDescriptor::new("Op", TEST).quota(Quota::new(1, 1.0)));

        assert_eq!(registry.len(), 1);
        assert!(registry.get("Op").unwrap().quota.is_some());
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn test_builtin_registry_is_populated() {
        let registry = SchemaRegistry::builtin();
        assert!(!registry.is_empty());
        assert!(registry.contains("ListOrders"));
        assert!(registry.contains("RequestReport"));

        let names = registry.names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_wire_type_display() {
        assert_eq!(WireType::DateTime.to_string(), "xs:dateTime");
        assert_eq!(WireType::Other("xs:boolean").to_string(), "xs:boolean");
    }
}
