//! OCCI resource model
//!
//! Minimal serde model for the entities that move between the façade,
//! the adapters, the fixture files and the cache. Rendering OCCI on the
//! wire is the HTTP layer's job.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scheme of the OCCI infrastructure kinds and actions
pub const INFRASTRUCTURE_SCHEME: &str = "http://schemas.ogf.org/occi/infrastructure#";

/// Resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "http://schemas.ogf.org/occi/infrastructure#compute")]
    Compute,
    #[serde(rename = "http://schemas.ogf.org/occi/infrastructure#network")]
    Network,
    #[serde(rename = "http://schemas.ogf.org/occi/infrastructure#storage")]
    Storage,
}

impl Kind {
    pub fn term(&self) -> &'static str {
        match self {
            Kind::Compute => "compute",
            Kind::Network => "network",
            Kind::Storage => "storage",
        }
    }

    /// Attribute carrying the resource's lifecycle state
    pub fn state_attribute(&self) -> &'static str {
        match self {
            Kind::Compute => "occi.compute.state",
            Kind::Network => "occi.network.state",
            Kind::Storage => "occi.storage.state",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.term())
    }
}

/// Link kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    #[serde(rename = "http://schemas.ogf.org/occi/infrastructure#networkinterface")]
    NetworkInterface,
    #[serde(rename = "http://schemas.ogf.org/occi/infrastructure#storagelink")]
    StorageLink,
}

impl LinkKind {
    pub fn term(&self) -> &'static str {
        match self {
            LinkKind::NetworkInterface => "networkinterface",
            LinkKind::StorageLink => "storagelink",
        }
    }

    /// Kind of resource a link of this kind points at
    pub fn target_kind(&self) -> Kind {
        match self {
            LinkKind::NetworkInterface => Kind::Network,
            LinkKind::StorageLink => Kind::Storage,
        }
    }
}

/// Scalar attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

/// Attribute name to scalar value
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Capability or template descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mixin {
    /// Scheme, ending in `#`
    pub scheme: String,
    pub term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Identifiers of mixins this one depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
    /// Default attribute values
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl Mixin {
    pub fn new(scheme: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            term: term.into(),
            title: None,
            depends: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_depends(mut self, identifier: impl Into<String>) -> Self {
        self.depends.push(identifier.into());
        self
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// `scheme#term`
    pub fn identifier(&self) -> String {
        format!("{}{}", self.scheme, self.term)
    }

    fn same_as(&self, other: &Mixin) -> bool {
        self.scheme == other.scheme && self.term == other.term
    }
}

/// Set of mixins without duplicate identifiers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Mixin>", into = "Vec<Mixin>")]
pub struct Mixins(Vec<Mixin>);

impl Mixins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mixin, returns false if one with the same identifier exists
    pub fn insert(&mut self, mixin: Mixin) -> bool {
        if self.contains(&mixin) {
            return false;
        }
        self.0.push(mixin);
        true
    }

    pub fn contains(&self, mixin: &Mixin) -> bool {
        self.0.iter().any(|m| m.same_as(mixin))
    }

    /// True if every mixin of `other` is present here
    pub fn contains_all(&self, other: &Mixins) -> bool {
        other.iter().all(|m| self.contains(m))
    }

    pub fn get_by_term(&self, term: &str) -> Option<&Mixin> {
        self.0.iter().find(|m| m.term == term)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mixin> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Mixin>> for Mixins {
    fn from(mixins: Vec<Mixin>) -> Self {
        mixins.into_iter().collect()
    }
}

impl From<Mixins> for Vec<Mixin> {
    fn from(mixins: Mixins) -> Self {
        mixins.0
    }
}

impl FromIterator<Mixin> for Mixins {
    fn from_iter<I: IntoIterator<Item = Mixin>>(iter: I) -> Self {
        let mut mixins = Mixins::new();
        for mixin in iter {
            mixins.insert(mixin);
        }
        mixins
    }
}

impl<'a> IntoIterator for &'a Mixins {
    type Item = &'a Mixin;
    type IntoIter = std::slice::Iter<'a, Mixin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Action definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub scheme: String,
    pub term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A request to perform an action, with parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInstance {
    pub action: Action,
    #[serde(default)]
    pub attributes: Attributes,
}

impl ActionInstance {
    /// Action instance for an infrastructure action term, e.g. `start`
    pub fn infrastructure(kind: Kind, term: &str) -> Self {
        Self {
            action: Action {
                scheme: format!("http://schemas.ogf.org/occi/infrastructure/{}/action#", kind),
                term: term.to_string(),
                title: None,
            },
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn term(&self) -> &str {
        &self.action.term
    }
}

/// Link between a compute resource and a network or storage resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub id: String,
    pub kind: LinkKind,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Link {
    pub fn new(kind: LinkKind, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            kind,
            source: source.into(),
            target: target.into(),
            attributes: Attributes::new(),
        }
    }
}

/// Compute, network or storage instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: Kind,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub mixins: Mixins,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Resource {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            id: String::new(),
            title: String::new(),
            summary: None,
            attributes: Attributes::new(),
            mixins: Mixins::new(),
            links: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_mixin(mut self, mixin: Mixin) -> Self {
        self.mixins.insert(mixin);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Mixin filter: an absent or empty filter matches everything
    pub fn matches(&self, filter: Option<&Mixins>) -> bool {
        filter.map_or(true, |f| self.mixins.contains_all(f))
    }
}

/// Collection of resources without duplicate identifiers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Resource>", into = "Vec<Resource>")]
pub struct Resources(Vec<Resource>);

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, replacing any with the same identifier
    pub fn insert(&mut self, resource: Resource) {
        match self.0.iter_mut().find(|r| r.id == resource.id) {
            Some(existing) => *existing = resource,
            None => self.0.push(resource),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.0.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Resource> {
        self.0.iter_mut().find(|r| r.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Resource> {
        let index = self.0.iter().position(|r| r.id == id)?;
        Some(self.0.remove(index))
    }

    pub fn retain<F: FnMut(&Resource) -> bool>(&mut self, f: F) {
        self.0.retain(f)
    }

    pub fn ids(&self) -> Vec<String> {
        self.0.iter().map(|r| r.id.clone()).collect()
    }

    /// Resources carrying every mixin of the filter
    pub fn filter(&self, filter: Option<&Mixins>) -> Resources {
        Resources(self.0.iter().filter(|r| r.matches(filter)).cloned().collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Resource> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Resource>> for Resources {
    fn from(resources: Vec<Resource>) -> Self {
        resources.into_iter().collect()
    }
}

impl From<Resources> for Vec<Resource> {
    fn from(resources: Resources) -> Self {
        resources.0
    }
}

impl FromIterator<Resource> for Resources {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        let mut resources = Resources::new();
        for resource in iter {
            resources.insert(resource);
        }
        resources
    }
}

impl<'a> IntoIterator for &'a Resources {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Mixins, actions, resources and links together
///
/// Shape of fixture files and of backend extensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub mixins: Mixins,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Collection {
    pub fn is_empty(&self) -> bool {
        self.mixins.is_empty()
            && self.actions.is_empty()
            && self.resources.is_empty()
            && self.links.is_empty()
    }
}

/// Parsed OCCI entity handed to the façade by the request layer
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Resource(Resource),
    Link(Link),
    Action(ActionInstance),
}

impl Entity {
    /// Short description used in type-mismatch errors
    pub fn describe(&self) -> String {
        match self {
            Entity::Resource(r) => format!("{} resource", r.kind),
            Entity::Link(l) => format!("{} link", l.kind.term()),
            Entity::Action(_) => "action instance".to_string(),
        }
    }
}
