use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErDiagram {
    pub entities: IndexMap<String, Entity>,
    pub relationships: IndexMap<String, Relationship>,
    pub attributes: Vec<Attribute>,
    pub composites: Vec<CompositeAttribute>,
    pub generalizations: Vec<IsaGroup>,
    pub edges: Vec<RelationshipEdge>,
    pub theme: Option<ColorTheme>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    pub weak: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub name: String,
    pub identifying: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub owner: String,
    pub name: String,
    pub kind: AttributeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Plain,
    PrimaryKey,
    MultiValued,
    Derived,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeAttribute {
    pub owner: String,
    pub name: String,
    pub parts: Vec<String>,
}

/// Generalization of `super_entity` into `sub_entities`.
#[derive(Debug, Clone, PartialEq)]
pub struct IsaGroup {
    pub super_entity: String,
    pub sub_entities: Vec<String>,
}

/// Connects two entities, either through a named relationship diamond or
/// directly when the simplified edge grammar is in use.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipEdge {
    pub relationship: Option<String>,
    pub from: Endpoint,
    pub to: Endpoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub entity: String,
    pub cardinality: Cardinality,
    pub participation: Option<Participation>,
}

impl Endpoint {
    pub fn is_total(&self) -> bool {
        self.participation == Some(Participation::Total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    N,
    M,
}

impl Cardinality {
    pub fn token(self) -> &'static str {
        match self {
            Cardinality::One => "1",
            Cardinality::N => "N",
            Cardinality::M => "M",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participation {
    Total,
    Partial,
}

pub const DEFAULT_ENTITY_COLOR: &str = "#DDEEFF";
pub const DEFAULT_WEAK_ENTITY_COLOR: &str = "#E8DDFF";
pub const DEFAULT_RELATIONSHIP_COLOR: &str = "#FFF2CC";

#[derive(Debug, Clone, PartialEq)]
pub struct ColorTheme {
    pub entity: String,
    pub weak_entity: String,
    pub relationship: String,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            entity: DEFAULT_ENTITY_COLOR.to_string(),
            weak_entity: DEFAULT_WEAK_ENTITY_COLOR.to_string(),
            relationship: DEFAULT_RELATIONSHIP_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChannel {
    Entities,
    WeakEntities,
    Relationships,
}

impl ColorTheme {
    pub fn set(&mut self, channel: ColorChannel, color: String) {
        match channel {
            ColorChannel::Entities => self.entity = color,
            ColorChannel::WeakEntities => self.weak_entity = color,
            ColorChannel::Relationships => self.relationship = color,
        }
    }
}
