use winnow::prelude::*;
use winnow::ascii::{space0, space1};
use winnow::combinator::{alt, delimited, opt, preceded, separated};
use winnow::token::take_while;

use crate::er_ast::*;
use crate::error::Error;

/// Which relationship edge line shape the classifier accepts.
///
/// The two shapes overlap token-for-token, so only one of them is ever tried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgeGrammar {
    /// `Rel A (1) TOTAL -- (N) PARTIAL B`
    #[default]
    Full,
    /// `A (1) -- (N) B`
    Simplified,
}

impl std::str::FromStr for EdgeGrammar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(EdgeGrammar::Full),
            "simplified" | "simple" => Ok(EdgeGrammar::Simplified),
            _ => Err(Error::UnknownEdgeGrammar(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IgnoredLine {
    pub line_number: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDiagram {
    pub diagram: ErDiagram,
    pub ignored: Vec<IgnoredLine>,
}

pub fn parse_er(input: &str, grammar: EdgeGrammar) -> ParsedDiagram {
    let mut diagram = ErDiagram::default();
    let mut ignored = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match classify(line, grammar) {
            Some((rule, parsed)) => {
                tracing::trace!(line_number, rule, "classified line");
                apply(&mut diagram, parsed);
            }
            None => {
                tracing::debug!(line_number, text = line, "ignoring unrecognized line");
                ignored.push(IgnoredLine {
                    line_number,
                    text: line.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        entities = diagram.entities.len(),
        relationships = diagram.relationships.len(),
        attributes = diagram.attributes.len(),
        composites = diagram.composites.len(),
        generalizations = diagram.generalizations.len(),
        edges = diagram.edges.len(),
        ignored = ignored.len(),
        "parsed ER diagram"
    );

    ParsedDiagram { diagram, ignored }
}

#[derive(Debug, Clone, PartialEq)]
enum ErLine {
    Color(ColorChannel, String),
    Isa(IsaGroup),
    Entity(Entity),
    Relationship(Relationship),
    Composite(CompositeAttribute),
    Attribute(Attribute),
    Edge(RelationshipEdge),
}

type Rule = fn(&mut &str) -> winnow::Result<ErLine>;

// Order matters: the first rule that consumes the whole line wins.
const DECLARATION_RULES: [(&str, Rule); 8] = [
    ("color", color_line),
    ("isa", isa_line),
    ("weak entity", weak_entity_line),
    ("entity", entity_line),
    ("identifying relationship", identifying_relationship_line),
    ("relationship", relationship_line),
    ("composite", composite_line),
    ("attribute", attribute_line),
];

fn edge_rule(grammar: EdgeGrammar) -> (&'static str, Rule) {
    match grammar {
        EdgeGrammar::Full => ("edge", full_edge_line as Rule),
        EdgeGrammar::Simplified => ("simplified edge", simplified_edge_line as Rule),
    }
}

fn classify(line: &str, grammar: EdgeGrammar) -> Option<(&'static str, ErLine)> {
    DECLARATION_RULES
        .into_iter()
        .chain(std::iter::once(edge_rule(grammar)))
        .find_map(|(name, mut rule)| rule.parse(line).ok().map(|parsed| (name, parsed)))
}

fn apply(diagram: &mut ErDiagram, line: ErLine) {
    match line {
        ErLine::Color(channel, color) => diagram
            .theme
            .get_or_insert_with(ColorTheme::default)
            .set(channel, color),
        ErLine::Isa(group) => diagram.generalizations.push(group),
        ErLine::Entity(entity) => {
            diagram.entities.insert(entity.name.clone(), entity);
        }
        ErLine::Relationship(rel) => {
            diagram.relationships.insert(rel.name.clone(), rel);
        }
        ErLine::Composite(composite) => diagram.composites.push(composite),
        ErLine::Attribute(attr) => diagram.attributes.push(attr),
        ErLine::Edge(edge) => diagram.edges.push(edge),
    }
}

fn identifier<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)
}

fn color_line(input: &mut &str) -> winnow::Result<ErLine> {
    let channel = alt((
        "weak_entities".value(ColorChannel::WeakEntities),
        "entities".value(ColorChannel::Entities),
        "relationships".value(ColorChannel::Relationships),
    ))
    .parse_next(input)?;
    (space0, ":", space0).parse_next(input)?;
    let digits = hex_digits.parse_next(input)?;
    Ok(ErLine::Color(channel, format!("#{digits}")))
}

fn hex_digits<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    preceded('#', take_while(1.., |c: char| c.is_ascii_hexdigit()))
        .verify(|digits: &str| matches!(digits.len(), 3 | 6))
        .parse_next(input)
}

fn isa_line(input: &mut &str) -> winnow::Result<ErLine> {
    ("ISA", space1).parse_next(input)?;
    let super_entity = identifier.parse_next(input)?;
    space0.parse_next(input)?;
    let subs: Vec<&str> = delimited(
        ('{', space0),
        separated(1.., identifier, (space0, ',', space0)),
        (space0, '}'),
    )
    .parse_next(input)?;

    Ok(ErLine::Isa(IsaGroup {
        super_entity: super_entity.to_string(),
        sub_entities: subs.into_iter().map(str::to_string).collect(),
    }))
}

fn weak_entity_line(input: &mut &str) -> winnow::Result<ErLine> {
    ("weak", space1, "entity", space1).parse_next(input)?;
    let name = identifier.parse_next(input)?;
    Ok(ErLine::Entity(Entity {
        name: name.to_string(),
        weak: true,
    }))
}

fn entity_line(input: &mut &str) -> winnow::Result<ErLine> {
    ("entity", space1).parse_next(input)?;
    let name = identifier.parse_next(input)?;
    Ok(ErLine::Entity(Entity {
        name: name.to_string(),
        weak: false,
    }))
}

fn identifying_relationship_line(input: &mut &str) -> winnow::Result<ErLine> {
    ("identifying", space1, "relationship", space1).parse_next(input)?;
    let name = identifier.parse_next(input)?;
    Ok(ErLine::Relationship(Relationship {
        name: name.to_string(),
        identifying: true,
    }))
}

fn relationship_line(input: &mut &str) -> winnow::Result<ErLine> {
    ("relationship", space1).parse_next(input)?;
    let name = identifier.parse_next(input)?;
    Ok(ErLine::Relationship(Relationship {
        name: name.to_string(),
        identifying: false,
    }))
}

fn composite_line(input: &mut &str) -> winnow::Result<ErLine> {
    ("composite", space1).parse_next(input)?;
    let owner = identifier.parse_next(input)?;
    space1.parse_next(input)?;
    let name = identifier.parse_next(input)?;
    space0.parse_next(input)?;
    let parts = delimited('{', take_while(1.., |c: char| c != '}'), '}')
        .verify_map(composite_parts)
        .parse_next(input)?;

    Ok(ErLine::Composite(CompositeAttribute {
        owner: owner.to_string(),
        name: name.to_string(),
        parts,
    }))
}

/// Splits a brace body on commas; any empty part rejects the whole list.
fn composite_parts(body: &str) -> Option<Vec<String>> {
    body.split(',')
        .map(|part| {
            let part = part.trim();
            (!part.is_empty()).then(|| part.to_string())
        })
        .collect()
}

fn attribute_line(input: &mut &str) -> winnow::Result<ErLine> {
    ("attribute", space1).parse_next(input)?;
    let owner = identifier.parse_next(input)?;
    space1.parse_next(input)?;
    let name = identifier.parse_next(input)?;
    let kind = opt(preceded(space1, attribute_kind)).parse_next(input)?;

    Ok(ErLine::Attribute(Attribute {
        owner: owner.to_string(),
        name: name.to_string(),
        kind: kind.unwrap_or(AttributeKind::Plain),
    }))
}

fn attribute_kind(input: &mut &str) -> winnow::Result<AttributeKind> {
    alt((
        "PK".value(AttributeKind::PrimaryKey),
        "MULTI".value(AttributeKind::MultiValued),
        "DERIVED".value(AttributeKind::Derived),
    ))
    .parse_next(input)
}

fn cardinality(input: &mut &str) -> winnow::Result<Cardinality> {
    delimited(
        '(',
        alt((
            "1".value(Cardinality::One),
            "N".value(Cardinality::N),
            "M".value(Cardinality::M),
        )),
        ')',
    )
    .parse_next(input)
}

fn participation(input: &mut &str) -> winnow::Result<Participation> {
    alt((
        "TOTAL".value(Participation::Total),
        "PARTIAL".value(Participation::Partial),
    ))
    .parse_next(input)
}

fn full_edge_line(input: &mut &str) -> winnow::Result<ErLine> {
    let relationship = identifier.parse_next(input)?;
    space1.parse_next(input)?;
    let from = identifier.parse_next(input)?;
    space1.parse_next(input)?;
    let from_card = cardinality.parse_next(input)?;
    space1.parse_next(input)?;
    let from_part = participation.parse_next(input)?;
    (space1, "--", space1).parse_next(input)?;
    let to_card = cardinality.parse_next(input)?;
    space1.parse_next(input)?;
    let to_part = participation.parse_next(input)?;
    space1.parse_next(input)?;
    let to = identifier.parse_next(input)?;

    Ok(ErLine::Edge(RelationshipEdge {
        relationship: Some(relationship.to_string()),
        from: endpoint(from, from_card, Some(from_part)),
        to: endpoint(to, to_card, Some(to_part)),
    }))
}

fn simplified_edge_line(input: &mut &str) -> winnow::Result<ErLine> {
    let from = identifier.parse_next(input)?;
    space1.parse_next(input)?;
    let from_card = cardinality.parse_next(input)?;
    (space1, "--", space1).parse_next(input)?;
    let to_card = cardinality.parse_next(input)?;
    space1.parse_next(input)?;
    let to = identifier.parse_next(input)?;

    Ok(ErLine::Edge(RelationshipEdge {
        relationship: None,
        from: endpoint(from, from_card, None),
        to: endpoint(to, to_card, None),
    }))
}

fn endpoint(entity: &str, cardinality: Cardinality, participation: Option<Participation>) -> Endpoint {
    Endpoint {
        entity: entity.to_string(),
        cardinality,
        participation,
    }
}
