use crate::er_ast::*;
use crate::error::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    LeftRight,
    TopDown,
}

impl std::str::FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LR" => Ok(Direction::LeftRight),
            "TB" | "TD" => Ok(Direction::TopDown),
            _ => Err(Error::UnknownDirection(s.to_string())),
        }
    }
}

impl Direction {
    fn rankdir(self) -> &'static str {
        match self {
            Direction::LeftRight => "LR",
            Direction::TopDown => "TB",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub direction: Direction,
}

const TOTAL_PENWIDTH: u32 = 3;
const PARTIAL_PENWIDTH: u32 = 1;
const ID_SEPARATOR: &str = "_";

struct Dot {
    out: String,
}

impl Dot {
    fn new(direction: Direction) -> Self {
        let mut out = String::from("digraph ER {\n");
        out.push_str(&format!(
            "  graph [rankdir={}, splines=true, nodesep=1.1, overlap=false];\n",
            direction.rankdir()
        ));
        out.push_str("  node [fontname=\"Helvetica\"];\n");
        out.push_str("  edge [arrowhead=none];\n");
        Self { out }
    }

    fn node(&mut self, id: &str, attrs: &[String]) {
        self.out.push_str(&format!("  {} [{}];\n", quote(id), attrs.join(", ")));
    }

    fn edge(&mut self, from: &str, to: &str, attrs: &[String]) {
        if attrs.is_empty() {
            self.out.push_str(&format!("  {} -> {};\n", quote(from), quote(to)));
        } else {
            self.out.push_str(&format!(
                "  {} -> {} [{}];\n",
                quote(from),
                quote(to),
                attrs.join(", ")
            ));
        }
    }

    fn finish(mut self) -> String {
        self.out.push_str("}\n");
        self.out
    }
}

/// Emits the diagram as a Graphviz DOT document.
///
/// Sections always appear in the same order: entities, relationships,
/// attributes, composites, generalizations, then relationship edges.
pub fn render(diagram: &ErDiagram, options: &RenderOptions) -> String {
    let mut dot = Dot::new(options.direction);
    let theme = diagram.theme.as_ref();

    for entity in diagram.entities.values() {
        let mut attrs = vec!["shape=rectangle".to_string()];
        if entity.weak {
            attrs.push("peripheries=2".to_string());
        }
        if let Some(theme) = theme {
            let color = if entity.weak {
                &theme.weak_entity
            } else {
                &theme.entity
            };
            attrs.push(fill(color));
        }
        dot.node(&entity.name, &attrs);
    }

    for rel in diagram.relationships.values() {
        let mut attrs = vec!["shape=diamond".to_string()];
        if rel.identifying {
            attrs.push("peripheries=2".to_string());
        }
        if let Some(theme) = theme {
            attrs.push(fill(&theme.relationship));
        }
        dot.node(&rel.name, &attrs);
    }

    for attr in &diagram.attributes {
        let id = node_id(&[attr.owner.as_str(), attr.name.as_str()]);
        dot.node(&id, &attribute_attrs(attr));
        dot.edge(&attr.owner, &id, &[]);
    }

    for composite in &diagram.composites {
        let root = node_id(&[composite.owner.as_str(), composite.name.as_str()]);
        dot.node(&root, &ellipse(&composite.name));
        dot.edge(&composite.owner, &root, &[]);
        for part in &composite.parts {
            let part_id = node_id(&[composite.owner.as_str(), composite.name.as_str(), part.as_str()]);
            dot.node(&part_id, &ellipse(part));
            dot.edge(&root, &part_id, &[]);
        }
    }

    for (index, group) in diagram.generalizations.iter().enumerate() {
        let triangle = node_id(&[group.super_entity.as_str(), "ISA", index.to_string().as_str()]);
        dot.node(
            &triangle,
            &["shape=triangle".to_string(), format!("label={}", quote("ISA"))],
        );
        dot.edge(&group.super_entity, &triangle, &[]);
        for sub in &group.sub_entities {
            dot.edge(&triangle, sub, &[]);
        }
    }

    for edge in &diagram.edges {
        match &edge.relationship {
            Some(rel) => {
                for end in [&edge.from, &edge.to] {
                    dot.edge(
                        rel,
                        &end.entity,
                        &[
                            format!("label={}", quote(end.cardinality.token())),
                            format!("penwidth={}", penwidth(end)),
                        ],
                    );
                }
            }
            None => dot.edge(
                &edge.from.entity,
                &edge.to.entity,
                &[
                    format!("taillabel={}", quote(edge.from.cardinality.token())),
                    format!("headlabel={}", quote(edge.to.cardinality.token())),
                    format!("penwidth={}", penwidth(&edge.from).max(penwidth(&edge.to))),
                ],
            ),
        }
    }

    dot.finish()
}

fn attribute_attrs(attr: &Attribute) -> Vec<String> {
    match attr.kind {
        AttributeKind::Plain => ellipse(&attr.name),
        AttributeKind::PrimaryKey => vec![
            "shape=ellipse".to_string(),
            format!("label=<<u>{}</u>>", html_escape(&attr.name)),
        ],
        AttributeKind::MultiValued => {
            let mut attrs = ellipse(&attr.name);
            attrs.push("peripheries=2".to_string());
            attrs
        }
        AttributeKind::Derived => {
            let mut attrs = ellipse(&attr.name);
            attrs.push("style=dashed".to_string());
            attrs
        }
    }
}

fn ellipse(label: &str) -> Vec<String> {
    vec!["shape=ellipse".to_string(), format!("label={}", quote(label))]
}

fn fill(color: &str) -> String {
    format!("style=filled, fillcolor={}", quote(color))
}

fn penwidth(end: &Endpoint) -> u32 {
    if end.is_total() {
        TOTAL_PENWIDTH
    } else {
        PARTIAL_PENWIDTH
    }
}

fn node_id(segments: &[&str]) -> String {
    segments.join(ID_SEPARATOR)
}

/// Quotes a DOT ID, escaping backslashes and double quotes.
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn body(output: &str) -> Vec<&str> {
        output
            .lines()
            .skip(4)
            .filter(|l| *l != "}")
            .map(str::trim)
            .collect()
    }

    fn diagram_with_entity(name: &str, weak: bool) -> ErDiagram {
        let mut diagram = ErDiagram::default();
        diagram.entities.insert(
            name.to_string(),
            Entity {
                name: name.to_string(),
                weak,
            },
        );
        diagram
    }

    #[test]
    fn render_empty_diagram_header() {
        let output = render(&ErDiagram::default(), &RenderOptions::default());
        let expected = "\
digraph ER {
  graph [rankdir=LR, splines=true, nodesep=1.1, overlap=false];
  node [fontname=\"Helvetica\"];
  edge [arrowhead=none];
}
";
        assert_eq!(output, expected);
    }

    #[test]
    fn direction_from_str() {
        assert_eq!("lr".parse::<Direction>().unwrap(), Direction::LeftRight);
        assert_eq!("TD".parse::<Direction>().unwrap(), Direction::TopDown);
        assert!("RL".parse::<Direction>().is_err());
    }

    #[test]
    fn render_top_down_direction() {
        let options = RenderOptions {
            direction: Direction::TopDown,
        };
        let output = render(&ErDiagram::default(), &options);
        assert!(output.contains("rankdir=TB"));
    }

    #[test]
    fn render_weak_entity_with_theme() {
        let mut diagram = diagram_with_entity("Dependent", true);
        diagram.theme = Some(ColorTheme::default());
        let output = render(&diagram, &RenderOptions::default());
        assert_eq!(
            body(&output),
            vec![format!(
                "\"Dependent\" [shape=rectangle, peripheries=2, style=filled, fillcolor=\"{DEFAULT_WEAK_ENTITY_COLOR}\"];"
            )]
        );
    }

    #[test]
    fn render_entity_without_theme_is_unfilled() {
        let output = render(&diagram_with_entity("Student", false), &RenderOptions::default());
        assert_eq!(body(&output), vec!["\"Student\" [shape=rectangle];"]);
    }

    #[test]
    fn render_attribute_kinds() {
        let mut diagram = ErDiagram::default();
        for (name, kind) in [
            ("name", AttributeKind::Plain),
            ("id", AttributeKind::PrimaryKey),
            ("phone", AttributeKind::MultiValued),
            ("age", AttributeKind::Derived),
        ] {
            diagram.attributes.push(Attribute {
                owner: "S".into(),
                name: name.into(),
                kind,
            });
        }
        let output = render(&diagram, &RenderOptions::default());
        assert_eq!(
            body(&output),
            vec![
                "\"S_name\" [shape=ellipse, label=\"name\"];",
                "\"S\" -> \"S_name\";",
                "\"S_id\" [shape=ellipse, label=<<u>id</u>>];",
                "\"S\" -> \"S_id\";",
                "\"S_phone\" [shape=ellipse, label=\"phone\", peripheries=2];",
                "\"S\" -> \"S_phone\";",
                "\"S_age\" [shape=ellipse, label=\"age\", style=dashed];",
                "\"S\" -> \"S_age\";",
            ]
        );
    }

    #[test]
    fn render_generalization_fan() {
        let mut diagram = ErDiagram::default();
        diagram.generalizations.push(IsaGroup {
            super_entity: "Person".into(),
            sub_entities: vec!["Student".into(), "Teacher".into()],
        });
        let output = render(&diagram, &RenderOptions::default());
        assert_eq!(
            body(&output),
            vec![
                "\"Person_ISA_0\" [shape=triangle, label=\"ISA\"];",
                "\"Person\" -> \"Person_ISA_0\";",
                "\"Person_ISA_0\" -> \"Student\";",
                "\"Person_ISA_0\" -> \"Teacher\";",
            ]
        );
    }

    #[test]
    fn render_simplified_edge() {
        let mut diagram = ErDiagram::default();
        diagram.edges.push(RelationshipEdge {
            relationship: None,
            from: Endpoint {
                entity: "A".into(),
                cardinality: Cardinality::One,
                participation: None,
            },
            to: Endpoint {
                entity: "B".into(),
                cardinality: Cardinality::M,
                participation: None,
            },
        });
        let output = render(&diagram, &RenderOptions::default());
        assert_eq!(
            body(&output),
            vec!["\"A\" -> \"B\" [taillabel=\"1\", headlabel=\"M\", penwidth=1];"]
        );
    }

    #[test]
    fn quote_escapes_grammar_characters() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
        assert_eq!(quote("{ x }"), "\"{ x }\"");
    }

    #[test]
    fn html_escape_markup_characters() {
        assert_eq!(html_escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
