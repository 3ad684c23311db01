use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relationship {
    /// Directed: source is the parent, target is the child.
    Parent,
    Partner,
    Divorced,
    /// Used by filtered views only, never as a hierarchy signal.
    Sibling,
}

impl Relationship {
    /// Partner and Divorced collapse into one undirected relation.
    pub fn is_partnership(self) -> bool {
        matches!(self, Self::Partner | Self::Divorced)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partners: Option<Vec<String>>,
    /// Domain attributes (names, dates, notes) carried through untouched.
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl PersonData {
    pub fn parents(&self) -> &[String] {
        self.parents.as_deref().unwrap_or_default()
    }

    pub fn children(&self) -> &[String] {
        self.children.as_deref().unwrap_or_default()
    }

    pub fn partners(&self) -> &[String] {
        self.partners.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonNode {
    pub id: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: PersonData,
}

impl PersonNode {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            position: Position::default(),
            data: PersonData::default(),
        }
    }

    pub fn at(id: &str, x: f32, y: f32) -> Self {
        Self {
            position: Position::new(x, y),
            ..Self::new(id)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    pub relationship: Relationship,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_marriage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_divorce: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EdgeData>,
    /// Connector port on the source node, see `handles`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
}

impl RelationshipEdge {
    pub fn new(source: &str, target: &str, relationship: Relationship) -> Self {
        Self {
            id: format!("{source}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
            data: Some(EdgeData {
                relationship,
                date_of_marriage: None,
                date_of_divorce: None,
            }),
            source_handle: None,
        }
    }

    pub fn parent(parent: &str, child: &str) -> Self {
        Self::new(parent, child, Relationship::Parent)
    }

    pub fn partner(a: &str, b: &str) -> Self {
        Self::new(a, b, Relationship::Partner)
    }

    /// Edges without data carry no relationship and are ignored everywhere.
    pub fn relationship(&self) -> Option<Relationship> {
        self.data.as_ref().map(|data| data.relationship)
    }

    pub fn is_parent(&self) -> bool {
        self.relationship() == Some(Relationship::Parent)
    }

    pub fn is_partnership(&self) -> bool {
        self.relationship().is_some_and(Relationship::is_partnership)
    }

    /// True if the edge joins `a` and `b`, ignoring direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyGraph {
    #[serde(default)]
    pub nodes: Vec<PersonNode>,
    #[serde(default)]
    pub edges: Vec<RelationshipEdge>,
}

impl FamilyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&PersonNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn ensure_node(&mut self, id: &str) -> &mut PersonNode {
        let idx = match self.nodes.iter().position(|node| node.id == id) {
            Some(idx) => idx,
            None => {
                self.nodes.push(PersonNode::new(id));
                self.nodes.len() - 1
            }
        };
        &mut self.nodes[idx]
    }

    pub fn add_edge(&mut self, edge: RelationshipEdge) {
        self.ensure_node(&edge.source);
        self.ensure_node(&edge.target);
        self.edges.push(edge);
    }
}
