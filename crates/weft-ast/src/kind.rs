//! Node kinds and the portability tier taxonomy

use crate::error::NodeError;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Portability classification of a node
///
/// Informative metadata only: the tree engine never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Tier {
    /// Expressible identically in every target
    Universal = 0,
    /// Needs a target-specific runtime shim (database, HTTP, crypto)
    DomainPrimitive = 1,
    /// Portable but specialized; no current kind uses it
    Specialized = 2,
    /// Opaque target-specific code
    NativeBridge = 3,
}

impl Tier {
    /// All tiers, lowest first
    pub const ALL: [Tier; 4] = [
        Tier::Universal,
        Tier::DomainPrimitive,
        Tier::Specialized,
        Tier::NativeBridge,
    ];

    /// Numeric tier
    #[inline]
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Short label for summaries
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Universal => "universal",
            Self::DomainPrimitive => "domain",
            Self::Specialized => "specialized",
            Self::NativeBridge => "native",
        }
    }
}

impl TryFrom<u8> for Tier {
    type Error = NodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Universal),
            1 => Ok(Self::DomainPrimitive),
            2 => Ok(Self::Specialized),
            3 => Ok(Self::NativeBridge),
            other => Err(NodeError::InvalidTier(u64::from(other))),
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.as_u8()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Broad grouping used by the palette and canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Statement,
    Expression,
    Domain,
    Bridge,
}

/// Closed set of node discriminators
///
/// Serialized as the PascalCase variant name (`"LetStatement"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    // Statements
    LetStatement,
    IfStatement,
    ForStatement,
    WhileStatement,
    ReturnStatement,
    TryCatchStatement,
    ThrowStatement,
    MatchStatement,
    // Expressions
    Literal,
    Identifier,
    BinaryExpression,
    CallExpression,
    MemberExpression,
    ObjectExpression,
    ArrayExpression,
    TemplateLiteral,
    // Domain primitives
    DbQuery,
    DbMutate,
    HttpRespond,
    CtxGet,
    Validate,
    HashPassword,
    SignToken,
    // Escape hatch
    NativeBridge,
}

impl NodeKind {
    /// Every kind, in palette order
    pub const ALL: [NodeKind; 24] = [
        NodeKind::LetStatement,
        NodeKind::IfStatement,
        NodeKind::ForStatement,
        NodeKind::WhileStatement,
        NodeKind::ReturnStatement,
        NodeKind::TryCatchStatement,
        NodeKind::ThrowStatement,
        NodeKind::MatchStatement,
        NodeKind::Literal,
        NodeKind::Identifier,
        NodeKind::BinaryExpression,
        NodeKind::CallExpression,
        NodeKind::MemberExpression,
        NodeKind::ObjectExpression,
        NodeKind::ArrayExpression,
        NodeKind::TemplateLiteral,
        NodeKind::DbQuery,
        NodeKind::DbMutate,
        NodeKind::HttpRespond,
        NodeKind::CtxGet,
        NodeKind::Validate,
        NodeKind::HashPassword,
        NodeKind::SignToken,
        NodeKind::NativeBridge,
    ];

    /// Wire discriminator (`"LetStatement"`)
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::LetStatement => "LetStatement",
            Self::IfStatement => "IfStatement",
            Self::ForStatement => "ForStatement",
            Self::WhileStatement => "WhileStatement",
            Self::ReturnStatement => "ReturnStatement",
            Self::TryCatchStatement => "TryCatchStatement",
            Self::ThrowStatement => "ThrowStatement",
            Self::MatchStatement => "MatchStatement",
            Self::Literal => "Literal",
            Self::Identifier => "Identifier",
            Self::BinaryExpression => "BinaryExpression",
            Self::CallExpression => "CallExpression",
            Self::MemberExpression => "MemberExpression",
            Self::ObjectExpression => "ObjectExpression",
            Self::ArrayExpression => "ArrayExpression",
            Self::TemplateLiteral => "TemplateLiteral",
            Self::DbQuery => "DbQuery",
            Self::DbMutate => "DbMutate",
            Self::HttpRespond => "HttpRespond",
            Self::CtxGet => "CtxGet",
            Self::Validate => "Validate",
            Self::HashPassword => "HashPassword",
            Self::SignToken => "SignToken",
            Self::NativeBridge => "NativeBridge",
        }
    }

    /// Palette shorthand (`"let"`, `"db-query"`)
    #[must_use]
    pub fn short_name(self) -> &'static str {
        match self {
            Self::LetStatement => "let",
            Self::IfStatement => "if",
            Self::ForStatement => "for",
            Self::WhileStatement => "while",
            Self::ReturnStatement => "return",
            Self::TryCatchStatement => "try-catch",
            Self::ThrowStatement => "throw",
            Self::MatchStatement => "match",
            Self::Literal => "literal",
            Self::Identifier => "identifier",
            Self::BinaryExpression => "binary",
            Self::CallExpression => "call",
            Self::MemberExpression => "member",
            Self::ObjectExpression => "object",
            Self::ArrayExpression => "array",
            Self::TemplateLiteral => "template",
            Self::DbQuery => "db-query",
            Self::DbMutate => "db-mutate",
            Self::HttpRespond => "http-respond",
            Self::CtxGet => "ctx-get",
            Self::Validate => "validate",
            Self::HashPassword => "hash-password",
            Self::SignToken => "sign-token",
            Self::NativeBridge => "native-bridge",
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::LetStatement => "Let",
            Self::IfStatement => "If",
            Self::ForStatement => "For Each",
            Self::WhileStatement => "While",
            Self::ReturnStatement => "Return",
            Self::TryCatchStatement => "Try / Catch",
            Self::ThrowStatement => "Throw",
            Self::MatchStatement => "Match",
            Self::Literal => "Literal",
            Self::Identifier => "Identifier",
            Self::BinaryExpression => "Binary",
            Self::CallExpression => "Call",
            Self::MemberExpression => "Member Access",
            Self::ObjectExpression => "Object",
            Self::ArrayExpression => "Array",
            Self::TemplateLiteral => "Template",
            Self::DbQuery => "DB Query",
            Self::DbMutate => "DB Mutate",
            Self::HttpRespond => "HTTP Respond",
            Self::CtxGet => "Context Get",
            Self::Validate => "Validate",
            Self::HashPassword => "Hash Password",
            Self::SignToken => "Sign Token",
            Self::NativeBridge => "Native Bridge",
        }
    }

    /// Portability tier stamped on new nodes of this kind
    #[must_use]
    pub fn tier(self) -> Tier {
        match self.category() {
            Category::Statement | Category::Expression => Tier::Universal,
            Category::Domain => Tier::DomainPrimitive,
            Category::Bridge => Tier::NativeBridge,
        }
    }

    /// Broad grouping
    #[must_use]
    pub fn category(self) -> Category {
        match self {
            Self::LetStatement
            | Self::IfStatement
            | Self::ForStatement
            | Self::WhileStatement
            | Self::ReturnStatement
            | Self::TryCatchStatement
            | Self::ThrowStatement
            | Self::MatchStatement => Category::Statement,
            Self::Literal
            | Self::Identifier
            | Self::BinaryExpression
            | Self::CallExpression
            | Self::MemberExpression
            | Self::ObjectExpression
            | Self::ArrayExpression
            | Self::TemplateLiteral => Category::Expression,
            Self::DbQuery
            | Self::DbMutate
            | Self::HttpRespond
            | Self::CtxGet
            | Self::Validate
            | Self::HashPassword
            | Self::SignToken => Category::Domain,
            Self::NativeBridge => Category::Bridge,
        }
    }

    /// Default fields for a freshly created node
    ///
    /// Container slots start as empty lists and singular children as null.
    #[must_use]
    pub fn template(self) -> Vec<(&'static str, Value)> {
        let empty = || Value::List(im::Vector::new());
        match self {
            Self::LetStatement => vec![
                ("name", Value::from("")),
                ("mutable", Value::Bool(false)),
                ("value", Value::Null),
            ],
            Self::IfStatement => vec![
                ("condition", Value::Null),
                ("body", empty()),
                ("elseBody", empty()),
            ],
            Self::ForStatement => vec![
                ("variable", Value::from("item")),
                ("iterable", Value::Null),
                ("body", empty()),
            ],
            Self::WhileStatement => vec![("condition", Value::Null), ("body", empty())],
            Self::ReturnStatement | Self::ThrowStatement => vec![("value", Value::Null)],
            Self::TryCatchStatement => vec![
                ("tryBody", empty()),
                ("catchParam", Value::from("error")),
                ("catchBody", empty()),
            ],
            Self::MatchStatement => vec![("subject", Value::Null), ("arms", empty())],
            Self::Literal => vec![("value", Value::Null)],
            Self::Identifier => vec![("name", Value::from(""))],
            Self::BinaryExpression => vec![
                ("operator", Value::from("+")),
                ("left", Value::Null),
                ("right", Value::Null),
            ],
            Self::CallExpression => vec![("callee", Value::Null), ("arguments", empty())],
            Self::MemberExpression => vec![
                ("object", Value::Null),
                ("property", Value::from("")),
                ("computed", Value::Bool(false)),
            ],
            Self::ObjectExpression => vec![("properties", empty())],
            Self::ArrayExpression => vec![("elements", empty())],
            Self::TemplateLiteral => vec![
                ("quasis", Value::List(im::vector![Value::from("")])),
                ("expressions", empty()),
            ],
            Self::DbQuery => vec![
                ("model", Value::from("")),
                ("operation", Value::from("findMany")),
                ("filter", Value::Null),
            ],
            Self::DbMutate => vec![
                ("model", Value::from("")),
                ("operation", Value::from("create")),
                ("data", Value::Null),
                ("filter", Value::Null),
            ],
            Self::HttpRespond => vec![("status", Value::from(200_i64)), ("body", Value::Null)],
            Self::CtxGet => vec![("source", Value::from("params")), ("key", Value::from(""))],
            Self::Validate => vec![("schema", Value::from("")), ("input", Value::Null)],
            Self::HashPassword => vec![("input", Value::Null)],
            Self::SignToken => vec![("payload", Value::Null), ("expiresIn", Value::from("1h"))],
            Self::NativeBridge => vec![
                ("language", Value::from("typescript")),
                ("code", Value::from("")),
            ],
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for NodeKind {
    type Err = NodeError;

    /// Accepts the wire discriminator or the palette shorthand
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.type_name() == s || kind.short_name() == s)
            .ok_or_else(|| NodeError::UnknownType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_categories() {
        assert_eq!(NodeKind::LetStatement.tier(), Tier::Universal);
        assert_eq!(NodeKind::TemplateLiteral.tier(), Tier::Universal);
        assert_eq!(NodeKind::DbQuery.tier(), Tier::DomainPrimitive);
        assert_eq!(NodeKind::SignToken.tier(), Tier::DomainPrimitive);
        assert_eq!(NodeKind::NativeBridge.tier(), Tier::NativeBridge);
    }

    #[test]
    fn specialized_tier_is_representable_but_unused() {
        assert_eq!(Tier::try_from(2).unwrap(), Tier::Specialized);
        assert!(NodeKind::ALL.iter().all(|k| k.tier() != Tier::Specialized));
    }

    #[test]
    fn tier_rejects_out_of_range() {
        assert_eq!(Tier::try_from(4), Err(NodeError::InvalidTier(4)));
        assert!(serde_json::from_str::<Tier>("7").is_err());
        assert_eq!(serde_json::from_str::<Tier>("1").unwrap(), Tier::DomainPrimitive);
    }

    #[test]
    fn kind_parses_wire_and_short_names() {
        assert_eq!("LetStatement".parse::<NodeKind>().unwrap(), NodeKind::LetStatement);
        assert_eq!("db-query".parse::<NodeKind>().unwrap(), NodeKind::DbQuery);
        assert_eq!("try-catch".parse::<NodeKind>().unwrap(), NodeKind::TryCatchStatement);
        assert!(matches!(
            "Spaceship".parse::<NodeKind>(),
            Err(NodeError::UnknownType(_))
        ));
    }

    #[test]
    fn wire_names_match_serde() {
        for kind in NodeKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.type_name()));
        }
    }

    #[test]
    fn short_names_are_unique() {
        let mut names: Vec<_> = NodeKind::ALL.iter().map(|k| k.short_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), NodeKind::ALL.len());
    }
}
