//! Semantic model of type-checked packages, as dumped by the Go type checker.
//!
//! Every binding plane the scanners walk is a flat list here. Types and
//! objects are closed sum types so the matcher and the scanners can dispatch
//! with exhaustive matches instead of runtime kind checks.

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::Match;

/// A syntax node reduced to what the position resolver needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Node {
    /// One-based byte column.
    pub column: u32,
    /// Index into the owning package's `files`.
    pub file: u32,
    /// Byte length of the node's source text.
    pub length: u32,
    /// One-based line number.
    pub line: u32,
    /// Byte offset from the start of the file.
    pub offset: u32,
}

/// A resolved static type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// Predeclared basic type such as `int` or `string`.
    Basic {
        /// Type name.
        #[expect(dead_code, reason = "part of the facts schema, kept for debug output")]
        name: String,
    },
    /// Defined type. `package` is `None` for universe-scope types like `error`.
    Named {
        /// Type name.
        name: String,
        /// Import path of the declaring package.
        #[serde(default)]
        package: Option<String>,
    },
    /// Any other type constructor (slice, map, signature, ...). The matcher
    /// never looks inside these.
    Other {
        /// Printed form, kept for debugging output.
        #[expect(dead_code, reason = "part of the facts schema, kept for debug output")]
        repr: String,
    },
    /// `*elem`.
    Pointer {
        /// Pointed-to type.
        elem: Box<TypeRef>,
    },
}

/// The declared entity an identifier resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Object {
    /// Builtin function such as `len`.
    Builtin {
        /// Builtin name.
        #[expect(dead_code, reason = "part of the facts schema, kept for debug output")]
        name: String,
    },
    /// Named constant.
    Const {
        /// Constant name.
        #[expect(dead_code, reason = "part of the facts schema, kept for debug output")]
        name: String,
        /// Constant type.
        ty: TypeRef,
    },
    /// Function or method.
    Func {
        /// Function or method name.
        name: String,
        /// Import path of the declaring package.
        #[serde(default)]
        package: Option<String>,
        /// Signature type.
        ty: TypeRef,
    },
    /// Statement label.
    Label {
        /// Label name.
        #[expect(dead_code, reason = "part of the facts schema, kept for debug output")]
        name: String,
    },
    /// The predeclared `nil`.
    Nil,
    /// Imported package name.
    PkgName {
        /// Local package name.
        #[expect(dead_code, reason = "part of the facts schema, kept for debug output")]
        name: String,
    },
    /// Type name, including uses of a type in expressions like `&T{}`.
    TypeName {
        /// Type name.
        #[expect(dead_code, reason = "part of the facts schema, kept for debug output")]
        name: String,
        /// The named type itself.
        ty: TypeRef,
    },
    /// Variable, parameter, result or struct field.
    Var {
        /// Variable name.
        #[expect(dead_code, reason = "part of the facts schema, kept for debug output")]
        name: String,
        /// Declared type.
        ty: TypeRef,
    },
}

impl Object {
    /// The object's type, if the type checker assigns it one.
    /// Package names, labels, builtins and `nil` have none worth matching.
    pub const fn ty(&self) -> Option<&TypeRef> {
        return match self {
            Self::Const { ty, .. }
            | Self::Func { ty, .. }
            | Self::TypeName { ty, .. }
            | Self::Var { ty, .. } => Some(ty),
            Self::Builtin { .. } | Self::Label { .. } | Self::Nil | Self::PkgName { .. } => None,
        };
    }
}

/// The member picked by a selector expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Member {
    /// Struct field, possibly promoted through embedding.
    Field {
        /// Field name.
        name: String,
    },
    /// Method, possibly promoted.
    Method {
        /// Method name.
        name: String,
    },
}

impl Member {
    /// Declared name of the selected member.
    pub fn name(&self) -> &str {
        return match self {
            Self::Field { name } | Self::Method { name } => name,
        };
    }
}

/// A resolved `x.f` selector expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Selection {
    /// The whole selector expression.
    pub expr: Node,
    /// The selected member.
    pub member: Member,
    /// Type of the receiver `x`.
    pub recv: TypeRef,
    /// The trailing identifier `f`.
    pub sel: Node,
}

/// An identifier that refers to an existing declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Use {
    /// The identifier.
    pub ident: Node,
    /// What it refers to.
    pub object: Object,
}

/// An identifier that introduces a binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Def {
    /// The identifier.
    pub ident: Node,
    /// The declared object. `None` for package clauses and symbolic
    /// type-switch variables.
    #[serde(default)]
    pub object: Option<Object>,
}

/// Key of a `key: value` element in a composite literal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Key {
    /// The key identifier's text.
    pub name: String,
    /// The key identifier.
    pub node: Node,
}

/// One element of a composite literal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Element {
    /// Present for `key: value` elements.
    #[serde(default)]
    pub key: Option<Key>,
    /// The value expression.
    pub value: Node,
}

/// A composite literal expression and its static type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompositeLiteral {
    /// Elements in source order.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Field names of the underlying struct type in declaration order, or
    /// `None` when the underlying type is not a struct.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    /// The literal expression.
    pub node: Node,
    /// Static type of the literal.
    pub ty: TypeRef,
}

/// One type-checked package with all four binding planes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Package {
    /// Identifier definitions.
    #[serde(default)]
    pub defs: Vec<Def>,
    /// Type-checking errors; a non-empty list excludes the package from scanning.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Source files; `Node::file` indexes this list.
    pub files: Vec<PathBuf>,
    /// Composite literal expressions.
    #[serde(default)]
    pub literals: Vec<CompositeLiteral>,
    /// Package name.
    #[serde(default)]
    pub name: String,
    /// Import path.
    pub path: String,
    /// Selector expressions.
    #[serde(default)]
    pub selections: Vec<Selection>,
    /// Identifier uses.
    #[serde(default)]
    pub uses: Vec<Use>,
}

impl Package {
    /// Whether the type checker accepted this package.
    pub fn is_checked(&self) -> bool {
        return self.errors.is_empty();
    }

    /// Resolve a node to its source position.
    /// Returns `None` if the node names a file this package does not own.
    pub fn locate(&self, node: &Node) -> Option<Match> {
        let index = usize::try_from(node.file).ok()?;
        let filename = self.files.get(index)?.clone();
        return Some(Match {
            column: node.column,
            filename,
            length: node.length,
            line: node.line,
            offset: node.offset,
        });
    }

    /// Every node in every plane, for load-time validation.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        let selections = self.selections.iter().flat_map(|s| return [&s.expr, &s.sel]);
        let uses = self.uses.iter().map(|u| return &u.ident);
        let defs = self.defs.iter().map(|d| return &d.ident);
        let literals = self.literals.iter().flat_map(|l| {
            let elements = l.elements.iter().flat_map(|e| {
                return e.key.as_ref().map(|k| return &k.node).into_iter().chain([&e.value]);
            });
            return std::iter::once(&l.node).chain(elements);
        });
        return selections.chain(uses).chain(defs).chain(literals);
    }
}

/// Everything the front end produced for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Program {
    /// Loaded packages in argument order.
    pub packages: Vec<Package>,
}

impl Program {
    /// Packages that type-checked cleanly.
    pub fn checked(&self) -> impl Iterator<Item = &Package> {
        return self.packages.iter().filter(|p| return p.is_checked());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_types() {
        let json = r#"{"kind":"pointer","elem":{"kind":"named","name":"Client","package":"net/http"}}"#;
        let ty: TypeRef = serde_json::from_str(json).unwrap();
        assert_eq!(
            ty,
            TypeRef::Pointer {
                elem: Box::new(TypeRef::Named {
                    name: "Client".to_string(),
                    package: Some("net/http".to_string()),
                }),
            }
        );
    }

    #[test]
    fn universe_named_type_has_no_package() {
        let ty: TypeRef = serde_json::from_str(r#"{"kind":"named","name":"error"}"#).unwrap();
        assert_eq!(ty, TypeRef::Named { name: "error".to_string(), package: None });
    }

    #[test]
    fn locate_rejects_unknown_file() {
        let package = Package {
            files: vec![PathBuf::from("/src/a.go")],
            path: "a".to_string(),
            ..Package::default()
        };
        let node = Node { column: 1, file: 3, length: 1, line: 1, offset: 0 };
        assert!(package.locate(&node).is_none());
    }

    #[test]
    fn package_with_errors_is_not_checked() {
        let program = Program {
            packages: vec![
                Package { path: "ok".to_string(), ..Package::default() },
                Package {
                    errors: vec!["undefined: x".to_string()],
                    path: "broken".to_string(),
                    ..Package::default()
                },
            ],
        };
        let paths: Vec<&str> = program.checked().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["ok"]);
    }
}
