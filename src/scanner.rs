//! Plane scanners and the collector that fans their matches in.
//!
//! Each checked package gets one scanner task per binding plane, run on the
//! rayon pool. All scanners share a single unbounded channel; one collector
//! thread drains it.

use std::thread;

use crossbeam_channel::Sender;
use tracing::debug;

use crate::model::{CompositeLiteral, Node, Object, Package, Program};
use crate::query::Descriptor;
use crate::types::Match;

/// One category of resolved bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// Fields and keyed or positional elements of composite literals.
    CompositeLiterals,
    /// Identifiers introducing new bindings.
    Definitions,
    /// `x.f` selector expressions.
    Selections,
    /// Identifiers referring to existing declarations.
    Uses,
}

impl Plane {
    /// Planes to scan for a descriptor. Composite literals only carry
    /// information for field queries.
    pub fn for_descriptor(descriptor: &Descriptor) -> Vec<Self> {
        let mut planes = vec![Self::Selections, Self::Uses, Self::Definitions];
        if descriptor.has_selector() {
            planes.push(Self::CompositeLiterals);
        }
        return planes;
    }

    /// Candidate nodes in `package` that satisfy `descriptor`.
    pub fn candidates<'a>(self, package: &'a Package, descriptor: &Descriptor) -> Vec<&'a Node> {
        return match self {
            Self::CompositeLiterals => package
                .literals
                .iter()
                .filter_map(|lit| return literal_field_node(lit, descriptor))
                .collect(),
            Self::Definitions => package
                .defs
                .iter()
                .filter(|def| {
                    return def
                        .object
                        .as_ref()
                        .and_then(Object::ty)
                        .is_some_and(|ty| return descriptor.matches(ty, ""));
                })
                .map(|def| return &def.ident)
                .collect(),
            Self::Selections => package
                .selections
                .iter()
                .filter(|sel| return descriptor.matches(&sel.recv, sel.member.name()))
                .map(|sel| return &sel.sel)
                .collect(),
            Self::Uses => package
                .uses
                .iter()
                .filter(|u| return use_matches(&u.object, descriptor))
                .map(|u| return &u.ident)
                .collect(),
        };
    }

    /// Resolve this plane's candidates to positions and push them to the collector.
    fn scan(self, package: &Package, descriptor: &Descriptor, tx: &Sender<Match>) {
        let mut sent = 0_usize;
        for node in self.candidates(package, descriptor) {
            let Some(found) = package.locate(node) else {
                debug!(package = %package.path, ?node, "node outside package files");
                continue;
            };
            if tx.send(found).is_err() {
                return;
            }
            sent = sent.saturating_add(1);
        }
        debug!(package = %package.path, plane = ?self, sent, "plane scanned");
    }
}

/// Decide a use binding. Type names are skipped so `&T{...}` is not reported
/// as a use of `T`. A function named exactly by the descriptor matches on its
/// declaration alone; everything else goes through the type matcher.
fn use_matches(object: &Object, descriptor: &Descriptor) -> bool {
    return match object {
        Object::TypeName { .. } => false,
        Object::Func { name, package, .. }
            if descriptor.names_callable(package.as_deref(), name) =>
        {
            true
        },
        other => other.ty().is_some_and(|ty| return descriptor.matches(ty, "")),
    };
}

/// Find the element of a struct literal that sets the queried field.
///
/// Keyed literals yield the key identifier. Positional literals must list
/// every field, and yield the element at the field's index. Anything else,
/// including mixed shapes, yields nothing.
fn literal_field_node<'a>(lit: &'a CompositeLiteral, descriptor: &Descriptor) -> Option<&'a Node> {
    let first = lit.elements.first()?;
    if !descriptor.matches(&lit.ty, &descriptor.selector_name) {
        return None;
    }
    let fields = lit.fields.as_ref()?;
    let selector = descriptor.selector_name.as_str();

    if first.key.is_some() {
        let mut keys = Vec::with_capacity(lit.elements.len());
        for element in &lit.elements {
            keys.push(element.key.as_ref()?);
        }
        return keys.into_iter().find(|k| return k.name == selector).map(|k| return &k.node);
    }

    if lit.elements.iter().any(|e| return e.key.is_some()) || lit.elements.len() != fields.len() {
        return None;
    }
    let index = fields.iter().position(|f| return f == selector)?;
    return lit.elements.get(index).map(|e| return &e.value);
}

/// Scan every checked package on every relevant plane concurrently and
/// return the matches in arrival order.
///
/// Scanners run as tasks on the rayon pool, so the number of OS threads stays
/// bounded however many packages are loaded. The rayon scope returns only
/// after every scanner finished, so once the channel is closed the collector
/// has seen every match.
pub fn collect(program: &Program, descriptor: &Descriptor) -> Vec<Match> {
    let planes = Plane::for_descriptor(descriptor);

    return thread::scope(|scope| {
        let (tx, rx) = crossbeam_channel::unbounded::<Match>();
        let collector = scope.spawn(move || return rx.iter().collect::<Vec<Match>>());

        rayon::scope(|pool| {
            for package in program.checked() {
                for &plane in &planes {
                    let tx = tx.clone();
                    pool.spawn(move |_| plane.scan(package, descriptor, &tx));
                }
            }
        });
        drop(tx);

        return match collector.join() {
            Ok(matches) => matches,
            Err(panic) => std::panic::resume_unwind(panic),
        };
    });
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::model::{Def, Element, Key, Member, Selection, TypeRef, Use};

    fn node(offset: u32, length: u32) -> Node {
        return Node { column: offset.saturating_add(1), file: 0, length, line: 1, offset };
    }

    fn named(package: &str, name: &str) -> TypeRef {
        return TypeRef::Named { name: name.to_string(), package: Some(package.to_string()) };
    }

    fn pointer(elem: TypeRef) -> TypeRef {
        return TypeRef::Pointer { elem: Box::new(elem) };
    }

    fn var(name: &str, ty: TypeRef) -> Object {
        return Object::Var { name: name.to_string(), ty };
    }

    fn package() -> Package {
        return Package {
            files: vec![PathBuf::from("/go/src/example/main.go")],
            name: "main".to_string(),
            path: "example".to_string(),
            ..Package::default()
        };
    }

    fn ast_package_literal(elements: Vec<Element>) -> CompositeLiteral {
        return CompositeLiteral {
            elements,
            fields: Some(vec![
                "Name".to_string(),
                "Scope".to_string(),
                "Imports".to_string(),
                "Files".to_string(),
            ]),
            node: node(0, 40),
            ty: named("go/ast", "Package"),
        };
    }

    fn positional(offsets: &[u32]) -> Vec<Element> {
        return offsets.iter().map(|&o| return Element { key: None, value: node(o, 3) }).collect();
    }

    #[test]
    fn selection_emits_trailing_identifier() {
        let mut pkg = package();
        pkg.selections.push(Selection {
            expr: node(0, 25),
            member: Member::Method { name: "Encode".to_string() },
            recv: pointer(named("encoding/json", "Encoder")),
            sel: node(19, 6),
        });
        pkg.selections.push(Selection {
            expr: node(30, 10),
            member: Member::Method { name: "SetIndent".to_string() },
            recv: pointer(named("encoding/json", "Encoder")),
            sel: node(34, 9),
        });

        let d = Descriptor::parse("encoding/json.Encoder.Encode").unwrap();
        let found = Plane::Selections.candidates(&pkg, &d);
        assert_eq!(found, vec![&node(19, 6)]);
    }

    #[test]
    fn uses_skip_type_names() {
        let mut pkg = package();
        let client = named("net/http", "Client");
        pkg.uses.push(Use {
            ident: node(1, 6),
            object: Object::TypeName { name: "Client".to_string(), ty: client.clone() },
        });
        pkg.uses.push(Use { ident: node(20, 1), object: var("c", pointer(client)) });

        let d = Descriptor::parse("net/http.Client").unwrap();
        assert_eq!(Plane::Uses.candidates(&pkg, &d), vec![&node(20, 1)]);
    }

    #[test]
    fn uses_match_callable_by_name() {
        let mut pkg = package();
        pkg.uses.push(Use {
            ident: node(5, 3),
            object: Object::Func {
                name: "Get".to_string(),
                package: Some("net/http".to_string()),
                ty: TypeRef::Other { repr: "func(url string) (*Response, error)".to_string() },
            },
        });

        let d = Descriptor::parse("net/http.Get").unwrap();
        assert_eq!(Plane::Uses.candidates(&pkg, &d), vec![&node(5, 3)]);

        let other = Descriptor::parse("net/http.Head").unwrap();
        assert!(Plane::Uses.candidates(&pkg, &other).is_empty());
    }

    #[test]
    fn definitions_skip_missing_objects() {
        let mut pkg = package();
        pkg.defs.push(Def { ident: node(0, 4), object: None });
        pkg.defs.push(Def {
            ident: node(10, 13),
            object: Some(var("DefaultClient", pointer(named("net/http", "Client")))),
        });

        let d = Descriptor::parse("net/http.Client").unwrap();
        assert_eq!(Plane::Definitions.candidates(&pkg, &d), vec![&node(10, 13)]);
    }

    #[test]
    fn positional_literal_yields_field_element() {
        let mut pkg = package();
        pkg.literals.push(ast_package_literal(positional(&[13, 22, 32, 41])));

        let d = Descriptor::parse("go/ast.Package.Imports").unwrap();
        assert_eq!(Plane::CompositeLiterals.candidates(&pkg, &d), vec![&node(32, 3)]);
    }

    #[test]
    fn positional_literal_requires_every_field() {
        let mut pkg = package();
        pkg.literals.push(ast_package_literal(positional(&[13, 22, 32])));

        let d = Descriptor::parse("go/ast.Package.Imports").unwrap();
        assert!(Plane::CompositeLiterals.candidates(&pkg, &d).is_empty());
    }

    #[test]
    fn keyed_literal_yields_key() {
        let mut pkg = package();
        let key = |name: &str, offset: u32| {
            return Some(Key { name: name.to_string(), node: node(offset, 7) });
        };
        pkg.literals.push(ast_package_literal(vec![
            Element { key: key("Name", 13), value: node(19, 3) },
            Element { key: key("Imports", 25), value: node(34, 7) },
        ]));

        let d = Descriptor::parse("go/ast.Package.Imports").unwrap();
        assert_eq!(Plane::CompositeLiterals.candidates(&pkg, &d), vec![&node(25, 7)]);
    }

    #[test]
    fn non_struct_literal_is_skipped() {
        let mut pkg = package();
        let mut lit = ast_package_literal(positional(&[13, 22, 32, 41]));
        lit.fields = None;
        pkg.literals.push(lit);

        let d = Descriptor::parse("go/ast.Package.Imports").unwrap();
        assert!(Plane::CompositeLiterals.candidates(&pkg, &d).is_empty());
    }

    #[test]
    fn literal_plane_only_runs_for_selectors() {
        let plain = Descriptor::parse("go/ast.Package").unwrap();
        assert!(!Plane::for_descriptor(&plain).contains(&Plane::CompositeLiterals));

        let field = Descriptor::parse("go/ast.Package.Imports").unwrap();
        assert!(Plane::for_descriptor(&field).contains(&Plane::CompositeLiterals));
    }

    #[test]
    fn collect_gathers_all_packages_and_skips_failed_ones() {
        let client = pointer(named("net/http", "Client"));
        let mut first = package();
        first.defs.push(Def { ident: node(0, 1), object: Some(var("a", client.clone())) });
        let mut second = package();
        second.path = "example/two".to_string();
        second.files = vec![PathBuf::from("/go/src/example/two/two.go")];
        second.uses.push(Use { ident: node(7, 1), object: var("b", client.clone()) });
        let mut broken = package();
        broken.errors.push("undefined: q".to_string());
        broken.defs.push(Def { ident: node(3, 1), object: Some(var("c", client)) });

        let program = Program { packages: vec![first, second, broken] };
        let d = Descriptor::parse("net/http.Client").unwrap();
        let mut found = collect(&program, &d);
        found.sort();

        let files: Vec<PathBuf> = found.iter().map(|m| m.filename.clone()).collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/go/src/example/main.go"),
                PathBuf::from("/go/src/example/two/two.go"),
            ]
        );
    }

    #[test]
    fn field_selection_matches_only_the_queried_field() {
        let mut pkg = package();
        let client = pointer(named("net/http", "Client"));
        pkg.selections.push(Selection {
            expr: node(1, 9),
            member: Member::Field { name: "Timeout".to_string() },
            recv: client.clone(),
            sel: node(3, 7),
        });
        pkg.selections.push(Selection {
            expr: node(20, 11),
            member: Member::Field { name: "Transport".to_string() },
            recv: client,
            sel: node(22, 9),
        });

        let d = Descriptor::parse("net/http.Client.Timeout").unwrap();
        assert_eq!(Plane::Selections.candidates(&pkg, &d), vec![&node(3, 7)]);

        let plain = Descriptor::parse("net/http.Client").unwrap();
        assert!(Plane::Selections.candidates(&pkg, &plain).is_empty());
    }

    #[test]
    fn callable_bypass_ignores_selector() {
        let mut pkg = package();
        pkg.uses.push(Use {
            ident: node(4, 6),
            object: Object::Func {
                name: "Client".to_string(),
                package: Some("net/http".to_string()),
                ty: TypeRef::Other { repr: "func() *Client".to_string() },
            },
        });

        let d = Descriptor::parse("net/http.Client.Do").unwrap();
        assert_eq!(Plane::Uses.candidates(&pkg, &d), vec![&node(4, 6)]);
    }

    #[test]
    fn collect_handles_more_packages_than_threads() {
        let client = pointer(named("net/http", "Client"));
        let packages: Vec<Package> = (0..3000_u32)
            .map(|i| {
                let mut pkg = package();
                pkg.path = format!("example/p{i}");
                if i % 100 == 0 {
                    pkg.defs.push(Def { ident: node(i, 1), object: Some(var("c", client.clone())) });
                }
                pkg
            })
            .collect();

        let program = Program { packages };
        let d = Descriptor::parse("net/http.Client").unwrap();
        assert_eq!(collect(&program, &d).len(), 30);
    }
}
