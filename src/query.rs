//! Query descriptors and the type matcher every scanner defers to.

use crate::error::Error;
use crate::model::TypeRef;

/// Parsed `<package-path>.<object>[.<selector>]` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Type or function name, never empty.
    pub object_name: String,
    /// Import path of the defining package, e.g. `encoding/json`.
    pub package_path: String,
    /// Field or method name; empty to match the object itself.
    pub selector_name: String,
}

impl Descriptor {
    /// Parse a query string.
    ///
    /// The package path may contain `/`; only its last segment is split on
    /// `.`, so `golang.org/x/tools/go/loader.Config` yields the package
    /// `golang.org/x/tools/go/loader` and the object `Config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedQuery` if the last path segment has fewer than
    /// two dot-separated parts or the object name is empty.
    pub fn parse(query: &str) -> Result<Self, Error> {
        let (dir, last) = match query.rsplit_once('/') {
            Some((dir, last)) => (Some(dir), last),
            None => (None, query),
        };

        let mut names = last.split('.');
        let package_name = names.next().unwrap_or_default();
        let Some(object_name) = names.next() else {
            return Err(Error::MalformedQuery {
                query: query.to_string(),
                reason: "expected <package>.<name>[.<selector>]",
            });
        };
        if object_name.is_empty() {
            return Err(Error::MalformedQuery {
                query: query.to_string(),
                reason: "empty object name",
            });
        }
        let selector_name = names.next().unwrap_or_default();

        let package_path = match dir {
            Some(dir) => format!("{dir}/{package_name}"),
            None => package_name.to_string(),
        };

        return Ok(Self {
            object_name: object_name.to_string(),
            package_path,
            selector_name: selector_name.to_string(),
        });
    }

    /// Whether the query names a field or method rather than the object itself.
    pub fn has_selector(&self) -> bool {
        return !self.selector_name.is_empty();
    }

    /// Decide whether a resolved type, reached through `selector`, is the target.
    ///
    /// `selector` must equal the descriptor's selector exactly; pass `""` for
    /// plain identifiers. Pointer indirection is stripped before comparing.
    /// Universe-scope types such as `error` have no package and never match.
    pub fn matches(&self, ty: &TypeRef, selector: &str) -> bool {
        if selector != self.selector_name {
            return false;
        }

        let mut ty = ty;
        while let TypeRef::Pointer { elem } = ty {
            ty = elem.as_ref();
        }

        return match ty {
            TypeRef::Named { name, package: Some(package) } => {
                *package == self.package_path && *name == self.object_name
            },
            TypeRef::Named { package: None, .. }
            | TypeRef::Basic { .. }
            | TypeRef::Other { .. }
            | TypeRef::Pointer { .. } => false,
        };
    }

    /// Whether a function or method declared as `package.name` is the target
    /// itself. The selector plays no part: `net/http.Client.Do` also names a
    /// callable `net/http.Client`.
    pub fn names_callable(&self, package: Option<&str>, name: &str) -> bool {
        return package == Some(self.package_path.as_str()) && name == self.object_name;
    }
}

impl std::fmt::Display for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.package_path, self.object_name)?;
        if self.has_selector() {
            write!(f, ".{}", self.selector_name)?;
        }
        return Ok(());
    }
}
