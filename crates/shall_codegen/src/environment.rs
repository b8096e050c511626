//! Lexical scopes, stored in an arena and addressed by [ScopeId]

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// An index into an [Environment]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(usize);

impl ScopeId {
    /// The scope every environment starts with
    pub const GLOBAL: ScopeId = ScopeId(0);
}

impl Display for ScopeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

#[derive(Debug)]
struct Scope<B> {
    name: String,
    parent: Option<ScopeId>,
    bindings: HashMap<String, B>,
    retired: bool,
}

/// A tree of scopes. Each scope maps names to bindings of type `B`.
///
/// Scopes are never removed, only retired, so a [ScopeId] stays valid for the lifetime of the
/// environment. A parent always has a smaller index than its children.
#[derive(Debug)]
pub struct Environment<B> {
    scopes: Vec<Scope<B>>,
}

impl<B> Environment<B> {
    /// Creates an environment containing only the global scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                name: "global".to_string(),
                parent: None,
                bindings: HashMap::new(),
                retired: false,
            }],
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId::GLOBAL
    }

    /// Creates a new child scope of `parent`
    pub fn push_scope(&mut self, parent: ScopeId, name: impl Into<String>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            name: name.into(),
            parent: Some(parent),
            bindings: HashMap::new(),
            retired: false,
        });
        id
    }

    /// Marks a scope as finished. Its bindings remain visible to lookups made from it.
    pub fn retire(&mut self, scope: ScopeId) {
        self.scopes[scope.0].retired = true;
    }

    pub fn is_retired(&self, scope: ScopeId) -> bool {
        self.scopes[scope.0].retired
    }

    /// Binds `name` in `scope`, replacing any binding of the same name in that scope only.
    pub fn define(&mut self, scope: ScopeId, name: impl Into<String>, binding: B) -> &B {
        let scope = &mut self.scopes[scope.0];
        debug_assert!(!scope.retired, "defining into retired scope {:?}", scope.name);
        match scope.bindings.entry(name.into()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(binding);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(binding),
        }
    }

    /// Finds a binding in `scope` or the nearest ancestor that has one.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &B)> {
        self.ancestors(scope).find_map(|id| {
            self.scopes[id.0]
                .bindings
                .get(name)
                .map(|binding| (id, binding))
        })
    }

    /// Finds a binding in `scope` only
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&B> {
        self.scopes[scope.0].bindings.get(name)
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0].parent
    }

    pub fn name(&self, scope: ScopeId) -> &str {
        &self.scopes[scope.0].name
    }

    /// Iterates from `scope` up to the global scope, inclusive
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), |&id| self.parent(id))
    }

    /// The direct children of `scope`, in creation order
    pub fn children(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        self.scopes
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.parent == Some(scope))
            .map(|(index, _)| ScopeId(index))
    }
}

impl<B> Default for Environment<B> {
    fn default() -> Self {
        Self::new()
    }
}
