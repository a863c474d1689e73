use super::ScopeKind;

/// Misuse of the current-scope cursor. Always a generator defect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("scope {scope} is not nested in the current scope")]
    NotNested { scope: u32 },

    #[error("no current scope to invalidate")]
    NoCurrentScope,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("`{name}` is already defined in this {kind} scope")]
    DuplicateDefinition { name: String, kind: ScopeKind },
}
