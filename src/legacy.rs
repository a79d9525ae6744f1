//! Token-stream symbol extraction, used when a module has no semantic artifact.
//!
//! Names are the literal identifier text: no resolution and no qualification
//! beyond what the source spelled out.

use std::path::Path;

use crate::error::Error;
use crate::lexer::{QUALIFIED_VAR_ID, Token, TokenKind, VAR_ID};
use crate::types::{LocatedSym, ModuleName, Package, SymName};

/// Whether the token survives the identifier filter.
pub const fn is_identifier_token(token: &Token) -> bool {
    return matches!(token.kind, TokenKind::VarId | TokenKind::QVarId);
}

/// Literal name of an identifier token.
///
/// # Errors
///
/// Returns `Error::InternalInvariant` if the token is not identifier-shaped
/// or its text does not match its kind. Either means the lexer and this
/// filter disagree; it is never caused by input.
pub fn identifier_text(token: &Token) -> Result<SymName, Error> {
    let pattern = match token.kind {
        TokenKind::VarId => &VAR_ID,
        TokenKind::QVarId => &QUALIFIED_VAR_ID,
        other => {
            return Err(Error::InternalInvariant {
                detail: format!("{other:?} token `{}` reached identifier extraction", token.text),
                invariant: "identifier_token_kind",
            });
        },
    };

    if !pattern.is_match(&token.text) {
        return Err(Error::InternalInvariant {
            detail: format!("{:?} token text `{}` is not an identifier", token.kind, token.text),
            invariant: "identifier_token_text",
        });
    }
    return Ok(SymName(token.text.clone()));
}

/// Located symbols for every lower-case identifier token, in token order.
///
/// The file is derived from `component_root` and `module`, not from the
/// tokens.
///
/// # Errors
///
/// Returns `Error::InternalInvariant` from [`identifier_text`].
pub fn extract_from_tokens(
    package: &Package,
    component_root: &Path,
    module: &ModuleName,
    extension: &str,
    tokens: &[Token],
) -> Result<Vec<LocatedSym>, Error> {
    let file = component_root.join(module.to_relative_path(extension));

    return tokens
        .iter()
        .filter(|token| return is_identifier_token(token))
        .map(|token| {
            return Ok(LocatedSym {
                file: file.clone(),
                name: identifier_text(token)?,
                package: package.clone(),
                span: token.span.clone(),
            });
        })
        .collect();
}
