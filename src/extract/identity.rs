//! Function identity resolution

use crate::error::{Error, Result};
use crate::ir::{HandlerRef, Receiver};
use crate::reflect::FnIdentity;

/// Turn a registered identity into a [`HandlerRef`]
pub fn resolve_identity(identity: &FnIdentity) -> Result<HandlerRef> {
    match identity {
        FnIdentity::Declared(handler) => {
            if handler.import.is_empty() || handler.name.is_empty() {
                return Err(Error::AnonymousHandler(handler.to_string()));
            }
            Ok(handler.clone())
        }
        FnIdentity::Qualified(name) => parse_qualified_name(name)
            .map_err(|e| e.failed("parse function identifiers from qualified name")),
    }
}

/// Decompose `path/pkg.Func` or `path/pkg.Type.Method[-suffix]`.
///
/// A `(*Type)` receiver marks a pointer receiver. Names without a `/` are
/// anonymous or locally declared and cannot be imported.
pub fn parse_qualified_name(qualified: &str) -> Result<HandlerRef> {
    let Some(slash) = qualified.rfind('/') else {
        return Err(Error::AnonymousHandler(qualified.to_string()));
    };
    let (dir, dotted) = qualified.split_at(slash + 1);

    let idents: Vec<&str> = dotted.split('.').collect();
    let (package, receiver, name) = match idents.as_slice() {
        [package, name] => (*package, None, *name),
        [package, receiver, method] => {
            let name = method.split('-').next().unwrap_or(method);
            (*package, Some(parse_receiver(receiver)), name)
        }
        _ => return Err(Error::InvalidFnName(qualified.to_string()).failed("parse dotted idents")),
    };

    if package.is_empty() || name.is_empty() || receiver.as_ref().is_some_and(|r| r.name.is_empty()) {
        return Err(Error::InvalidFnName(qualified.to_string()).failed("parse dotted idents"));
    }

    Ok(HandlerRef {
        name: name.to_string(),
        import: format!("{}{}", dir, package),
        receiver,
    })
}

fn parse_receiver(raw: &str) -> Receiver {
    match raw.strip_prefix("(*").and_then(|r| r.strip_suffix(')')) {
        Some(name) => Receiver {
            name: name.to_string(),
            pointer: true,
        },
        None => Receiver {
            name: raw.to_string(),
            pointer: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("github.com/acme/users.List", "github.com/acme/users", "List", None)]
    #[case("github.com/acme/users.(*Service).Get", "github.com/acme/users", "Get", Some(("Service", true)))]
    #[case("github.com/acme/users.Service.Get-fm", "github.com/acme/users", "Get", Some(("Service", false)))]
    #[case("github.com/acme/users.(*Service).Delete-fm", "github.com/acme/users", "Delete", Some(("Service", true)))]
    #[case("example.com/mw.Logger", "example.com/mw", "Logger", None)]
    fn test_parse_qualified_name(
        #[case] input: &str,
        #[case] import: &str,
        #[case] name: &str,
        #[case] receiver: Option<(&str, bool)>,
    ) {
        let handler = parse_qualified_name(input).unwrap();
        assert_eq!(handler.import, import);
        assert_eq!(handler.name, name);
        assert_eq!(
            handler.receiver.map(|r| (r.name, r.pointer)),
            receiver.map(|(n, p)| (n.to_string(), p))
        );
    }

    #[rstest]
    #[case("main.func1")]
    #[case("Handler")]
    fn test_anonymous_names_rejected(#[case] input: &str) {
        assert!(matches!(
            parse_qualified_name(input),
            Err(Error::AnonymousHandler(_))
        ));
    }

    #[rstest]
    #[case("github.com/acme/users")]
    #[case("github.com/acme/users.A.B.C")]
    #[case("github.com/acme/users.")]
    fn test_malformed_names_are_internal(#[case] input: &str) {
        let err = parse_qualified_name(input).unwrap_err();
        assert!(matches!(err.root_cause(), Error::InvalidFnName(_)), "{}", err);
    }

    #[test]
    fn test_declared_identity_passes_through() {
        let declared = HandlerRef::method("github.com/acme/users", "Service", false, "List");
        let resolved = resolve_identity(&FnIdentity::Declared(declared.clone())).unwrap();
        assert_eq!(resolved, declared);

        let empty = HandlerRef::function("", "List");
        assert!(matches!(
            resolve_identity(&FnIdentity::Declared(empty)),
            Err(Error::AnonymousHandler(_))
        ));
    }
}
