//! Handler signature validation

use crate::error::{Error, Result};
use crate::reflect::{FnInfo, Shape, TypeInfo};

const PARAMS: usize = 2;
const RESULTS: usize = 2;

/// Check `(context, *Req) -> (*Res, error)` and return the request and
/// response record types.
pub(super) fn check(f: &FnInfo) -> Result<(&TypeInfo, &TypeInfo)> {
    if f.inputs.len() != PARAMS {
        return Err(Error::bad_value("parameter number", f.inputs.len(), PARAMS));
    }
    if f.outputs.len() != RESULTS {
        return Err(Error::bad_value("result number", f.outputs.len(), RESULTS));
    }

    let (ctx, request) = (&f.inputs[0], &f.inputs[1]);
    let (response, err) = (&f.outputs[0], &f.outputs[1]);

    if ctx.shape != Shape::Context {
        return Err(Error::bad_type(ctx, "context"));
    }
    let request = record_pointer(request)?;
    let response = record_pointer(response)?;
    if err.shape != Shape::Error {
        return Err(Error::bad_type(err, "error"));
    }
    Ok((request, response))
}

fn record_pointer(ty: &TypeInfo) -> Result<&TypeInfo> {
    let Shape::Pointer(inner) = &ty.shape else {
        return Err(Error::bad_type(ty, "*record"));
    };
    match inner.shape {
        Shape::Pointer(_) => Err(Error::SinglePointerRequired(ty.to_string())),
        Shape::Record(_) => Ok(inner),
        _ => Err(Error::bad_type(ty, "*record")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Reflect;

    fn req() -> TypeInfo {
        TypeInfo::record("Req", "github.com/acme/api")
    }

    fn base() -> FnInfo {
        FnInfo::new("github.com/acme/api.Handle")
    }

    #[test]
    fn test_canonical_shape_passes() {
        let f = base()
            .input(TypeInfo::context())
            .input(TypeInfo::pointer(req()))
            .output(TypeInfo::pointer(req()))
            .output(TypeInfo::error());
        let (request, response) = check(&f).unwrap();
        assert_eq!(request.name, "Req");
        assert_eq!(response.name, "Req");
    }

    #[test]
    fn test_result_count() {
        let f = base()
            .input(TypeInfo::context())
            .input(TypeInfo::pointer(req()))
            .output(TypeInfo::error());
        let err = check(&f).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"incorrect "result number": "1", required: "2""#
        );
    }

    #[test]
    fn test_first_param_must_be_context() {
        let f = base()
            .input(String::type_info())
            .input(TypeInfo::pointer(req()))
            .output(TypeInfo::pointer(req()))
            .output(TypeInfo::error());
        assert!(matches!(check(&f), Err(Error::BadType { .. })));
    }

    #[test]
    fn test_request_must_be_record_pointer() {
        let by_value = base()
            .input(TypeInfo::context())
            .input(req())
            .output(TypeInfo::pointer(req()))
            .output(TypeInfo::error());
        assert!(matches!(check(&by_value), Err(Error::BadType { .. })));

        let scalar = base()
            .input(TypeInfo::context())
            .input(TypeInfo::pointer(String::type_info()))
            .output(TypeInfo::pointer(req()))
            .output(TypeInfo::error());
        assert!(matches!(check(&scalar), Err(Error::BadType { .. })));
    }

    #[test]
    fn test_double_pointer_rejected() {
        let f = base()
            .input(TypeInfo::context())
            .input(TypeInfo::pointer(req()))
            .output(TypeInfo::pointer(TypeInfo::pointer(req())))
            .output(TypeInfo::error());
        assert!(matches!(check(&f), Err(Error::SinglePointerRequired(_))));
    }

    #[test]
    fn test_last_result_must_be_error() {
        let f = base()
            .input(TypeInfo::context())
            .input(TypeInfo::pointer(req()))
            .output(TypeInfo::pointer(req()))
            .output(bool::type_info());
        let err = check(&f).unwrap_err();
        assert_eq!(err.to_string(), r#"incorrect type: "bool", required: "error""#);
    }
}
