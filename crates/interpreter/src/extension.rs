use crate::{Arguments, Context, FieldValue, ResolverError, ResolverResult};

/// Outcome of [`FieldExtension::before`].
pub enum ExtensionFlow {
    /// Keep going with the same object.
    Continue,
    /// Keep going, resolving the field against another object.
    ContinueWith(FieldValue),
    /// Skip the remaining extensions and the resolver, this is the field's value.
    Return(FieldValue),
}

/// Wraps the resolution of a field.
///
/// `before` runs in registration order ahead of the resolver and may rewrite the arguments.
/// `after` runs in the same order once the resolved value is known, lazy values included, but
/// only for the extensions whose `before` let the resolution continue.
pub trait FieldExtension: Send + Sync + 'static {
    fn before(
        &self,
        object: &FieldValue,
        arguments: &mut Arguments,
        ctx: &Context,
    ) -> Result<ExtensionFlow, ResolverError> {
        let _ = (object, arguments, ctx);
        Ok(ExtensionFlow::Continue)
    }

    fn after(&self, value: FieldValue, arguments: &Arguments, ctx: &Context) -> ResolverResult {
        let _ = (arguments, ctx);
        Ok(value)
    }
}
