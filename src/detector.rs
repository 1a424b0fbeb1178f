use crate::syntax::{FuncDecl, TypeExpr};
use log::trace;

/// Marker swag requires in every documented handler.
pub const ROUTER_MARKER: &str = "@Router";

/// Handler classifier.
///
/// A function is a handler when it is a method on a type whose name contains `Handler`
/// and takes a `*X.Context` parameter (for example `*gin.Context`).
pub struct HandlerDetector;

/// A recognized handler method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerDescriptor {
    /// Method name, e.g. `GetUser`
    pub name: String,
    /// Receiver type name without pointer, e.g. `UserHandler`
    pub receiver: String,
    /// The attached doc comment already contains `@Router`
    pub documented: bool,
}

impl HandlerDetector {
    /// Classifies a function declaration, returning `None` for anything that is not a handler.
    ///
    /// # Example
    ///
    /// ```
    /// use swag_from_source::detector::HandlerDetector;
    /// use swag_from_source::syntax::parse_source;
    ///
    /// let file = parse_source("package h\nfunc (h *UserHandler) GetUser(c *gin.Context) {}\n").unwrap();
    /// let handler = HandlerDetector::classify(file.funcs().next().unwrap()).unwrap();
    /// assert_eq!(handler.receiver, "UserHandler");
    /// assert!(!handler.documented);
    /// ```
    pub fn classify(func: &FuncDecl) -> Option<HandlerDescriptor> {
        let recv = func.recv.as_ref()?;
        if recv.iter().map(|f| f.arity()).sum::<usize>() != 1 {
            trace!("{}: receiver count is not one", func.name);
            return None;
        }

        let receiver = recv[0].ty.base_name()?;
        if !receiver.contains("Handler") {
            trace!("{}: receiver {} is not a handler type", func.name, receiver);
            return None;
        }

        if !func.params.iter().any(|p| Self::is_context_pointer(&p.ty)) {
            trace!("{}: no *Context parameter", func.name);
            return None;
        }

        let documented = func
            .doc
            .as_ref()
            .map_or(false, |doc| doc.text().contains(ROUTER_MARKER));

        Some(HandlerDescriptor {
            name: func.name.clone(),
            receiver: receiver.to_string(),
            documented,
        })
    }

    fn is_context_pointer(ty: &TypeExpr) -> bool {
        match ty {
            TypeExpr::Pointer(inner) => matches!(
                inner.as_ref(),
                TypeExpr::Selector { name, .. } if name == "Context"
            ),
            _ => false,
        }
    }
}
