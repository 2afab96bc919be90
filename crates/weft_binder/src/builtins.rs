//! Builtin functions.
//!
//! Builtins are declared into the root scope before anything else. Most have
//! a plain signature and go through ordinary call checking. The ones that
//! are overloaded or generic over containers are resolved here instead.

use crate::types::Type;

/// Builtins whose calls are typed by `resolve_call` rather than by their
/// declared signature.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpecialBuiltin {
    Abs,
    Min,
    Max,
    Len,
    Send,
    Recv,
    Join,
}

impl SpecialBuiltin {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "abs" => SpecialBuiltin::Abs,
            "min" => SpecialBuiltin::Min,
            "max" => SpecialBuiltin::Max,
            "len" => SpecialBuiltin::Len,
            "send" => SpecialBuiltin::Send,
            "recv" => SpecialBuiltin::Recv,
            "join" => SpecialBuiltin::Join,
            _ => return None,
        })
    }

    pub fn arity(self) -> usize {
        match self {
            SpecialBuiltin::Abs | SpecialBuiltin::Len | SpecialBuiltin::Recv | SpecialBuiltin::Join => 1,
            SpecialBuiltin::Min | SpecialBuiltin::Max | SpecialBuiltin::Send => 2,
        }
    }
}

/// Declared shape of one builtin.
#[derive(Debug, Clone)]
pub struct BuiltinSignature {
    pub name: &'static str,
    pub parameters: Vec<(&'static str, Type)>,
    pub return_type: Type,
}

fn sig(name: &'static str, parameters: Vec<(&'static str, Type)>, return_type: Type) -> BuiltinSignature {
    BuiltinSignature {
        name,
        parameters,
        return_type,
    }
}

/// Every builtin, in declaration order. Signatures of the special builtins
/// use placeholders and only matter when the builtin is used as a value.
pub fn signatures() -> Vec<BuiltinSignature> {
    let t = || Type::generic("T");
    vec![
        sig("abs", vec![("value", t())], t()),
        sig("min", vec![("a", t()), ("b", t())], t()),
        sig("max", vec![("a", t()), ("b", t())], t()),
        sig("len", vec![("collection", t())], Type::Int),
        sig("send", vec![("sender", Type::sender(t())), ("value", t())], Type::Unit),
        sig("recv", vec![("receiver", Type::receiver(t()))], t()),
        sig("join", vec![("task", Type::task(t()))], t()),
        sig("now", vec![], Type::Instant),
        sig("elapsed", vec![("since", Type::Instant)], Type::Int),
        sig("sleep", vec![("millis", Type::Int)], Type::Unit),
        sig("to_string", vec![("value", Type::Int)], Type::String),
    ]
}

/// Why a special builtin call did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinCallError {
    Arity { expected: usize, got: usize },
    NoOverload,
}

/// Type a call to a special builtin from its argument types.
pub fn resolve_call(builtin: SpecialBuiltin, args: &[Type]) -> Result<Type, BuiltinCallError> {
    if args.len() != builtin.arity() {
        return Err(BuiltinCallError::Arity {
            expected: builtin.arity(),
            got: args.len(),
        });
    }
    if args.iter().any(Type::is_error) {
        return Ok(poisoned_result(builtin, args));
    }
    let resolved = match (builtin, args) {
        (SpecialBuiltin::Abs, [t]) if t.is_numeric() => Some(t.clone()),
        (SpecialBuiltin::Min | SpecialBuiltin::Max, [a, b]) if a.is_numeric() && a == b => Some(a.clone()),
        (SpecialBuiltin::Len, [Type::List(_) | Type::Map(_) | Type::String]) => Some(Type::Int),
        (SpecialBuiltin::Send, [Type::Sender(element), value]) if element.accepts(value) => Some(Type::Unit),
        (SpecialBuiltin::Recv, [Type::Receiver(element)]) => Some((**element).clone()),
        (SpecialBuiltin::Join, [Type::Task(result)]) => Some((**result).clone()),
        _ => None,
    };
    resolved.ok_or(BuiltinCallError::NoOverload)
}

/// Best-effort result type when an argument is already poisoned.
fn poisoned_result(builtin: SpecialBuiltin, args: &[Type]) -> Type {
    match builtin {
        SpecialBuiltin::Len => Type::Int,
        SpecialBuiltin::Send => Type::Unit,
        SpecialBuiltin::Recv => match args {
            [Type::Receiver(element)] => (**element).clone(),
            _ => Type::Error,
        },
        SpecialBuiltin::Join => match args {
            [Type::Task(result)] => (**result).clone(),
            _ => Type::Error,
        },
        SpecialBuiltin::Abs | SpecialBuiltin::Min | SpecialBuiltin::Max => Type::Error,
    }
}
