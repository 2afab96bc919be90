//! The structural type model.
//!
//! `Type` is an immutable tagged union. Equality and hashing are derived, so
//! two types are equal exactly when they have the same shape.

use rustc_hash::FxHashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    Unit,
    Instant,
    /// Poison type. Compatible with everything and never reported twice.
    Error,
    Function { params: Vec<Type>, ret: Box<Type> },
    Tuple(Vec<Type>),
    List(Box<Type>),
    /// String-keyed map; only the value type is carried.
    Map(Box<Type>),
    Task(Box<Type>),
    Sender(Box<Type>),
    Receiver(Box<Type>),
    Result { value: Box<Type>, error: Box<Type> },
    Record { name: String, args: Vec<Type> },
    Sum { name: String, args: Vec<Type> },
    /// A generic parameter, e.g. `T` inside `fn id<T>(x: T) -> T`.
    Generic(String),
}

/// Substitution from generic parameter names to concrete types.
pub type Substitution = FxHashMap<String, Type>;

impl Type {
    pub fn function(params: Vec<Type>, ret: Type) -> Type {
        Type::Function {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn list(element: Type) -> Type {
        Type::List(Box::new(element))
    }

    pub fn map(value: Type) -> Type {
        Type::Map(Box::new(value))
    }

    pub fn task(result: Type) -> Type {
        Type::Task(Box::new(result))
    }

    pub fn sender(element: Type) -> Type {
        Type::Sender(Box::new(element))
    }

    pub fn receiver(element: Type) -> Type {
        Type::Receiver(Box::new(element))
    }

    pub fn result(value: Type, error: Type) -> Type {
        Type::Result {
            value: Box::new(value),
            error: Box::new(error),
        }
    }

    pub fn record(name: impl Into<String>, args: Vec<Type>) -> Type {
        Type::Record {
            name: name.into(),
            args,
        }
    }

    pub fn sum(name: impl Into<String>, args: Vec<Type>) -> Type {
        Type::Sum {
            name: name.into(),
            args,
        }
    }

    pub fn generic(name: impl Into<String>) -> Type {
        Type::Generic(name.into())
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// True if a `Generic` placeholder occurs anywhere inside this type.
    pub fn has_generics(&self) -> bool {
        match self {
            Type::Generic(_) => true,
            Type::Function { params, ret } => params.iter().any(Type::has_generics) || ret.has_generics(),
            Type::Tuple(elements) => elements.iter().any(Type::has_generics),
            Type::List(t) | Type::Map(t) | Type::Task(t) | Type::Sender(t) | Type::Receiver(t) => t.has_generics(),
            Type::Result { value, error } => value.has_generics() || error.has_generics(),
            Type::Record { args, .. } | Type::Sum { args, .. } => args.iter().any(Type::has_generics),
            _ => false,
        }
    }

    /// Replace generic placeholders named in `map`. Unmapped placeholders
    /// are left in place.
    pub fn substitute(&self, map: &Substitution) -> Type {
        if map.is_empty() {
            return self.clone();
        }
        let sub = |t: &Type| Box::new(t.substitute(map));
        let all = |ts: &[Type]| -> Vec<Type> { ts.iter().map(|t| t.substitute(map)).collect() };
        match self {
            Type::Generic(name) => map.get(name).cloned().unwrap_or_else(|| self.clone()),
            Type::Function { params, ret } => Type::Function {
                params: all(params),
                ret: sub(ret),
            },
            Type::Tuple(elements) => Type::Tuple(all(elements)),
            Type::List(t) => Type::List(sub(t)),
            Type::Map(t) => Type::Map(sub(t)),
            Type::Task(t) => Type::Task(sub(t)),
            Type::Sender(t) => Type::Sender(sub(t)),
            Type::Receiver(t) => Type::Receiver(sub(t)),
            Type::Result { value, error } => Type::Result {
                value: sub(value),
                error: sub(error),
            },
            Type::Record { name, args } => Type::Record {
                name: name.clone(),
                args: all(args),
            },
            Type::Sum { name, args } => Type::Sum {
                name: name.clone(),
                args: all(args),
            },
            _ => self.clone(),
        }
    }

    /// Whether a value of type `other` may be stored where `self` is expected.
    ///
    /// Structural equality, except that `Error` on either side is compatible
    /// with anything in that position. A `Generic` placeholder only accepts
    /// the same placeholder.
    pub fn accepts(&self, other: &Type) -> bool {
        self.compatible(other, false)
    }

    /// Argument check at a call site. Like `accepts`, but a placeholder left
    /// in `self` after substitution matches any argument type.
    pub fn accepts_argument(&self, other: &Type) -> bool {
        self.compatible(other, true)
    }

    fn compatible(&self, other: &Type, open: bool) -> bool {
        match (self, other) {
            (Type::Error, _) | (_, Type::Error) => true,
            (Type::Generic(_), _) if open => true,
            (Type::Function { params: p1, ret: r1 }, Type::Function { params: p2, ret: r2 }) => {
                all_compatible(p1, p2, open) && r1.compatible(r2, open)
            }
            (Type::Tuple(a), Type::Tuple(b)) => all_compatible(a, b, open),
            (Type::List(a), Type::List(b))
            | (Type::Map(a), Type::Map(b))
            | (Type::Task(a), Type::Task(b))
            | (Type::Sender(a), Type::Sender(b))
            | (Type::Receiver(a), Type::Receiver(b)) => a.compatible(b, open),
            (Type::Result { value: v1, error: e1 }, Type::Result { value: v2, error: e2 }) => {
                v1.compatible(v2, open) && e1.compatible(e2, open)
            }
            (Type::Record { name: n1, args: a1 }, Type::Record { name: n2, args: a2 })
            | (Type::Sum { name: n1, args: a1 }, Type::Sum { name: n2, args: a2 }) => n1 == n2 && all_compatible(a1, a2, open),
            _ => self == other,
        }
    }

    /// First-wins inference of generic parameters: walk `self` (a declared
    /// type that may mention placeholders) alongside `actual` and record the
    /// first concrete type seen for each placeholder.
    pub fn infer_into(&self, actual: &Type, map: &mut Substitution) {
        match (self, actual) {
            (_, Type::Error) => {}
            (Type::Generic(name), _) => {
                map.entry(name.clone()).or_insert_with(|| actual.clone());
            }
            (Type::Function { params: p1, ret: r1 }, Type::Function { params: p2, ret: r2 }) => {
                for (p, a) in p1.iter().zip(p2) {
                    p.infer_into(a, map);
                }
                r1.infer_into(r2, map);
            }
            (Type::Tuple(a), Type::Tuple(b)) => {
                for (p, a) in a.iter().zip(b) {
                    p.infer_into(a, map);
                }
            }
            (Type::List(a), Type::List(b))
            | (Type::Map(a), Type::Map(b))
            | (Type::Task(a), Type::Task(b))
            | (Type::Sender(a), Type::Sender(b))
            | (Type::Receiver(a), Type::Receiver(b)) => a.infer_into(b, map),
            (Type::Result { value: v1, error: e1 }, Type::Result { value: v2, error: e2 }) => {
                v1.infer_into(v2, map);
                e1.infer_into(e2, map);
            }
            (Type::Record { name: n1, args: a1 }, Type::Record { name: n2, args: a2 })
            | (Type::Sum { name: n1, args: a1 }, Type::Sum { name: n2, args: a2 })
                if n1 == n2 =>
            {
                for (p, a) in a1.iter().zip(a2) {
                    p.infer_into(a, map);
                }
            }
            _ => {}
        }
    }
}

fn all_compatible(expected: &[Type], actual: &[Type], open: bool) -> bool {
    expected.len() == actual.len() && expected.iter().zip(actual).all(|(e, a)| e.compatible(a, open))
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Type]) -> fmt::Result {
    for (i, t) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", t)?;
    }
    Ok(())
}

fn write_applied(f: &mut fmt::Formatter<'_>, name: &str, args: &[Type]) -> fmt::Result {
    f.write_str(name)?;
    if !args.is_empty() {
        f.write_str("<")?;
        write_list(f, args)?;
        f.write_str(">")?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("Int"),
            Type::Float => f.write_str("Float"),
            Type::Bool => f.write_str("Bool"),
            Type::String => f.write_str("String"),
            Type::Unit => f.write_str("Unit"),
            Type::Instant => f.write_str("Instant"),
            Type::Error => f.write_str("<error>"),
            Type::Function { params, ret } => {
                f.write_str("fn(")?;
                write_list(f, params)?;
                write!(f, ") -> {}", ret)
            }
            Type::Tuple(elements) => {
                f.write_str("(")?;
                write_list(f, elements)?;
                f.write_str(")")
            }
            Type::List(t) => write!(f, "List<{}>", t),
            Type::Map(t) => write!(f, "Map<{}>", t),
            Type::Task(t) => write!(f, "Task<{}>", t),
            Type::Sender(t) => write!(f, "Sender<{}>", t),
            Type::Receiver(t) => write!(f, "Receiver<{}>", t),
            Type::Result { value, error } => write!(f, "Result<{}, {}>", value, error),
            Type::Record { name, args } | Type::Sum { name, args } => write_applied(f, name, args),
            Type::Generic(name) => f.write_str(name),
        }
    }
}
