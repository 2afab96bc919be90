//! Pattern binding for match arms.
//!
//! Patterns are bound one at a time against the scrutinee type. Whole-match
//! checks (exhaustiveness, reachability) run afterwards in
//! [`crate::exhaustiveness`].

use crate::binder::Binder;
use crate::bound::{BoundPattern, BoundPatternKind};
use crate::expressions::literal_pattern_type;
use crate::symbol::{SymbolId, SymbolKind};
use crate::types::Type;
use weft_diagnostics::messages;
use weft_syntax::{Identifier, Pattern, TuplePattern, VariantPattern};

impl Binder {
    /// Bind `pattern` against `target`, declaring its bindings in the
    /// current scope.
    pub(crate) fn bind_pattern(&mut self, pattern: &Pattern<'_>, target: &Type) -> BoundPattern {
        let range = pattern.range();
        match pattern {
            Pattern::Literal(literal) => {
                let ty = literal_pattern_type(&literal.value);
                if !matches!(target, Type::Error | Type::Generic(_)) && *target != ty {
                    self.report(
                        range,
                        &messages::PATTERN_OF_TYPE_0_CANNOT_MATCH_1,
                        &[&ty.to_string(), &target.to_string()],
                    );
                }
                BoundPattern {
                    kind: BoundPatternKind::Literal(literal.value.clone()),
                    ty,
                    range,
                }
            }
            Pattern::Wildcard(_) => BoundPattern {
                kind: BoundPatternKind::Wildcard,
                ty: target.clone(),
                range,
            },
            Pattern::Identifier(identifier) => self.bind_identifier_pattern(identifier, target),
            Pattern::Tuple(tuple) => self.bind_tuple_pattern(tuple, target),
            Pattern::Variant(variant) => self.bind_variant_pattern(variant, target),
        }
    }

    /// A bare name is a payload-less variant of the target sum if one exists,
    /// otherwise a fresh immutable binding.
    fn bind_identifier_pattern(&mut self, identifier: &Identifier, target: &Type) -> BoundPattern {
        let range = identifier.data.range;
        if let Some(symbol) = self.unit_variant_of(target, &identifier.text_name) {
            return BoundPattern {
                kind: BoundPatternKind::Variant {
                    name: identifier.text_name.clone(),
                    variant: Some(symbol),
                    payload: None,
                    from_identifier: true,
                },
                ty: target.clone(),
                range,
            };
        }
        let symbol = self.declare_local(identifier, SymbolKind::Variable { mutable: false }, target.clone());
        BoundPattern {
            kind: BoundPatternKind::Binding {
                symbol,
                name: identifier.text_name.clone(),
            },
            ty: target.clone(),
            range,
        }
    }

    fn unit_variant_of(&self, target: &Type, name: &str) -> Option<SymbolId> {
        let Type::Sum { name: sum, .. } = target else {
            return None;
        };
        let variant = self.registry.sum(sum)?.variants.get(name)?;
        variant.payload.is_none().then_some(variant.symbol)
    }

    fn bind_tuple_pattern(&mut self, tuple: &TuplePattern<'_>, target: &Type) -> BoundPattern {
        let range = tuple.data.range;
        let element_types: Vec<Type> = match target {
            Type::Tuple(elements) if elements.len() == tuple.elements.len() => elements.clone(),
            Type::Tuple(elements) => {
                self.report(
                    range,
                    &messages::TUPLE_PATTERN_HAS_0_ELEMENTS_TYPE_HAS_1,
                    &[&tuple.elements.len().to_string(), &elements.len().to_string()],
                );
                vec![Type::Error; tuple.elements.len()]
            }
            Type::Error | Type::Generic(_) => vec![Type::Error; tuple.elements.len()],
            other => {
                let other = other.to_string();
                self.report(range, &messages::PATTERN_OF_TYPE_0_CANNOT_MATCH_1, &["tuple", &other]);
                vec![Type::Error; tuple.elements.len()]
            }
        };
        let elements: Vec<BoundPattern> = tuple
            .elements
            .iter()
            .zip(&element_types)
            .map(|(element, ty)| self.bind_pattern(element, ty))
            .collect();
        let ty = match target {
            Type::Tuple(_) | Type::Generic(_) => Type::Tuple(element_types),
            _ => Type::Error,
        };
        BoundPattern {
            kind: BoundPatternKind::Tuple(elements),
            ty,
            range,
        }
    }

    fn bind_variant_pattern(&mut self, pattern: &VariantPattern<'_>, target: &Type) -> BoundPattern {
        let range = pattern.data.range;
        let name = pattern.name.text_name.as_str();

        // (variant symbol, payload type) when the target sum declares it.
        let resolved: Option<(SymbolId, Option<Type>)> = match target {
            Type::Sum { name: sum, args } => {
                let found = self.registry.sum(sum).and_then(|definition| {
                    let symbol = definition.variants.get(name)?.symbol;
                    let payload = definition.payload_type(name, args)?;
                    Some((symbol, payload))
                });
                if found.is_none() {
                    self.report(pattern.name.data.range, &messages::TYPE_0_HAS_NO_VARIANT_1, &[sum, name]);
                }
                found
            }
            Type::Error => None,
            other => {
                let pattern_type = self
                    .registry
                    .variant(name)
                    .map_or_else(|| name.to_string(), |(sum, _)| sum.self_type().to_string());
                let other = other.to_string();
                self.report(range, &messages::PATTERN_OF_TYPE_0_CANNOT_MATCH_1, &[&pattern_type, &other]);
                None
            }
        };

        let payload = match (&resolved, pattern.payload) {
            (Some((_, None)), Some(payload)) => {
                self.report(payload.range(), &messages::VARIANT_0_TAKES_NO_PAYLOAD, &[name]);
                Some(self.bind_pattern(payload, &Type::Error))
            }
            (Some((_, Some(expected))), None) => {
                let expected = expected.to_string();
                self.report(range, &messages::VARIANT_0_REQUIRES_PAYLOAD_1, &[name, &expected]);
                None
            }
            (Some((_, Some(expected))), Some(payload)) => {
                let expected = expected.clone();
                Some(self.bind_pattern(payload, &expected))
            }
            (None, Some(payload)) => Some(self.bind_pattern(payload, &Type::Error)),
            (_, None) => None,
        };

        let ty = if resolved.is_some() { target.clone() } else { Type::Error };
        BoundPattern {
            kind: BoundPatternKind::Variant {
                name: name.to_string(),
                variant: resolved.map(|(symbol, _)| symbol),
                payload: payload.map(Box::new),
                from_identifier: false,
            },
            ty,
            range,
        }
    }
}
