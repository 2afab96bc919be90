//! The binder implementation.
//!
//! Walks a syntax tree and produces a bound program. Handles:
//! - Builtin seeding and the ordered top-level passes (type names, type
//!   bodies, function signatures, function bodies, statements)
//! - Scope management for blocks, function bodies, lambdas and match arms
//! - Type annotation resolution, including generic parameters
//! - Return type inference and final function symbols
//!
//! Statement, expression and pattern binding live in sibling modules as
//! further `impl Binder` blocks.

use crate::bound::*;
use crate::builtins;
use crate::captures::CaptureTracker;
use crate::registry::{FieldDefinition, Registry, VariantDefinition};
use crate::scope::{ScopeArena, ScopeId, ScopeKind};
use crate::symbol::{FunctionSymbol, ParameterSymbol, SymbolId, SymbolKind, SymbolTable};
use crate::types::Type;
use rustc_hash::FxHashSet;
use std::mem;
use thiserror::Error;
use tracing::{debug, trace};
use weft_core::intern::StringInterner;
use weft_core::text::{LineMap, TextRange};
use weft_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use weft_options::BinderOptions;
use weft_syntax::*;

/// Internal invariant violations. These abort the bind; user errors never
/// produce one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("builtin '{0}' was declared twice")]
    DuplicateBuiltin(String),
    #[error("no signature was declared for function '{0}'")]
    MissingSignature(String),
    #[error("type '{0}' is missing from the declaration registry")]
    MissingRegistryEntry(String),
    #[error("function '{0}' was finalized twice")]
    FunctionFinalizedTwice(String),
    #[error("scope stack is unbalanced after binding (current scope {0})")]
    UnbalancedScopes(u32),
}

/// Output of one `bind` call.
#[derive(Debug)]
pub struct BindResult {
    pub program: BoundProgram,
    pub diagnostics: DiagnosticCollection,
}

/// Return-type candidates collected while binding one function or lambda.
#[derive(Debug)]
pub(crate) struct FunctionContext {
    pub name: String,
    pub declared: Option<Type>,
    pub returns: Vec<(Type, TextRange)>,
    pub range: TextRange,
}

impl FunctionContext {
    pub fn new(name: impl Into<String>, declared: Option<Type>, range: TextRange) -> Self {
        Self {
            name: name.into(),
            declared,
            returns: Vec::new(),
            range,
        }
    }
}

/// One binding session. The session owns all per-bind state and resets it
/// at the start of every `bind`, so a binder may be reused across trees.
pub struct Binder {
    pub(crate) interner: StringInterner,
    pub(crate) options: BinderOptions,
    pub(crate) symbols: SymbolTable,
    pub(crate) scopes: ScopeArena,
    pub(crate) current_scope: ScopeId,
    pub(crate) registry: Registry,
    pub(crate) diagnostics: DiagnosticCollection,
    file_name: String,
    line_map: LineMap,
    /// Innermost function or lambda last.
    pub(crate) functions: Vec<FunctionContext>,
    pub(crate) loop_depth: u32,
    /// Number of lexically enclosing `scope { }` blocks.
    pub(crate) scope_block_depth: u32,
    pub(crate) captures: CaptureTracker,
    /// Generic parameter names visible to type annotations.
    pub(crate) generic_names: Vec<String>,
    /// Function symbol per top-level statement index.
    signatures: Vec<Option<SymbolId>>,
    /// Top-level type declarations that own their registry entry.
    owned_types: FxHashSet<usize>,
}

impl Binder {
    /// Create a binder. `interner` must be the interner the trees were built
    /// with, since scope tables key on interned identifiers.
    pub fn new(interner: StringInterner) -> Self {
        Self::with_options(interner, BinderOptions::default())
    }

    pub fn with_options(interner: StringInterner, options: BinderOptions) -> Self {
        Self {
            interner,
            options,
            symbols: SymbolTable::new(),
            scopes: ScopeArena::new(),
            current_scope: ScopeId::ROOT,
            registry: Registry::new(),
            diagnostics: DiagnosticCollection::new(),
            file_name: String::new(),
            line_map: LineMap::new(""),
            functions: Vec::new(),
            loop_depth: 0,
            scope_block_depth: 0,
            captures: CaptureTracker::new(),
            generic_names: Vec::new(),
            signatures: Vec::new(),
            owned_types: FxHashSet::default(),
        }
    }

    pub fn options(&self) -> &BinderOptions {
        &self.options
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    // ========================================================================
    // Entry point
    // ========================================================================

    /// Bind a whole source file.
    pub fn bind(&mut self, tree: &SourceFile<'_>) -> Result<BindResult, BindError> {
        debug!(file = %tree.file_name, statements = tree.statements.len(), "bind start");
        self.reset(tree);
        self.declare_builtins()?;

        self.declare_type_names(tree.statements);
        let records = self.bind_record_bodies(tree.statements)?;
        let sums = self.bind_sum_bodies(tree.statements)?;
        self.declare_function_signatures(tree.statements);
        let functions = self.bind_function_bodies(tree.statements)?;

        let mut statements = Vec::new();
        for statement in tree.statements.iter() {
            if is_declaration(statement) {
                continue;
            }
            if let Some(bound) = self.bind_statement(statement) {
                statements.push(bound);
            }
        }

        if self.current_scope != ScopeId::ROOT || !self.functions.is_empty() || self.captures.depth() != 0 {
            return Err(BindError::UnbalancedScopes(self.current_scope.0));
        }

        let mut diagnostics = mem::take(&mut self.diagnostics);
        if let Some(max) = self.options.max_diagnostics {
            diagnostics.truncate(max);
        }
        let program = BoundProgram {
            records,
            sums,
            functions,
            statements,
            symbols: mem::take(&mut self.symbols),
        };
        debug!(
            file = %tree.file_name,
            symbols = program.symbols.len(),
            scopes = self.scopes.len(),
            diagnostics = diagnostics.len(),
            "bind end"
        );
        Ok(BindResult { program, diagnostics })
    }

    fn reset(&mut self, tree: &SourceFile<'_>) {
        self.symbols = SymbolTable::new();
        self.scopes = ScopeArena::new();
        self.current_scope = ScopeId::ROOT;
        self.registry.clear();
        self.diagnostics = DiagnosticCollection::new();
        self.file_name = tree.file_name.clone();
        self.line_map = LineMap::new(&tree.text);
        self.functions.clear();
        self.loop_depth = 0;
        self.scope_block_depth = 0;
        self.captures.clear();
        self.generic_names.clear();
        self.signatures = vec![None; tree.statements.len()];
        self.owned_types.clear();
    }

    fn declare_builtins(&mut self) -> Result<(), BindError> {
        for signature in builtins::signatures() {
            let function = FunctionSymbol {
                name: signature.name.to_string(),
                parameters: signature
                    .parameters
                    .into_iter()
                    .map(|(name, ty)| ParameterSymbol { name: name.to_string(), ty })
                    .collect(),
                type_parameters: Vec::new(),
                return_type: signature.return_type,
                is_builtin: true,
                is_final: true,
            };
            let ty = function.as_type();
            let id = self
                .symbols
                .add(signature.name, SymbolKind::Function(function), ty, Some(ScopeId::ROOT), 0);
            let key = self.interner.intern(signature.name);
            if self.scopes.declare_function(ScopeId::ROOT, key, id).is_err() {
                return Err(BindError::DuplicateBuiltin(signature.name.to_string()));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Diagnostics and scopes
    // ========================================================================

    pub(crate) fn report(&mut self, range: TextRange, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics
            .add(Diagnostic::with_location(&self.file_name, &self.line_map, range, message, args));
    }

    /// Enter a new child scope, returning the scope to restore afterwards.
    pub(crate) fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let previous = self.current_scope;
        self.current_scope = self.scopes.push(previous, kind);
        trace!(scope = self.current_scope.0, parent = previous.0, ?kind, "enter scope");
        previous
    }

    pub(crate) fn exit_scope(&mut self, previous: ScopeId) {
        trace!(scope = self.current_scope.0, "exit scope");
        self.current_scope = previous;
    }

    pub(crate) fn scope_depth(&self) -> u32 {
        self.scopes.depth(self.current_scope)
    }

    /// Declare a variable or parameter in the current scope. A duplicate is
    /// reported but still gets a symbol, so uses bind against something.
    pub(crate) fn declare_local(&mut self, name: &Identifier, kind: SymbolKind, ty: Type) -> SymbolId {
        let depth = self.scope_depth();
        let id = self
            .symbols
            .add(name.text_name.clone(), kind, ty, Some(self.current_scope), depth);
        if self.scopes.declare_variable(self.current_scope, name.text, id).is_err() {
            self.report(name.data.range, &messages::_0_IS_ALREADY_DECLARED, &[&name.text_name]);
        }
        id
    }

    // ========================================================================
    // Type annotations
    // ========================================================================

    /// Check generic parameter names for repeats, returning them in order
    /// with repeats dropped.
    fn type_parameter_names(&mut self, parameters: &[Identifier]) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            if names.contains(&parameter.text_name) {
                self.report(parameter.data.range, &messages::_0_IS_ALREADY_DECLARED, &[&parameter.text_name]);
            } else {
                names.push(parameter.text_name.clone());
            }
        }
        names
    }

    pub(crate) fn resolve_type(&mut self, node: &TypeNode<'_>) -> Type {
        match node {
            TypeNode::Named(named) => self.resolve_named_type(named),
            TypeNode::Function(function) => {
                let params = function.parameters.iter().map(|p| self.resolve_type(p)).collect();
                let ret = self.resolve_type(function.return_type);
                Type::function(params, ret)
            }
            TypeNode::Tuple(tuple) => Type::Tuple(tuple.elements.iter().map(|e| self.resolve_type(e)).collect()),
        }
    }

    fn resolve_named_type(&mut self, named: &NamedTypeNode<'_>) -> Type {
        let name = named.name.text_name.as_str();
        let range = named.data.range;
        let args: Vec<Type> = named.type_arguments.iter().map(|a| self.resolve_type(a)).collect();

        if self.generic_names.iter().any(|g| g == name) {
            return if self.check_type_arity(name, 0, &args, range) {
                Type::generic(name)
            } else {
                Type::Error
            };
        }
        if let Some(expected) = self.registry.record(name).map(|r| r.type_parameters.len()) {
            return if self.check_type_arity(name, expected, &args, range) {
                Type::record(name, args)
            } else {
                Type::Error
            };
        }
        if let Some(expected) = self.registry.sum(name).map(|s| s.type_parameters.len()) {
            return if self.check_type_arity(name, expected, &args, range) {
                Type::sum(name, args)
            } else {
                Type::Error
            };
        }

        let expected = match name {
            "Int" | "Float" | "Bool" | "String" | "Unit" | "Instant" => 0,
            "List" | "Map" | "Task" | "Sender" | "Receiver" => 1,
            "Result" => 2,
            _ => {
                self.report(named.name.data.range, &messages::UNDEFINED_TYPE_0, &[name]);
                return Type::Error;
            }
        };
        if !self.check_type_arity(name, expected, &args, range) {
            return Type::Error;
        }
        let mut args = args.into_iter();
        let mut next = || args.next().unwrap_or(Type::Error);
        match name {
            "Int" => Type::Int,
            "Float" => Type::Float,
            "Bool" => Type::Bool,
            "String" => Type::String,
            "Unit" => Type::Unit,
            "Instant" => Type::Instant,
            "List" => Type::list(next()),
            "Map" => Type::map(next()),
            "Task" => Type::task(next()),
            "Sender" => Type::sender(next()),
            "Receiver" => Type::receiver(next()),
            _ => {
                let value = next();
                Type::result(value, next())
            }
        }
    }

    pub(crate) fn check_type_arity(&mut self, name: &str, expected: usize, args: &[Type], range: TextRange) -> bool {
        if args.len() == expected {
            return true;
        }
        self.report(
            range,
            &messages::_0_EXPECTS_1_TYPE_ARGUMENTS_GOT_2,
            &[name, &expected.to_string(), &args.len().to_string()],
        );
        false
    }

    // ========================================================================
    // Top-level passes
    // ========================================================================

    /// Pass 1: register every record and sum name before any body is bound.
    fn declare_type_names(&mut self, statements: &[Statement<'_>]) {
        for (index, statement) in statements.iter().enumerate() {
            let (name, parameters, is_record) = match statement {
                Statement::RecordDeclaration(decl) => (&decl.name, decl.type_parameters, true),
                Statement::SumDeclaration(decl) => (&decl.name, decl.type_parameters, false),
                _ => continue,
            };
            let type_parameters = self.type_parameter_names(parameters);
            let declared = if is_record {
                self.registry.declare_record(&name.text_name, type_parameters)
            } else {
                self.registry.declare_sum(&name.text_name, type_parameters)
            };
            if declared {
                self.owned_types.insert(index);
            } else {
                self.report(name.data.range, &messages::_0_IS_ALREADY_DECLARED, &[&name.text_name]);
            }
        }
        trace!(
            records = self.registry.record_count(),
            sums = self.registry.sum_count(),
            "declared type names"
        );
    }

    /// Pass 2a: resolve record fields against the complete set of type names.
    fn bind_record_bodies(&mut self, statements: &[Statement<'_>]) -> Result<Vec<BoundRecordDeclaration>, BindError> {
        let mut bound = Vec::new();
        for (index, statement) in statements.iter().enumerate() {
            let Statement::RecordDeclaration(decl) = statement else {
                continue;
            };
            if !self.owned_types.contains(&index) {
                continue;
            }
            let name = decl.name.text_name.clone();
            let type_parameters = self
                .registry
                .record(&name)
                .map(|r| r.type_parameters.clone())
                .ok_or_else(|| BindError::MissingRegistryEntry(name.clone()))?;

            self.generic_names = type_parameters.clone();
            let mut fields = Vec::with_capacity(decl.fields.len());
            for field in decl.fields.iter() {
                let ty = self.resolve_type(&field.type_annotation);
                let record = self
                    .registry
                    .record(&name)
                    .ok_or_else(|| BindError::MissingRegistryEntry(name.clone()))?;
                if record.fields.contains_key(&field.name.text_name) {
                    self.report(field.name.data.range, &messages::_0_IS_ALREADY_DECLARED, &[&field.name.text_name]);
                    continue;
                }
                let symbol = self.symbols.add(
                    field.name.text_name.clone(),
                    SymbolKind::Field { record: name.clone() },
                    ty.clone(),
                    None,
                    0,
                );
                self.registry
                    .record_mut(&name)
                    .ok_or_else(|| BindError::MissingRegistryEntry(name.clone()))?
                    .fields
                    .insert(field.name.text_name.clone(), FieldDefinition { symbol, ty });
                fields.push(symbol);
            }
            self.generic_names.clear();

            bound.push(BoundRecordDeclaration {
                name,
                type_parameters,
                fields,
                range: decl.data.range,
            });
        }
        Ok(bound)
    }

    /// Pass 2b: resolve variant payloads. Variant names are global.
    fn bind_sum_bodies(&mut self, statements: &[Statement<'_>]) -> Result<Vec<BoundSumDeclaration>, BindError> {
        let mut bound = Vec::new();
        for (index, statement) in statements.iter().enumerate() {
            let Statement::SumDeclaration(decl) = statement else {
                continue;
            };
            if !self.owned_types.contains(&index) {
                continue;
            }
            let name = decl.name.text_name.clone();
            let (type_parameters, self_type) = self
                .registry
                .sum(&name)
                .map(|s| (s.type_parameters.clone(), s.self_type()))
                .ok_or_else(|| BindError::MissingRegistryEntry(name.clone()))?;

            self.generic_names = type_parameters.clone();
            let mut variants = Vec::with_capacity(decl.variants.len());
            for variant in decl.variants.iter() {
                let payload = variant.payload.map(|p| self.resolve_type(p));
                let variant_name = &variant.name.text_name;
                if let Some((owner, _)) = self.registry.variant(variant_name) {
                    if owner.name == name {
                        self.report(variant.name.data.range, &messages::_0_IS_ALREADY_DECLARED, &[variant_name]);
                    } else {
                        let owner = owner.name.clone();
                        self.report(
                            variant.name.data.range,
                            &messages::VARIANT_0_IS_ALREADY_DECLARED_BY_TYPE_1,
                            &[variant_name, &owner],
                        );
                    }
                    continue;
                }
                let symbol = self.symbols.add(
                    variant_name.clone(),
                    SymbolKind::Variant {
                        sum: name.clone(),
                        payload: payload.clone(),
                    },
                    self_type.clone(),
                    None,
                    0,
                );
                self.registry
                    .add_variant(&name, variant_name, VariantDefinition { symbol, payload })
                    .map_err(|_| BindError::MissingRegistryEntry(name.clone()))?;
                variants.push(symbol);
            }
            self.generic_names.clear();

            bound.push(BoundSumDeclaration {
                name,
                type_parameters,
                variants,
                range: decl.data.range,
            });
        }
        Ok(bound)
    }

    /// Pass 3: declare every function signature so bodies can call each
    /// other in any order. Unannotated return types stay provisional.
    fn declare_function_signatures(&mut self, statements: &[Statement<'_>]) {
        for (index, statement) in statements.iter().enumerate() {
            let Statement::FunctionDeclaration(decl) = statement else {
                continue;
            };
            let type_parameters = self.type_parameter_names(decl.type_parameters);
            self.generic_names = type_parameters.clone();
            let parameters = decl
                .parameters
                .iter()
                .map(|p| ParameterSymbol {
                    name: p.name.text_name.clone(),
                    ty: self.resolve_type(&p.type_annotation),
                })
                .collect();
            let declared = decl.return_type.map(|t| self.resolve_type(t));
            self.generic_names.clear();

            let function = FunctionSymbol {
                name: decl.name.text_name.clone(),
                parameters,
                type_parameters,
                is_final: declared.is_some(),
                return_type: declared.unwrap_or(Type::Unit),
                is_builtin: false,
            };
            let ty = function.as_type();
            let id = self.symbols.add(
                decl.name.text_name.clone(),
                SymbolKind::Function(function),
                ty,
                Some(ScopeId::ROOT),
                0,
            );
            if self.scopes.declare_function(ScopeId::ROOT, decl.name.text, id).is_err() {
                self.report(decl.name.data.range, &messages::_0_IS_ALREADY_DECLARED, &[&decl.name.text_name]);
            }
            self.signatures[index] = Some(id);
        }
    }

    /// Pass 4: bind function bodies in source order, inferring return types.
    fn bind_function_bodies(&mut self, statements: &[Statement<'_>]) -> Result<Vec<BoundFunctionDeclaration>, BindError> {
        let mut bound = Vec::new();
        for (index, statement) in statements.iter().enumerate() {
            let Statement::FunctionDeclaration(decl) = statement else {
                continue;
            };
            let id = self
                .signatures
                .get(index)
                .copied()
                .flatten()
                .ok_or_else(|| BindError::MissingSignature(decl.name.text_name.clone()))?;
            bound.push(self.bind_function_body(id, decl)?);
        }
        Ok(bound)
    }

    fn bind_function_body(&mut self, id: SymbolId, decl: &FunctionDeclaration<'_>) -> Result<BoundFunctionDeclaration, BindError> {
        let function = self
            .symbols
            .get(id)
            .and_then(|s| s.as_function())
            .cloned()
            .ok_or_else(|| BindError::MissingSignature(decl.name.text_name.clone()))?;
        debug!(function = %function.name, "bind function body");

        let previous = self.enter_scope(ScopeKind::Function);
        self.generic_names = function.type_parameters.clone();
        let parameters = decl
            .parameters
            .iter()
            .zip(&function.parameters)
            .map(|(node, param)| self.declare_local(&node.name, SymbolKind::Parameter, param.ty.clone()))
            .collect();

        let declared = function.is_final.then(|| function.return_type.clone());
        self.functions
            .push(FunctionContext::new(function.name.clone(), declared, decl.name.data.range));
        let saved_loop_depth = mem::replace(&mut self.loop_depth, 0);
        let saved_scope_depth = mem::replace(&mut self.scope_block_depth, 0);

        let body = self.bind_statements(decl.body.statements, decl.body.data.range);

        self.loop_depth = saved_loop_depth;
        self.scope_block_depth = saved_scope_depth;
        let context = self
            .functions
            .pop()
            .ok_or(BindError::UnbalancedScopes(self.current_scope.0))?;
        let return_type = self.infer_return_type(context, trailing_candidate(&body));
        self.generic_names.clear();
        self.exit_scope(previous);

        if !function.is_final {
            self.finalize_function(id, function, return_type)?;
        }

        Ok(BoundFunctionDeclaration {
            symbol: id,
            parameters,
            body,
            range: decl.data.range,
        })
    }

    /// Replace a provisional signature with its final version, once.
    fn finalize_function(&mut self, id: SymbolId, provisional: FunctionSymbol, return_type: Type) -> Result<(), BindError> {
        let already_final = self
            .symbols
            .get(id)
            .and_then(|s| s.as_function())
            .map_or(true, |f| f.is_final || f.is_builtin);
        if already_final {
            return Err(BindError::FunctionFinalizedTwice(provisional.name));
        }
        trace!(function = %provisional.name, %return_type, "finalize signature");
        let name = provisional.name.clone();
        let finished = FunctionSymbol {
            return_type,
            is_final: true,
            ..provisional
        };
        self.symbols
            .replace_function(id, finished)
            .ok_or(BindError::MissingSignature(name))
    }

    // ========================================================================
    // Return type inference
    // ========================================================================

    /// Decide the return type of a function or lambda from its collected
    /// `return` candidates and its trailing expression.
    pub(crate) fn infer_return_type(&mut self, context: FunctionContext, trailing: Option<(Type, TextRange)>) -> Type {
        let FunctionContext {
            name,
            declared,
            mut returns,
            range,
        } = context;

        if let Some(declared) = declared {
            if declared != Type::Unit {
                returns.extend(trailing);
            }
            for (ty, at) in &returns {
                if !declared.accepts(ty) {
                    self.report(
                        *at,
                        &messages::FUNCTION_0_RETURNS_1_BUT_DECLARES_2,
                        &[&name, &ty.to_string(), &declared.to_string()],
                    );
                }
            }
            return declared;
        }

        returns.extend(trailing);
        if returns.is_empty() {
            return Type::Unit;
        }
        let mut concrete = returns.iter().map(|(ty, _)| ty).filter(|ty| !ty.is_error());
        let Some(first) = concrete.next() else {
            return Type::Error;
        };
        if concrete.any(|ty| ty != first) {
            self.report(range, &messages::FUNCTION_0_HAS_INCONSISTENT_RETURN_TYPES, &[&name]);
            return Type::Error;
        }
        first.clone()
    }
}

/// The trailing expression of a body as a return candidate, unless it
/// always diverges.
pub(crate) fn trailing_candidate(block: &BoundBlock) -> Option<(Type, TextRange)> {
    block
        .trailing_expression()
        .filter(|e| !e.diverges())
        .map(|e| (e.ty.clone(), e.range))
}

pub(crate) fn is_declaration(statement: &Statement<'_>) -> bool {
    matches!(
        statement,
        Statement::FunctionDeclaration(_) | Statement::RecordDeclaration(_) | Statement::SumDeclaration(_)
    )
}

/// Bind one tree with a fresh binder.
pub fn bind(tree: &SourceFile<'_>, interner: &StringInterner) -> Result<BindResult, BindError> {
    Binder::new(interner.clone()).bind(tree)
}
