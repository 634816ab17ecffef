//! Whole-project compilation.
//!
//! Builtins are installed once, then every top-level declaration of the
//! sources is hoisted into the global scope before any body is lowered, so
//! functions may call each other regardless of order. Static variables get
//! static slots and their initializers move into a synthesized initializer
//! function.

use std::sync::Arc;

use basalt_foundation::{Result, SlotKind, SymbolId};
use tracing::debug;

use crate::ast::{FunctionDecl, LibraryDeclaration, SourceDeclaration, VariableStatement};
use crate::builtins::{self, bind_enum};
use crate::config::CompilerConfig;
use crate::cto::{CompileTimeObject, check_arity, evaluate_arguments, reverse_concat};
use crate::diagnostic::ParseError;
use crate::function::{CompiledFunction, compile_function, declaration_context, finalize};
use crate::operation::Operation;
use crate::scope::Scope;
use crate::statement::{FoldContext, LocalVariable, slot_count};

/// Output of a project compilation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledProject {
    /// Compiled functions; the static initializer, if any, comes first.
    pub functions: Vec<CompiledFunction>,
    /// Static variables in slot order.
    pub statics: Vec<LocalVariable>,
    /// Every user diagnostic, builtins first, then functions in order.
    pub diagnostics: Vec<ParseError>,
}

impl CompiledProject {
    /// Returns true if compilation produced no diagnostics.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Finds a compiled function by name.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&CompiledFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// Compiles every source declaration against the ambient `library`.
///
/// # Errors
///
/// Fails on a missing intrinsic declaration (when required), a slot
/// overflow, or an unresolvable jump. User mistakes are returned as
/// diagnostics instead.
pub fn compile_project(
    library: &[LibraryDeclaration],
    sources: &[SourceDeclaration],
    config: &CompilerConfig,
) -> Result<CompiledProject> {
    let builtins = builtins::install(library, config)?;
    let mut project = CompiledProject {
        diagnostics: builtins.diagnostics.clone(),
        ..CompiledProject::default()
    };

    let hoisted = hoist(sources, config)?;
    let scope = builtins.scope().bind(hoisted.objects.iter().cloned());

    let initializers: Vec<&VariableStatement> = sources
        .iter()
        .filter_map(|source| match source {
            SourceDeclaration::Variable { statement, .. } => Some(statement),
            _ => None,
        })
        .collect();
    if !hoisted.statics.is_empty() {
        let (function, diagnostics) = initializer(&initializers, &hoisted, &scope, config)?;
        project.functions.push(function);
        project.diagnostics.extend(diagnostics);
    }

    for source in sources {
        if let SourceDeclaration::Function(decl) = source {
            let (function, diagnostics) = compile_function(decl, &scope, config)?;
            project.functions.push(function);
            project.diagnostics.extend(diagnostics);
        }
    }

    project.statics = hoisted.statics;
    debug!(
        functions = project.functions.len(),
        statics = project.statics.len(),
        diagnostics = project.diagnostics.len(),
        "compiled project"
    );
    Ok(project)
}

// =============================================================================
// Hoisting
// =============================================================================

/// Global bindings of the user sources.
#[derive(Default)]
struct Hoisted {
    objects: Vec<(SymbolId, Arc<CompileTimeObject>)>,
    statics: Vec<LocalVariable>,
    slots: im::HashMap<SymbolId, u8>,
}

fn hoist(sources: &[SourceDeclaration], config: &CompilerConfig) -> Result<Hoisted> {
    let mut hoisted = Hoisted::default();
    for source in sources {
        match source {
            SourceDeclaration::Function(decl) => {
                hoisted.objects.push((decl.symbol, Arc::new(user_function(decl))));
            }
            SourceDeclaration::Enum(decl) => {
                hoisted
                    .objects
                    .extend(bind_enum(decl.symbol, Some(decl.node), &decl.members));
            }
            SourceDeclaration::Variable { statement, .. } => {
                for declarator in &statement.declarations {
                    for (ident, ty) in declarator.binding.names() {
                        let slot = slot_count(SlotKind::Static, hoisted.statics.len() + 1, config)
                            .map_err(|e| {
                                e.with_context(
                                    declaration_context(&ident.name, Some(ident.node))
                                        .with_frame("allocating statics"),
                                )
                            })?
                            - 1;
                        let cto = CompileTimeObject::slot(
                            SlotKind::Static,
                            slot,
                            ident.symbol,
                            Some(ident.node),
                        );
                        hoisted.objects.push((ident.symbol, Arc::new(cto)));
                        hoisted.slots.insert(ident.symbol, slot);
                        hoisted.statics.push(LocalVariable {
                            name: ident.name.clone(),
                            ty: ty.clone(),
                            slot,
                        });
                    }
                }
            }
        }
    }
    Ok(hoisted)
}

/// A user function: arguments last-to-first, then `CALL`.
fn user_function(decl: &FunctionDecl) -> CompileTimeObject {
    let name = decl.name.clone();
    let arity = decl.params.len();
    let symbol = decl.symbol;
    CompileTimeObject::new(symbol, Some(decl.node)).with_call(move |_receiver, args| {
        check_arity(&name, arity, arity, args.len())?;
        let mut ops = reverse_concat(evaluate_arguments(args)?);
        ops.push(Operation::Call(symbol));
        Ok(ops)
    })
}

/// The synthesized function running every static initializer in source
/// order.
fn initializer(
    statements: &[&VariableStatement],
    hoisted: &Hoisted,
    scope: &Arc<Scope>,
    config: &CompilerConfig,
) -> Result<(CompiledFunction, Vec<ParseError>)> {
    let count = slot_count(SlotKind::Static, hoisted.statics.len(), config)?;
    let name = config.initializer_name.clone();
    let mut cx = FoldContext::new(name.clone(), Arc::clone(scope), config)
        .with_statics(hoisted.slots.clone());
    let mut body = Vec::new();
    for statement in statements {
        cx.variable_statement(statement, &mut body)?;
    }
    let lowered = cx.finish(vec![Operation::InitStaticSlot(count)], 0, body)?;
    finalize(name, None, None, lowered)
}
