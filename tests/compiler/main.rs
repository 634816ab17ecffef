//! Integration tests for the compiler middle end
//!
//! Scopes, slot allocation, control flow, destructuring, builtin bindings,
//! and whole-project compilation against the fixture library.

mod builtins;
mod control_flow;
mod destructuring;
mod end_to_end;
mod scope;
mod slots;

use basalt_compiler::ast::{FunctionDecl, SourceDeclaration};
use basalt_compiler::fixtures::Ambient;
use basalt_compiler::{CompiledProject, CompilerConfig, Operation, compile_project};

/// Compiles `functions` against the fixture library in strict mode.
pub fn compile(ambient: &Ambient, functions: Vec<FunctionDecl>) -> CompiledProject {
    let sources: Vec<_> = functions.into_iter().map(SourceDeclaration::Function).collect();
    compile_project(&ambient.declarations, &sources, &CompilerConfig::strict())
        .expect("project compiles")
}

/// Operations of `name` between its slot prologue and its return point.
pub fn body<'a>(project: &'a CompiledProject, name: &str) -> &'a [Operation] {
    let function = project.function(name).expect("function exists");
    let ops = function.operations.as_slice();
    let start = usize::from(matches!(ops.first(), Some(Operation::InitSlot { .. })));
    &ops[start..ops.len() - 1]
}
