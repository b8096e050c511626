#![doc = include_str!("../README.md")]

use cranelift::codegen::{self, CodegenError};
use cranelift::prelude::settings::SetError;
use cranelift::prelude::*;
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{FuncId, Module, ModuleError};
use shall_codegen::IrModule;
use shall_tokens::types::PrimitiveType;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::mem;
use thiserror::Error;
use tracing::{debug, trace};

/// How much effort cranelift spends optimizing
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum OptLevel {
    #[default]
    None,
    Speed,
    SpeedAndSize,
}

/// Settings used for configuring JIT compilation
#[derive(Debug, Clone, Default)]
pub struct JitConfig {
    pub opt_level: OptLevel,
    /// Runs the ir verifier on every procedure before it's compiled
    pub verify: bool,
}

/// JIT compiler, turning an [IrModule] into callable machine code.
pub struct Jit {
    /// The main cranelift context, reused for every procedure
    ctx: codegen::Context,
    module: JITModule,
}

impl Debug for Jit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jit").finish_non_exhaustive()
    }
}

impl Jit {
    /// Creates a new JIT targeting the host machine
    pub fn new(config: JitConfig) -> JitResult<Self> {
        let mut flag_builder = settings::builder();
        flag_builder.set("use_colocated_libcalls", "false")?;
        flag_builder.set("is_pic", "false")?;
        flag_builder.set("opt_level", &config.opt_level.to_string())?;
        flag_builder.set("enable_verifier", if config.verify { "true" } else { "false" })?;
        let isa_builder = cranelift_native::builder()
            .map_err(|msg| JitError::UnsupportedHost(msg.to_string()))?;
        let isa = isa_builder.finish(settings::Flags::new(flag_builder))?;
        debug!("created jit for {} with {config:?}", isa.triple());
        let builder = JITBuilder::with_isa(isa, cranelift_module::default_libcall_names());
        let module = JITModule::new(builder);
        Ok(Self {
            ctx: module.make_context(),
            module,
        })
    }

    /// The module procedures must be declared in before they can be loaded
    pub fn module_mut(&mut self) -> &mut JITModule {
        &mut self.module
    }

    /// Compiles every procedure of the module into machine code
    pub fn load(&mut self, ir: IrModule) -> JitResult<LoadedModule<'_>> {
        let entry = ir.entry();
        let entry_type = ir.entry_type();
        let mut functions = HashMap::new();
        for procedure in ir.into_procedures() {
            let name = procedure.name().to_string();
            let id = procedure.id();
            trace!("defining {name} as {id}");
            self.ctx.func = procedure.into_function();
            let defined = self.module.define_function(id, &mut self.ctx);
            self.module.clear_context(&mut self.ctx);
            defined?;
            functions.insert(name, id);
        }
        self.module.finalize_definitions()?;
        Ok(LoadedModule {
            module: &self.module,
            functions,
            entry,
            entry_type,
        })
    }
}

/// A module whose procedures have been compiled and can be called
pub struct LoadedModule<'j> {
    module: &'j JITModule,
    functions: HashMap<String, FuncId>,
    entry: FuncId,
    entry_type: PrimitiveType,
}

impl LoadedModule<'_> {
    /// Runs the entry procedure, returning whatever it returned
    pub fn run_entry(&self) -> ExitValue {
        let code = self.module.get_finalized_function(self.entry);
        debug!("running entry {} at {code:?}", self.entry);
        match self.entry_type {
            PrimitiveType::Int => {
                // SAFETY: the entry takes no parameters and returns a single i32
                let entry = unsafe { mem::transmute::<*const u8, extern "C" fn() -> i32>(code) };
                ExitValue::Int(entry())
            }
            PrimitiveType::Double => {
                // SAFETY: the entry takes no parameters and returns a single f64
                let entry = unsafe { mem::transmute::<*const u8, extern "C" fn() -> f64>(code) };
                ExitValue::Double(entry())
            }
        }
    }

    /// Gets a pointer to the machine code of a procedure.
    ///
    /// The caller is responsible for calling it with its actual signature.
    pub fn function_ptr(&self, name: &str) -> JitResult<*const u8> {
        let id = self
            .functions
            .get(name)
            .ok_or_else(|| JitError::UnknownFunction(name.to_string()))?;
        Ok(self.module.get_finalized_function(*id))
    }
}

impl Debug for LoadedModule<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModule")
            .field("functions", &self.functions)
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

/// The value an entry procedure returned
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ExitValue {
    Int(i32),
    Double(f64),
}

impl Display for ExitValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitValue::Int(i) => write!(f, "{i}"),
            ExitValue::Double(d) => write!(f, "{d}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum JitError {
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
    #[error(transparent)]
    Settings(#[from] SetError),
    #[error("host machine is not supported: {0}")]
    UnsupportedHost(String),
    #[error("function {0:?} is not defined")]
    UnknownFunction(String),
}

pub type JitResult<T> = std::result::Result<T, JitError>;
