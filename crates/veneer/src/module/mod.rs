//! Address-space facades: the global space and loaded modules.
//!
//! Overlays usually resolve against an object somebody handed us. Two
//! facades cover the remaining cases:
//!
//! - [`Global`] — the whole address space, for absolutely addressed globals
//! - [`Module`] — one loaded module, for module-relative declarations
//!
//! Module lookup is the single platform primitive this crate consumes (see
//! [`platform`]), and its empty result is the crate's one recoverable error.

mod platform;

use bytemuck::Pod;
use tracing::debug;

use crate::error::{Error, Result};
use crate::field::Field;
use crate::func::Function;
use crate::overlay::Handle;
use crate::resolve::{AbsoluteResolver, Address};

/// The whole address space, for declaring absolutely addressed globals.
///
/// An explicit value rather than a hidden singleton: construct one where the
/// overlays are wired up and pass it along.
#[derive(Debug, Default)]
pub struct Global {
    handle: Handle,
}

impl Global {
    pub const fn new() -> Self {
        Self {
            handle: Handle::null(),
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Field at an absolute address.
    pub fn field<T: Pod>(&self, address: Address) -> Field<T, AbsoluteResolver> {
        self.handle.field_by(AbsoluteResolver::new(address))
    }

    /// Free function at an absolute address.
    pub fn function<Sig>(&self, address: Address) -> Function<Sig> {
        Function::at(address)
    }
}

/// One loaded module, for declaring module-relative overlays.
#[derive(Debug)]
pub struct Module {
    handle: Handle,
    name: Option<String>,
}

impl Module {
    /// Resolves the main executable.
    pub fn main() -> Result<Self> {
        Self::resolve(None)
    }

    /// Resolves an already loaded module by name (e.g. `ntdll.dll`).
    pub fn named(name: &str) -> Result<Self> {
        Self::resolve(Some(name))
    }

    fn resolve(name: Option<&str>) -> Result<Self> {
        let shown = name.unwrap_or("<main>");
        match platform::module_base(name) {
            Some(base) => {
                debug!(module = shown, base, "resolved module");
                Ok(Self {
                    handle: Handle::from_address(base),
                    name: name.map(str::to_owned),
                })
            }
            None => {
                debug!(module = shown, "module lookup came back empty");
                Err(Error::ModuleNotFound(shown.to_owned()))
            }
        }
    }

    /// The module's base address, as the platform identifies it.
    pub fn base(&self) -> Address {
        self.handle.address()
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// The name this module was resolved by, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Field at `offset` from the module base.
    pub fn field<T: Pod>(&self, offset: isize) -> Field<T> {
        self.handle.field(offset)
    }

    /// Function at `offset` from the module base.
    ///
    /// The absolute address is captured here; the module is expected to stay
    /// loaded for as long as the proxy is used.
    pub fn function<Sig>(&self, offset: usize) -> Function<Sig> {
        Function::at(self.base() + offset)
    }
}
