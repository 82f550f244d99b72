//! Platform lookup of loaded-module handles.
//!
//! The single opaque primitive the facades consume: a module name (or `None`
//! for the main program) mapped to the address the platform identifies the
//! loaded module by, or `None` if nothing by that name is loaded.

use crate::resolve::Address;

#[cfg(target_os = "windows")]
pub(crate) fn module_base(name: Option<&str>) -> Option<Address> {
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::core::{HSTRING, PCWSTR};

    let handle = match name {
        // SAFETY: GetModuleHandleW only inspects the loader's module list.
        Some(name) => unsafe { GetModuleHandleW(&HSTRING::from(name)) },
        // SAFETY: a null name asks for the main executable's handle.
        None => unsafe { GetModuleHandleW(PCWSTR::null()) },
    };

    match handle {
        Ok(module) if !module.is_invalid() => Some(module.0 as Address),
        _ => None,
    }
}

#[cfg(unix)]
pub(crate) fn module_base(name: Option<&str>) -> Option<Address> {
    use std::ffi::CString;
    use std::ptr;

    let handle = match name {
        Some(name) => {
            let name = CString::new(name).ok()?;
            // RTLD_NOLOAD: succeed only if the module is already loaded.
            // SAFETY: plain dlopen query over a valid C string.
            unsafe { libc::dlopen(name.as_ptr(), libc::RTLD_NOLOAD | libc::RTLD_LAZY) }
        }
        // SAFETY: a null path yields the handle for the main program.
        None => unsafe { libc::dlopen(ptr::null(), libc::RTLD_LAZY) },
    };

    if handle.is_null() {
        None
    } else {
        Some(handle as Address)
    }
}

#[cfg(not(any(target_os = "windows", unix)))]
pub(crate) fn module_base(_name: Option<&str>) -> Option<Address> {
    None
}
