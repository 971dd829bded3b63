//! FFI bindings for kinanthro
//!
//! This module provides C-compatible functions for calling the engine from
//! other languages. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using
//! `kinanthro_free_string`.
//!
//! Every `config_json` argument may be NULL, in which case the default
//! [`EngineConfig`] is used.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::pipeline::{records_to_report, reconcile_sitting_json, AnthropometricEngine};
use crate::types::ClientProfile;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// NULL means defaults; anything else must be a valid config document
unsafe fn config_from_cstr(ptr: *const c_char) -> Result<EngineConfig, String> {
    if ptr.is_null() {
        return Ok(EngineConfig::default());
    }
    let json = cstr_to_string(ptr).ok_or_else(|| "Invalid config string pointer".to_string())?;
    let config: EngineConfig =
        serde_json::from_str(&json).map_err(|e| format!("Invalid config: {e}"))?;
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

// ============================================================================
// Stateless API
// ============================================================================

/// Build the report JSON for a client's latest record.
///
/// # Safety
/// - `records_json` and `profile_json` must be valid null-terminated C strings.
/// - `config_json` must be a valid null-terminated C string or NULL.
/// - Returns a newly allocated string that must be freed with `kinanthro_free_string`.
/// - Returns NULL on error; call `kinanthro_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn kinanthro_records_to_report(
    records_json: *const c_char,
    profile_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let records_str = match cstr_to_string(records_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid records string pointer");
            return ptr::null_mut();
        }
    };

    let profile_str = match cstr_to_string(profile_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid profile string pointer");
            return ptr::null_mut();
        }
    };

    let config = match config_from_cstr(config_json) {
        Ok(c) => c,
        Err(msg) => {
            set_last_error(&msg);
            return ptr::null_mut();
        }
    };

    match records_to_report(records_str, profile_str, &config) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Reconcile the trials of one sitting and return the outcome JSON.
///
/// # Safety
/// - `sitting_json` must be a valid null-terminated C string.
/// - `config_json` must be a valid null-terminated C string or NULL.
/// - Returns a newly allocated string that must be freed with `kinanthro_free_string`.
/// - Returns NULL on error; call `kinanthro_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn kinanthro_reconcile_sitting(
    sitting_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let sitting_str = match cstr_to_string(sitting_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid sitting string pointer");
            return ptr::null_mut();
        }
    };

    let config = match config_from_cstr(config_json) {
        Ok(c) => c,
        Err(msg) => {
            set_last_error(&msg);
            return ptr::null_mut();
        }
    };

    match reconcile_sitting_json(&sitting_str, &config) {
        Ok(outcome) => string_to_cstr(&outcome),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Engine API
// ============================================================================

/// Opaque handle to an AnthropometricEngine
pub struct KinanthroEngineHandle {
    engine: AnthropometricEngine,
}

/// Create a new engine.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string or NULL.
/// - Returns a pointer that must be freed with `kinanthro_engine_free`.
/// - Returns NULL on error; call `kinanthro_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn kinanthro_engine_new(
    config_json: *const c_char,
) -> *mut KinanthroEngineHandle {
    clear_last_error();

    let config = match config_from_cstr(config_json) {
        Ok(c) => c,
        Err(msg) => {
            set_last_error(&msg);
            return ptr::null_mut();
        }
    };

    let handle = Box::new(KinanthroEngineHandle {
        engine: AnthropometricEngine::with_config(config),
    });
    Box::into_raw(handle)
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `kinanthro_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn kinanthro_engine_free(engine: *mut KinanthroEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Add backend records to the engine history.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `kinanthro_engine_new`.
/// - `records_json` must be a valid null-terminated C string.
/// - Returns the number of records added, or -1 on error.
#[no_mangle]
pub unsafe extern "C" fn kinanthro_engine_import_records(
    engine: *mut KinanthroEngineHandle,
    records_json: *const c_char,
) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }

    let handle = &mut *engine;

    let records_str = match cstr_to_string(records_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid records string pointer");
            return -1;
        }
    };

    match handle.engine.import_records(&records_str) {
        Ok(count) => i32::try_from(count).unwrap_or(i32::MAX),
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Build the report JSON for a client from the engine history.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `kinanthro_engine_new`.
/// - `profile_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `kinanthro_free_string`.
/// - Returns NULL on error; call `kinanthro_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn kinanthro_engine_report(
    engine: *mut KinanthroEngineHandle,
    profile_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &*engine;

    let profile: ClientProfile = match cstr_to_string(profile_json)
        .map(|s| serde_json::from_str(&s))
    {
        Some(Ok(profile)) => profile,
        Some(Err(e)) => {
            set_last_error(&format!("Invalid profile: {e}"));
            return ptr::null_mut();
        }
        None => {
            set_last_error("Invalid profile string pointer");
            return ptr::null_mut();
        }
    };

    match handle.engine.report(&profile) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Save the engine history to JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `kinanthro_engine_new`.
/// - Returns a newly allocated string that must be freed with `kinanthro_free_string`.
/// - Returns NULL on error; call `kinanthro_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn kinanthro_engine_save_history(
    engine: *mut KinanthroEngineHandle,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &*engine;

    match handle.engine.save_history() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Load the engine history from JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `kinanthro_engine_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `kinanthro_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn kinanthro_engine_load_history(
    engine: *mut KinanthroEngineHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }

    let handle = &mut *engine;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return -1;
        }
    };

    match handle.engine.load_history(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by kinanthro functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a kinanthro function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn kinanthro_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next kinanthro function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn kinanthro_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn kinanthro_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
