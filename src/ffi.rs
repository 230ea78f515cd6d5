//! FFI bindings for the assessment engine
//!
//! This module provides C-compatible functions for calling the engine from
//! other languages. All functions take and return null-terminated JSON
//! strings; returned memory must be freed by the caller using
//! `assess_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{analyze_attention_json, analyze_voice_json, score_metrics_json};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

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

unsafe fn run_json_op(
    request: *const c_char,
    op: fn(&str) -> Result<String, crate::EngineError>,
) -> *mut c_char {
    clear_last_error();

    let request_str = match cstr_to_string(request) {
        Some(s) => s,
        None => {
            set_last_error("Invalid request string pointer");
            return ptr::null_mut();
        }
    };

    match op(&request_str) {
        Ok(result) => string_to_cstr(&result),
        Err(err) => {
            set_last_error(&err.to_string());
            ptr::null_mut()
        }
    }
}

/// Analyze one audio callback's window and spectrum.
///
/// Expects a `VoiceFrameRequest` JSON string and returns a `VoiceAnalysis`
/// JSON string.
///
/// # Safety
/// - `request` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with
///   `assess_free_string`.
/// - Returns NULL on error; call `assess_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn assess_analyze_voice(request: *const c_char) -> *mut c_char {
    run_json_op(request, analyze_voice_json)
}

/// Analyze one completed tracking run.
///
/// Expects a `TrackingRunRequest` JSON string and returns an
/// `AttentionAnalysis` JSON string.
///
/// # Safety
/// Same contract as [`assess_analyze_voice`].
#[no_mangle]
pub unsafe extern "C" fn assess_analyze_attention(request: *const c_char) -> *mut c_char {
    run_json_op(request, analyze_attention_json)
}

/// Score externally inferred metrics under a modality profile.
///
/// Expects an `ExternalMetricsRequest` JSON string and returns a
/// `ScoredResult` JSON string.
///
/// # Safety
/// Same contract as [`assess_analyze_voice`].
#[no_mangle]
pub unsafe extern "C" fn assess_score_metrics(request: *const c_char) -> *mut c_char {
    run_json_op(request, score_metrics_json)
}

/// Get the last error message, or NULL if the last call succeeded.
///
/// # Safety
/// The returned pointer is owned by thread-local storage and is valid until
/// the next engine call on this thread; do not free it.
#[no_mangle]
pub unsafe extern "C" fn assess_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(msg) => msg.as_ptr(),
        None => ptr::null(),
    })
}

/// Free a string returned by any engine function.
///
/// # Safety
/// `ptr` must have been returned by this library and not already freed.
#[no_mangle]
pub unsafe extern "C" fn assess_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}
