use std::borrow::Cow;
use std::ffi::{c_char, CStr, CString};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::config::{load_config, TranslatorConfig};
use crate::engine::Translator;

static ENGINE: Lazy<Mutex<Option<Arc<Translator>>>> = Lazy::new(|| Mutex::new(None));
static LAST_ERROR: Lazy<Mutex<Option<CString>>> = Lazy::new(|| Mutex::new(None));

fn set_last_error(msg: &str) {
    let c = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    let mut guard = LAST_ERROR.lock().unwrap_or_else(|e| e.into_inner());
    *guard = Some(c);
}

fn take_cstr(ptr: *const c_char, name: &str) -> Result<String, String> {
    if ptr.is_null() {
        return Err(format!("{name} is null"));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(|s| s.to_string())
        .map_err(|_| format!("{name} is not valid UTF-8"))
}

fn install(engine: Translator) {
    let mut guard = ENGINE.lock().unwrap_or_else(|e| e.into_inner());
    *guard = Some(Arc::new(engine));
}

fn engine() -> Arc<Translator> {
    let mut guard = ENGINE.lock().unwrap_or_else(|e| e.into_inner());
    let engine =
        guard.get_or_insert_with(|| Arc::new(Translator::new(TranslatorConfig::default())));
    Arc::clone(engine)
}

fn translate_with<F>(text: *const c_char, op: F) -> *mut c_char
where
    F: for<'a> Fn(&Translator, &'a str) -> Cow<'a, str>,
{
    if text.is_null() {
        return std::ptr::null_mut();
    }
    let input = unsafe { CStr::from_ptr(text) };
    let Ok(s) = input.to_str() else {
        return input.to_owned().into_raw();
    };
    let engine = engine();
    match CString::new(op(&*engine, s).into_owned()) {
        Ok(out) => out.into_raw(),
        // A translation with an interior NUL cannot cross the boundary.
        Err(_) => input.to_owned().into_raw(),
    }
}

/// Replaces the process engine with one reading `assets_dir` (default file
/// names). A null pointer selects the default `StreamingAssets` directory.
///
/// Returns 0 on success; non-zero on failure (see `tcsv_last_error_utf8()`).
#[no_mangle]
pub extern "C" fn tcsv_init(assets_dir: *const c_char) -> i32 {
    let cfg = if assets_dir.is_null() {
        TranslatorConfig::default()
    } else {
        match take_cstr(assets_dir, "assets_dir") {
            Ok(dir) => TranslatorConfig::with_assets_dir(dir),
            Err(e) => {
                set_last_error(&e);
                return 2;
            }
        }
    };
    install(Translator::new(cfg));
    0
}

/// Replaces the process engine with one configured from a TOML file.
///
/// Returns 0 on success; non-zero on failure (see `tcsv_last_error_utf8()`).
#[no_mangle]
pub extern "C" fn tcsv_init_with_config(config_path: *const c_char) -> i32 {
    let path = match take_cstr(config_path, "config_path") {
        Ok(v) => PathBuf::from(v),
        Err(e) => {
            set_last_error(&e);
            return 2;
        }
    };
    match load_config(&path) {
        Ok(cfg) => {
            install(Translator::new(cfg));
            0
        }
        Err(err) => {
            set_last_error(&format!("{err:#}"));
            10
        }
    }
}

/// Exact lookup. Returns a new string (free with `tcsv_free_string`); null only for null input.
#[no_mangle]
pub extern "C" fn tcsv_translate(text: *const c_char) -> *mut c_char {
    translate_with(text, Translator::translate)
}

/// Substring replacement. Returns a new string (free with `tcsv_free_string`).
#[no_mangle]
pub extern "C" fn tcsv_translate_with_substring(text: *const c_char) -> *mut c_char {
    translate_with(text, Translator::translate_with_substring)
}

/// Exact lookup with substring fallback. Returns a new string (free with `tcsv_free_string`).
#[no_mangle]
pub extern "C" fn tcsv_translate_smart(text: *const c_char) -> *mut c_char {
    translate_with(text, Translator::translate_smart)
}

/// Frees a string returned by one of the translate functions. Null is ignored.
#[no_mangle]
pub extern "C" fn tcsv_free_string(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr) });
}

/// Returns the last error message as a UTF-8 C string pointer (or null if none).
/// The pointer is valid until the next failing `tcsv_init*` call.
#[no_mangle]
pub extern "C" fn tcsv_last_error_utf8() -> *const c_char {
    let guard = LAST_ERROR.lock().unwrap_or_else(|e| e.into_inner());
    match guard.as_ref() {
        Some(s) => s.as_ptr(),
        None => std::ptr::null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: extern "C" fn(*const c_char) -> *mut c_char, text: &str) -> String {
        let input = CString::new(text).expect("cstring");
        let out = f(input.as_ptr());
        assert!(!out.is_null());
        let s = unsafe { CStr::from_ptr(out) }
            .to_str()
            .expect("utf8")
            .to_string();
        tcsv_free_string(out);
        s
    }

    // One test drives the process-wide engine so parallel tests never race on it.
    #[test]
    fn host_boundary_round_trip() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            tmp.path().join("translation.csv"),
            "source,target\nhello,bonjour\nHP,체력\n",
        )
        .expect("write");
        let dir = CString::new(tmp.path().to_str().expect("utf8 path")).expect("cstring");
        assert_eq!(tcsv_init(dir.as_ptr()), 0);

        assert_eq!(call(tcsv_translate, "hello"), "bonjour");
        assert_eq!(call(tcsv_translate, "HP 5"), "HP 5");
        assert_eq!(call(tcsv_translate_with_substring, "HP 5"), "체력 5");
        assert_eq!(call(tcsv_translate_smart, "hello"), "bonjour");
        assert_eq!(call(tcsv_translate_smart, "unknown"), "unknown");

        assert!(tcsv_translate(std::ptr::null()).is_null());
        tcsv_free_string(std::ptr::null_mut());

        let missing = CString::new(tmp.path().join("nope.toml").to_str().expect("utf8"))
            .expect("cstring");
        assert_ne!(tcsv_init_with_config(missing.as_ptr()), 0);
        assert!(!tcsv_last_error_utf8().is_null());
        assert_eq!(tcsv_init_with_config(std::ptr::null()), 2);
    }
}
