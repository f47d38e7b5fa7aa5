//! Scoped mutation of the process environment
//!
//! An in-process helmfile run shells out to helm and kubectl, which read
//! credentials from the process environment. The environment is global, so:
//! 1. A process-wide lock serializes every scope
//! 2. Each affected key is snapshotted (absent and empty are different)
//! 3. Overrides are applied for the lifetime of an [`EnvScope`]
//! 4. Dropping the scope restores the snapshot, on return, error or panic

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Variables shown in environment debug dumps.
pub const AWS_DEBUG_KEYS: &[&str] = &[
    "AWS_PROFILE",
    "AWS_REGION",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "HOME",
    "AWS_CONFIG_FILE",
    "AWS_SHARED_CREDENTIALS_FILE",
    "KUBECONFIG",
];

const MASKED_KEYS: &[&str] = &["AWS_SECRET_ACCESS_KEY", "AWS_SESSION_TOKEN"];

/// Scoped environment overrides - restored on drop
pub struct EnvScope {
    saved: Vec<(String, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvScope {
    /// Apply `overrides` until the returned scope is dropped.
    ///
    /// Blocks while another scope is active. A lock poisoned by a panic in
    /// an earlier scope is recovered; that scope already restored its keys.
    pub fn enter(overrides: &BTreeMap<String, String>) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let saved = overrides
            .keys()
            .map(|key| (key.clone(), std::env::var_os(key)))
            .collect();

        for (key, value) in overrides {
            // SAFETY: every mutation of the environment in this crate happens
            // while ENV_LOCK is held.
            unsafe { std::env::set_var(key, value) };
        }

        Self { saved, _lock: lock }
    }

    /// Keys this scope overrides.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.saved.iter().map(|(key, _)| key.as_str())
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..) {
            // SAFETY: ENV_LOCK is still held; the guard field drops after this body.
            unsafe {
                match previous {
                    Some(value) => std::env::set_var(&key, value),
                    None => std::env::remove_var(&key),
                }
            }
        }
    }
}

/// Mask a secret for display.
///
/// Values longer than 8 characters keep their first and last 4 characters.
pub fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}***{tail}")
    } else {
        "***".to_string()
    }
}

/// Render `KEY=value` lines for `keys`, masking secrets.
pub fn describe_environment(keys: &[&str]) -> String {
    let mut out = String::new();
    for key in keys {
        match std::env::var(key) {
            Ok(value) if MASKED_KEYS.contains(key) => {
                out.push_str(&format!("  {key}={}\n", mask_value(&value)));
            }
            Ok(value) => out.push_str(&format!("  {key}={value}\n")),
            Err(_) => out.push_str(&format!("  {key}=(not set)\n")),
        }
    }
    out
}
