//! helmfile command-line construction.

use crate::app::{BaseConfig, OperationConfig};
use crate::types::Operation;

/// Full argument list for one operation, subcommand first.
///
/// Base flags come before operation flags. Selector pairs are emitted in
/// key order so the same configuration always yields the same command line.
/// Every flag decision is read from the config's accessors.
pub fn render(config: &OperationConfig) -> Vec<String> {
    let operation = config.operation();
    let mut args = vec![operation.as_str().to_string()];
    push_base(&mut args, config.base());

    let concurrency = config.concurrency();
    if concurrency > 0 {
        push_pair(&mut args, "--concurrency", &concurrency.to_string());
    }

    match operation {
        Operation::Apply => {
            push_flag(&mut args, "--suppress-secrets", config.suppress_secrets());
            push_flag(&mut args, "--skip-diff-on-install", config.skip_diff_on_install());
            push_release_values(&mut args, config);
        }
        Operation::Diff => {
            push_flag(&mut args, "--detailed-exitcode", config.detailed_exit_code());
            push_flag(&mut args, "--suppress-secrets", config.suppress_secrets());
            push_pair(&mut args, "--context", &config.context().to_string());
            push_release_values(&mut args, config);
        }
        Operation::Template => {
            push_flag(&mut args, "--include-crds", config.include_crds());
            push_optional(&mut args, "--output-dir", config.output_dir());
            push_optional(&mut args, "--output-dir-template", config.output_dir_template());
        }
        Operation::Build => {
            push_flag(&mut args, "--embed-values", config.embed_values());
        }
        Operation::Destroy | Operation::Version => {}
    }

    args
}

fn push_base(args: &mut Vec<String>, base: &BaseConfig) {
    push_flag(args, "--no-color", base.no_color());

    push_optional(args, "--file", &base.file);
    push_optional(args, "--helm-binary", &base.helm_binary);
    push_optional(args, "--environment", &base.environment);
    push_optional(args, "--kube-context", &base.kube_context);
    push_optional(args, "--namespace", &base.namespace);

    for selector in base.selector_strings() {
        push_pair(args, "--selector", &selector);
    }

    for file in &base.state_values_files {
        push_pair(args, "--state-values-file", file);
    }
}

fn push_release_values(args: &mut Vec<String>, config: &OperationConfig) {
    for (k, v) in config.release_values() {
        push_pair(args, "--set", &format!("{k}={v}"));
    }
}

fn push_flag(args: &mut Vec<String>, flag: &str, enabled: bool) {
    if enabled {
        args.push(flag.to_string());
    }
}

fn push_optional(args: &mut Vec<String>, flag: &str, value: &str) {
    if !value.is_empty() {
        push_pair(args, flag, value);
    }
}

fn push_pair(args: &mut Vec<String>, flag: &str, value: &str) {
    args.push(flag.to_string());
    args.push(value.to_string());
}
