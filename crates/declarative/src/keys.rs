//! Schema keys shared with the host controller.

pub const CONTENT: &str = "content";
pub const PATH: &str = "path";
pub const VALUES: &str = "values";
pub const VALUES_FILES: &str = "values_files";
pub const WORKING_DIRECTORY: &str = "working_directory";
pub const ENVIRONMENT: &str = "environment";
pub const ENVIRONMENT_VARIABLES: &str = "environment_variables";
pub const BIN: &str = "bin";
pub const HELM_BIN: &str = "helm_bin";
pub const SELECTOR: &str = "selector";
pub const SELECTORS: &str = "selectors";
pub const CONCURRENCY: &str = "concurrency";
pub const ENABLE_GO_TEMPLATE: &str = "enable_go_template";
pub const MAX_DIFF_OUTPUT_LEN: &str = "max_diff_output_len";

pub const KUBECONFIG: &str = "kubeconfig";
pub const KUBECONTEXT: &str = "kubecontext";
pub const NAMESPACE: &str = "namespace";

pub const CHART: &str = "chart";
pub const VERSION: &str = "version";
pub const NAME: &str = "name";

pub const AWS_REGION: &str = "aws_region";
pub const AWS_PROFILE: &str = "aws_profile";
pub const EKS_CLUSTER_NAME: &str = "eks_cluster_name";
pub const EKS_CLUSTER_REGION: &str = "eks_cluster_region";
pub const EKS_CLUSTER_ENDPOINT: &str = "eks_cluster_endpoint";
pub const EKS_CLUSTER_CA: &str = "eks_cluster_ca";

/// Derived preview of pending changes.
pub const DIFF_OUTPUT: &str = "diff_output";
/// Derived result of the last apply.
pub const APPLY_OUTPUT: &str = "apply_output";

/// Inputs whose change invalidates the outputs of a multi-release set.
pub const RELEASE_SET_INPUT_KEYS: &[&str] = &[
    VALUES,
    VALUES_FILES,
    CONTENT,
    PATH,
    WORKING_DIRECTORY,
    ENVIRONMENT,
    ENVIRONMENT_VARIABLES,
    BIN,
    HELM_BIN,
    SELECTOR,
    SELECTORS,
    KUBECONFIG,
];

/// Inputs whose change invalidates the outputs of a single release.
pub const RELEASE_INPUT_KEYS: &[&str] = &[
    VALUES,
    CHART,
    VERSION,
    WORKING_DIRECTORY,
    KUBECONFIG,
    KUBECONTEXT,
    BIN,
    HELM_BIN,
    NAMESPACE,
    NAME,
];
